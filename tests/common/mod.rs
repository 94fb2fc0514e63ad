#![allow(dead_code)]

use std::sync::Mutex;

use budget_buddy::{
    core::{services::AlertPolicy, BudgetTracker, FixedClock},
    domain::{NewBudget, NewExpense, UserScope},
    notify::RecordingSink,
    storage::{JsonFileBackend, MemoryBackend, ScopedStore},
    BuddyError,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub type MemoryTracker = BudgetTracker<ScopedStore<MemoryBackend>>;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Creates a unique directory that outlives the calling test.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn memory_tracker(today: NaiveDate, policy: AlertPolicy, sink: &RecordingSink) -> MemoryTracker {
    BudgetTracker::new(
        ScopedStore::new(MemoryBackend::new()),
        FixedClock::on(today),
        UserScope::guest(),
        policy,
    )
    .with_sink(sink.clone())
}

pub fn file_store() -> ScopedStore<JsonFileBackend> {
    ScopedStore::new(JsonFileBackend::new(&temp_base()).expect("json backend"))
}

pub fn budget(tracker: &mut MemoryTracker, category: &str, amount: f64) -> String {
    budget_for(tracker, category, amount, budget_buddy::domain::BudgetPeriod::Monthly)
}

pub fn budget_for(
    tracker: &mut MemoryTracker,
    category: &str,
    amount: f64,
    period: budget_buddy::domain::BudgetPeriod,
) -> String {
    let (outcome, _) = tracker
        .add_budget(NewBudget::new(category, amount, period))
        .expect("add budget");
    outcome.budget().id.clone()
}

pub fn spend(
    tracker: &mut MemoryTracker,
    category: &str,
    amount: f64,
    on: NaiveDate,
) -> Result<budget_buddy::RefreshReport, BuddyError> {
    tracker
        .add_expense(NewExpense::new(amount, category, "", on))
        .map(|(_, report)| report)
}
