mod common;

use std::fs;

use budget_buddy::{
    core::{services::AlertPolicy, BudgetTracker, FixedClock},
    domain::{BudgetPeriod, NewBudget, NewExpense, ThresholdTier, UserScope},
    notify::RecordingSink,
    storage::{expenses_key, EntityStore, JsonFileBackend, KeyValueBackend, ScopedStore},
};
use common::{date, file_store, temp_base};

fn file_tracker(
    store: ScopedStore<JsonFileBackend>,
    sink: &RecordingSink,
) -> BudgetTracker<ScopedStore<JsonFileBackend>> {
    BudgetTracker::new(
        store,
        FixedClock::on(date(2025, 6, 18)),
        UserScope::guest(),
        AlertPolicy::Banded,
    )
    .with_sink(sink.clone())
}

#[test]
fn data_and_markers_survive_a_restart() {
    let base = temp_base();
    let sink = RecordingSink::new();
    let mut tracker = file_tracker(
        ScopedStore::new(JsonFileBackend::new(&base).expect("backend")),
        &sink,
    );
    tracker
        .add_budget(NewBudget::new("transport", 200.0, BudgetPeriod::Monthly))
        .expect("budget");
    tracker
        .add_expense(NewExpense::new(170.0, "transport", "monthly pass", date(2025, 6, 2)))
        .expect("expense");
    assert_eq!(sink.tiers(), vec![ThresholdTier::Critical]);

    let reopened_sink = RecordingSink::new();
    let mut reopened = file_tracker(
        ScopedStore::new(JsonFileBackend::new(&base).expect("backend")),
        &reopened_sink,
    );
    assert_eq!(reopened.expenses().len(), 1);
    assert_eq!(reopened.expenses()[0].description, "monthly pass");
    let report = reopened.refresh().expect("refresh");
    assert!(report.fired.is_empty());
    assert!(reopened_sink.alerts().is_empty());
}

#[test]
fn corrupt_collection_is_quarantined_and_read_as_empty() {
    let store = file_store();
    let user = UserScope::guest();
    store
        .backend()
        .set(&expenses_key(&user), "{ not json")
        .expect("write garbage");

    assert!(store.load_expenses(&user).expect("load").is_empty());
    let backups: Vec<_> = fs::read_dir(store.backend().backups_dir())
        .expect("backups dir")
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(store.backend().get(&expenses_key(&user)).expect("get").is_none());

    let sink = RecordingSink::new();
    let tracker = file_tracker(store, &sink);
    assert!(tracker.expenses().is_empty());
}

#[test]
fn undecodable_file_is_backed_up_before_the_next_write() {
    let store = file_store();
    let user = UserScope::guest();
    let original: &[u8] = b"[{\"id\":\"keep\",\"description\":\"caf\xE9\"}]";
    let path = store.backend().path_for(&expenses_key(&user));
    fs::write(&path, original).expect("write latin-1 bytes");
    let backups_dir = store.backend().backups_dir().to_path_buf();

    let sink = RecordingSink::new();
    let mut tracker = file_tracker(store, &sink);
    tracker
        .add_expense(NewExpense::new(5.0, "food", "", date(2025, 6, 4)))
        .expect("expense after quarantine");

    let backups: Vec<_> = fs::read_dir(&backups_dir)
        .expect("backups dir")
        .map(|entry| entry.expect("entry").path())
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read(&backups[0]).expect("backup bytes"), original);
    assert_eq!(tracker.expenses().len(), 1);
}

#[test]
fn each_user_gets_separate_files() {
    let store = file_store();
    let alice = UserScope::new("alice");
    let bob = UserScope::new("bob");
    let sink = RecordingSink::new();
    let mut tracker = file_tracker(store, &sink);

    tracker.switch_user(alice.clone());
    tracker
        .add_expense(NewExpense::new(12.5, "food", "lunch", date(2025, 6, 3)))
        .expect("alice expense");
    tracker.switch_user(bob.clone());
    assert!(tracker.expenses().is_empty());

    let store = tracker.store();
    assert!(store.backend().path_for(&expenses_key(&alice)).exists());
    assert!(!store.backend().path_for(&expenses_key(&bob)).exists());
    assert_eq!(store.scopes().expect("scopes"), vec![alice]);
}
