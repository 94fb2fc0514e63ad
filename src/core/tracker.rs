//! Orchestrates store, calculator, notifier and sinks for one user scope.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::core::clock::Clock;
use crate::core::services::{
    AlertPolicy, BudgetCalculator, BudgetService, DashboardSummary, ExpenseService,
    SummaryService, ThresholdNotifier, TrendsReport, TrendsService, UpsertOutcome,
};
use crate::currency::CurrencyCode;
use crate::domain::{
    Budget, BudgetMetrics, BudgetPeriod, Expense, MarkerSet, NewBudget, NewExpense,
    NotificationMarker, UserScope,
};
use crate::errors::Result;
use crate::notify::{BudgetAlert, NotificationSink};
use crate::storage::EntityStore;

/// Outcome of one evaluate-and-persist pass.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub metrics: Vec<BudgetMetrics>,
    pub fired: Vec<BudgetAlert>,
    pub cleared: Vec<NotificationMarker>,
    /// Sink deliveries that returned an error. Their markers are still recorded.
    pub delivery_failures: usize,
}

pub struct BudgetTracker<S: EntityStore> {
    store: S,
    clock: Box<dyn Clock>,
    user: UserScope,
    notifier: ThresholdNotifier,
    sinks: Vec<Box<dyn NotificationSink>>,
    currency: CurrencyCode,
}

impl<S: EntityStore> BudgetTracker<S> {
    pub fn new(store: S, clock: impl Clock + 'static, user: UserScope, policy: AlertPolicy) -> Self {
        Self {
            store,
            clock: Box::new(clock),
            user,
            notifier: ThresholdNotifier::new(policy),
            sinks: Vec::new(),
            currency: CurrencyCode::default(),
        }
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Replaces every sink, e.g. after notification settings change.
    pub fn set_sinks(&mut self, sinks: Vec<Box<dyn NotificationSink>>) {
        self.sinks = sinks;
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn user(&self) -> &UserScope {
        &self.user
    }

    /// Switches to another user scope. Markers are per user, so nothing carries over.
    pub fn switch_user(&mut self, user: UserScope) {
        info!(from = %self.user, to = %user, "switching user scope");
        self.user = user;
    }

    pub fn policy(&self) -> AlertPolicy {
        self.notifier.policy()
    }

    pub fn set_policy(&mut self, policy: AlertPolicy) {
        self.notifier = ThresholdNotifier::new(policy);
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn set_currency(&mut self, currency: CurrencyCode) {
        self.currency = currency;
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.store
            .load_expenses(&self.user)
            .unwrap_or_else(|err| {
                warn!(user = %self.user, error = %err, "expenses unavailable; using an empty list");
                Vec::new()
            })
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.store
            .load_budgets(&self.user)
            .unwrap_or_else(|err| {
                warn!(user = %self.user, error = %err, "budgets unavailable; using an empty list");
                Vec::new()
            })
    }

    pub fn markers(&self) -> MarkerSet {
        self.store
            .load_markers(&self.user)
            .unwrap_or_else(|err| {
                warn!(user = %self.user, error = %err, "alert markers unavailable; starting fresh");
                MarkerSet::new()
            })
    }

    pub fn metrics(&self) -> Vec<BudgetMetrics> {
        BudgetCalculator::calculate(&self.budgets(), &self.expenses(), self.clock.today())
    }

    pub fn dashboard(&self) -> DashboardSummary {
        SummaryService::dashboard(&self.expenses(), &self.metrics(), self.clock.today())
    }

    pub fn trends(&self, months: u32) -> Result<TrendsReport> {
        Ok(TrendsService::report(
            &self.expenses(),
            self.clock.today(),
            months,
        )?)
    }

    pub fn add_expense(&mut self, draft: NewExpense) -> Result<(Expense, RefreshReport)> {
        let mut expenses = self.store.load_expenses(&self.user)?;
        let expense = ExpenseService::add(&mut expenses, draft, self.clock.now())?;
        self.store.save_expenses(&self.user, &expenses)?;
        info!(
            user = %self.user,
            id = %expense.id,
            category = %expense.category_id,
            amount = expense.amount,
            "expense added"
        );
        let report = self.refresh()?;
        Ok((expense, report))
    }

    pub fn delete_expense(&mut self, id: &str) -> Result<(Expense, RefreshReport)> {
        let mut expenses = self.store.load_expenses(&self.user)?;
        let removed = ExpenseService::remove(&mut expenses, id)?;
        self.store.save_expenses(&self.user, &expenses)?;
        info!(user = %self.user, id, "expense deleted");
        let report = self.refresh()?;
        Ok((removed, report))
    }

    pub fn add_budget(&mut self, draft: NewBudget) -> Result<(UpsertOutcome, RefreshReport)> {
        let mut budgets = self.store.load_budgets(&self.user)?;
        let outcome = BudgetService::upsert(&mut budgets, draft, self.clock.now())?;
        self.store.save_budgets(&self.user, &budgets)?;
        info!(
            user = %self.user,
            id = %outcome.budget().id,
            category = %outcome.budget().category_id,
            updated = outcome.is_update(),
            "budget saved"
        );
        let report = self.refresh()?;
        Ok((outcome, report))
    }

    pub fn update_budget(
        &mut self,
        id: &str,
        amount: f64,
        period: BudgetPeriod,
    ) -> Result<(Budget, RefreshReport)> {
        let mut budgets = self.store.load_budgets(&self.user)?;
        let budget = BudgetService::update(&mut budgets, id, amount, period)?;
        self.store.save_budgets(&self.user, &budgets)?;
        info!(user = %self.user, id, amount = budget.amount, "budget updated");
        let report = self.refresh()?;
        Ok((budget, report))
    }

    pub fn delete_budget(&mut self, id: &str) -> Result<(Budget, RefreshReport)> {
        let mut budgets = self.store.load_budgets(&self.user)?;
        let removed = BudgetService::remove(&mut budgets, id)?;
        self.store.save_budgets(&self.user, &budgets)?;
        info!(user = %self.user, id, "budget deleted");
        let report = self.refresh()?;
        Ok((removed, report))
    }

    /// Recomputes metrics, persists the markers and then delivers newly crossed alerts.
    ///
    /// Markers are written before any sink runs, so a failed write leaves
    /// nothing delivered and the next pass fires the same alerts.
    pub fn refresh(&mut self) -> Result<RefreshReport> {
        let budgets = self.store.load_budgets(&self.user)?;
        let expenses = self.store.load_expenses(&self.user)?;
        let metrics = BudgetCalculator::calculate(&budgets, &expenses, self.clock.today());
        let previous = self.store.load_markers(&self.user)?;
        let evaluation = self.notifier.evaluate(&metrics, &previous);

        if evaluation.updated_markers != previous {
            self.store.save_markers(&self.user, &evaluation.updated_markers)?;
        }

        let mut report = RefreshReport {
            cleared: evaluation.cleared,
            ..RefreshReport::default()
        };
        for firing in &evaluation.firing {
            let Some(entry) = metrics.iter().find(|m| m.id() == firing.budget_id) else {
                continue;
            };
            let alert = BudgetAlert::new(entry.clone(), firing.tier, self.currency.clone());
            info!(
                user = %self.user,
                budget = %firing.budget_id,
                tier = %firing.tier,
                percentage = entry.percentage,
                "budget threshold crossed"
            );
            report.delivery_failures += self.deliver(&alert);
            report.fired.push(alert);
        }
        report.metrics = metrics;
        Ok(report)
    }

    /// Sends `alert` through every sink without touching any marker.
    /// Returns the number of sinks that failed.
    pub fn deliver(&mut self, alert: &BudgetAlert) -> usize {
        let mut failures = 0;
        for sink in self.sinks.iter_mut() {
            if let Err(err) = sink.notify(alert) {
                warn!(
                    sink = sink.name(),
                    budget = alert.budget_id(),
                    tier = %alert.tier,
                    error = %err,
                    "alert delivery failed"
                );
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::domain::ThresholdTier;
    use crate::notify::RecordingSink;
    use crate::storage::{MemoryBackend, ScopedStore};

    fn tracker(sink: &RecordingSink) -> BudgetTracker<ScopedStore<MemoryBackend>> {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        BudgetTracker::new(
            ScopedStore::new(MemoryBackend::new()),
            FixedClock::on(today),
            UserScope::guest(),
            AlertPolicy::Banded,
        )
        .with_sink(sink.clone())
    }

    fn spend(tracker: &mut BudgetTracker<ScopedStore<MemoryBackend>>, amount: f64) -> RefreshReport {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        tracker
            .add_expense(NewExpense::new(amount, "food", "", today))
            .expect("add expense")
            .1
    }

    #[test]
    fn crossing_fires_once_and_persists_markers() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        tracker
            .add_budget(NewBudget::new("food", 100.0, BudgetPeriod::Monthly))
            .expect("budget");

        let report = spend(&mut tracker, 82.0);
        assert_eq!(report.fired.len(), 1);
        assert_eq!(sink.tiers(), vec![ThresholdTier::Warning]);
        assert_eq!(tracker.markers().len(), 1);

        let again = tracker.refresh().expect("refresh");
        assert!(again.fired.is_empty());
        assert_eq!(sink.alerts().len(), 1);
    }

    #[test]
    fn deleting_an_expense_re_arms_the_budget() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        tracker
            .add_budget(NewBudget::new("food", 100.0, BudgetPeriod::Monthly))
            .expect("budget");
        spend(&mut tracker, 50.0);
        let big = tracker
            .add_expense(NewExpense::new(
                60.0,
                "food",
                "",
                NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
            ))
            .expect("add")
            .0;
        assert_eq!(sink.tiers(), vec![ThresholdTier::Exceeded]);

        let (_, report) = tracker.delete_expense(&big.id).expect("delete");
        assert_eq!(report.cleared.len(), 1);
        assert!(tracker.markers().is_empty());
    }

    #[test]
    fn failed_delivery_still_records_the_marker() {
        let failing = RecordingSink::failing();
        let mut tracker = tracker(&failing);
        tracker
            .add_budget(NewBudget::new("food", 100.0, BudgetPeriod::Monthly))
            .expect("budget");
        let report = spend(&mut tracker, 90.0);
        assert_eq!(report.delivery_failures, 1);
        assert!(tracker.markers().contains(
            tracker.budgets()[0].id.as_str(),
            ThresholdTier::Critical
        ));
    }

    #[test]
    fn users_do_not_share_data() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        spend(&mut tracker, 10.0);
        tracker.switch_user(UserScope::new("alice"));
        assert!(tracker.expenses().is_empty());
        tracker.switch_user(UserScope::guest());
        assert_eq!(tracker.expenses().len(), 1);
    }

    /// Memory-backed store whose marker writes can be switched off and whose
    /// expenses can be made unreadable.
    #[derive(Default)]
    struct FaultyStore {
        inner: ScopedStore<MemoryBackend>,
        reject_markers: std::sync::atomic::AtomicBool,
        unreadable_expenses: std::sync::atomic::AtomicBool,
    }

    impl FaultyStore {
        fn flag(flag: &std::sync::atomic::AtomicBool) -> bool {
            flag.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    impl EntityStore for std::sync::Arc<FaultyStore> {
        fn load_expenses(&self, user: &UserScope) -> Result<Vec<Expense>> {
            if FaultyStore::flag(&self.unreadable_expenses) {
                return Err(crate::errors::BuddyError::Storage("disk says no".into()));
            }
            self.inner.load_expenses(user)
        }
        fn save_expenses(&self, user: &UserScope, expenses: &[Expense]) -> Result<()> {
            self.inner.save_expenses(user, expenses)
        }
        fn load_budgets(&self, user: &UserScope) -> Result<Vec<Budget>> {
            self.inner.load_budgets(user)
        }
        fn save_budgets(&self, user: &UserScope, budgets: &[Budget]) -> Result<()> {
            self.inner.save_budgets(user, budgets)
        }
        fn load_markers(&self, user: &UserScope) -> Result<MarkerSet> {
            self.inner.load_markers(user)
        }
        fn save_markers(&self, user: &UserScope, markers: &MarkerSet) -> Result<()> {
            if FaultyStore::flag(&self.reject_markers) {
                return Err(crate::errors::BuddyError::Storage("read-only".into()));
            }
            self.inner.save_markers(user, markers)
        }
        fn scopes(&self) -> Result<Vec<UserScope>> {
            self.inner.scopes()
        }
    }

    fn faulty_tracker(
        sink: &RecordingSink,
    ) -> (std::sync::Arc<FaultyStore>, BudgetTracker<std::sync::Arc<FaultyStore>>) {
        let store = std::sync::Arc::new(FaultyStore::default());
        let tracker = BudgetTracker::new(
            store.clone(),
            FixedClock::on(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()),
            UserScope::guest(),
            AlertPolicy::Banded,
        )
        .with_sink(sink.clone());
        (store, tracker)
    }

    #[test]
    fn unreadable_expenses_block_writes_instead_of_being_overwritten() {
        let sink = RecordingSink::new();
        let (store, mut tracker) = faulty_tracker(&sink);
        let day = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        tracker
            .add_expense(NewExpense::new(30.0, "food", "kept", day))
            .expect("first expense");

        store
            .unreadable_expenses
            .store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(tracker.expenses().is_empty());
        assert!(tracker
            .add_expense(NewExpense::new(5.0, "food", "", day))
            .is_err());

        store
            .unreadable_expenses
            .store(false, std::sync::atomic::Ordering::SeqCst);
        let stored = tracker.expenses();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "kept");
    }

    #[test]
    fn marker_write_failure_delivers_nothing_and_retries_next_pass() {
        let sink = RecordingSink::new();
        let (store, mut tracker) = faulty_tracker(&sink);
        tracker
            .add_budget(NewBudget::new("food", 100.0, BudgetPeriod::Monthly))
            .expect("budget");

        store
            .reject_markers
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let day = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        assert!(tracker
            .add_expense(NewExpense::new(81.0, "food", "", day))
            .is_err());
        assert!(sink.alerts().is_empty());

        store
            .reject_markers
            .store(false, std::sync::atomic::Ordering::SeqCst);
        let report = tracker.refresh().expect("refresh");
        assert_eq!(report.fired.len(), 1);
        assert_eq!(sink.tiers(), vec![ThresholdTier::Warning]);
        assert!(tracker.refresh().expect("again").fired.is_empty());
    }
}
