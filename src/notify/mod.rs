//! Alert delivery. Sinks only display or record; the tracker owns the markers.

pub mod console;
pub mod email;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::currency::{format_currency_value, CurrencyCode};
use chrono::Utc;

use crate::domain::{Budget, BudgetMetrics, BudgetPeriod, CategoryRegistry, ThresholdTier};

pub use console::ConsoleSink;
pub use email::{EmailAlert, OutboxEmailSink};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// A single threshold crossing ready to be shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub tier: ThresholdTier,
    pub category_name: String,
    pub metrics: BudgetMetrics,
    pub currency: CurrencyCode,
}

impl BudgetAlert {
    pub fn new(metrics: BudgetMetrics, tier: ThresholdTier, currency: CurrencyCode) -> Self {
        let category_name = CategoryRegistry::name_of(metrics.category_id()).to_string();
        Self {
            tier,
            category_name,
            metrics,
            currency,
        }
    }

    /// Id carried by [`BudgetAlert::sample`].
    pub const SAMPLE_BUDGET_ID: &'static str = "test";

    /// A critical alert for a €100 monthly food budget with €85 spent, used to
    /// check that the configured channels work.
    pub fn sample(currency: CurrencyCode) -> Self {
        let budget = Budget {
            id: Self::SAMPLE_BUDGET_ID.to_string(),
            category_id: "food".to_string(),
            amount: 100.0,
            period: BudgetPeriod::Monthly,
            created_at: Utc::now(),
        };
        Self::new(
            BudgetMetrics::from_spent(budget, 85.0),
            ThresholdTier::Critical,
            currency,
        )
    }

    pub fn budget_id(&self) -> &str {
        self.metrics.id()
    }

    pub fn title(&self) -> String {
        match self.tier {
            ThresholdTier::Warning => format!("Budget Warning: {}", self.category_name),
            ThresholdTier::Critical => format!("Critical Budget Alert: {}", self.category_name),
            ThresholdTier::Exceeded => format!("Budget Exceeded: {}", self.category_name),
        }
    }

    pub fn description(&self) -> String {
        let period = self.metrics.budget.period;
        let percentage = self.metrics.percentage;
        match self.tier {
            ThresholdTier::Warning => {
                format!("You've used {percentage:.1}% of your {period} budget.")
            }
            ThresholdTier::Critical => format!(
                "You've used {percentage:.1}% of your {period} budget! Only {} left.",
                self.money(self.metrics.remaining)
            ),
            ThresholdTier::Exceeded => format!(
                "You have exceeded your {period} budget by {}!",
                self.money(self.metrics.remaining.abs())
            ),
        }
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format_currency_value(amount, &self.currency)
    }
}

pub trait NotificationSink: Send {
    fn name(&self) -> &str;
    fn notify(&mut self, alert: &BudgetAlert) -> Result<(), NotifyError>;
}

/// Keeps delivered alerts in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    alerts: Arc<Mutex<Vec<BudgetAlert>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every alert and then reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<BudgetAlert> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn tiers(&self) -> Vec<ThresholdTier> {
        self.alerts().iter().map(|alert| alert.tier).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.clear();
        }
    }
}

impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn notify(&mut self, alert: &BudgetAlert) -> Result<(), NotifyError> {
        self.alerts
            .lock()
            .map_err(|_| NotifyError::Rejected("alert log lock poisoned".into()))?
            .push(alert.clone());
        if self.fail {
            return Err(NotifyError::Rejected("recording sink set to fail".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(spent: f64, tier: ThresholdTier) -> BudgetAlert {
        let budget = Budget {
            id: "b1".into(),
            category_id: "food".into(),
            amount: 100.0,
            period: BudgetPeriod::Monthly,
            created_at: Utc::now(),
        };
        BudgetAlert::new(BudgetMetrics::from_spent(budget, spent), tier, CurrencyCode::default())
    }

    #[test]
    fn messages_per_tier() {
        let warning = alert(80.0, ThresholdTier::Warning);
        assert_eq!(warning.title(), "Budget Warning: Food & Dining");
        assert_eq!(warning.description(), "You've used 80.0% of your monthly budget.");

        let critical = alert(90.0, ThresholdTier::Critical);
        assert_eq!(critical.title(), "Critical Budget Alert: Food & Dining");
        assert_eq!(
            critical.description(),
            "You've used 90.0% of your monthly budget! Only €10.00 left."
        );

        let exceeded = alert(105.0, ThresholdTier::Exceeded);
        assert_eq!(exceeded.title(), "Budget Exceeded: Food & Dining");
        assert_eq!(
            exceeded.description(),
            "You have exceeded your monthly budget by €5.00!"
        );
    }

    #[test]
    fn recording_sink_clones_share_their_log() {
        let sink = RecordingSink::new();
        let mut handle = sink.clone();
        handle
            .notify(&alert(81.0, ThresholdTier::Warning))
            .expect("deliver");
        assert_eq!(sink.tiers(), vec![ThresholdTier::Warning]);

        let mut failing = RecordingSink::failing();
        assert!(failing.notify(&alert(81.0, ThresholdTier::Warning)).is_err());
        assert_eq!(failing.alerts().len(), 1);
    }

    #[test]
    fn sample_alert_is_a_critical_food_alert() {
        let sample = BudgetAlert::sample(CurrencyCode::default());
        assert_eq!(sample.budget_id(), BudgetAlert::SAMPLE_BUDGET_ID);
        assert_eq!(sample.title(), "Critical Budget Alert: Food & Dining");
        assert_eq!(
            sample.description(),
            "You've used 85.0% of your monthly budget! Only €15.00 left."
        );
    }
}
