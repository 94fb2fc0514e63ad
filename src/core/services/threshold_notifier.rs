//! Decides which budget alerts fire and which markers are cleared.
//!
//! Every (budget, tier) pair is a two-state machine: not notified or notified.
//! The notifier is pure; callers deliver the alerts and persist
//! [`Evaluation::updated_markers`] afterwards.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{BudgetMetrics, MarkerSet, NotificationMarker, ThresholdTier};

/// Rule deciding which tiers may fire for a given percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// A tier fires only while the percentage sits inside its own band, so a
    /// jump from below 80% straight past 100% fires only the exceeded alert.
    #[default]
    Banded,
    /// Every tier whose lower bound has been reached fires if not yet notified.
    EveryCrossed,
}

impl AlertPolicy {
    fn may_fire(self, tier: ThresholdTier, percentage: f64) -> bool {
        match self {
            AlertPolicy::Banded => tier.band_contains(percentage),
            AlertPolicy::EveryCrossed => percentage >= tier.lower_bound(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertPolicy::Banded => "banded",
            AlertPolicy::EveryCrossed => "every_crossed",
        }
    }
}

impl fmt::Display for AlertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "banded" => Ok(AlertPolicy::Banded),
            "every_crossed" | "every" => Ok(AlertPolicy::EveryCrossed),
            other => Err(format!("unknown alert policy `{other}`")),
        }
    }
}

/// An alert that must be delivered in this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiringAlert {
    pub budget_id: String,
    pub tier: ThresholdTier,
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub firing: Vec<FiringAlert>,
    pub cleared: Vec<NotificationMarker>,
    pub updated_markers: MarkerSet,
}

impl Evaluation {
    pub fn is_quiet(&self) -> bool {
        self.firing.is_empty() && self.cleared.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdNotifier {
    policy: AlertPolicy,
}

impl ThresholdNotifier {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Compares current metrics with the markers from the previous pass.
    ///
    /// Markers of budgets absent from `metrics` are carried over untouched.
    pub fn evaluate(&self, metrics: &[BudgetMetrics], previous: &MarkerSet) -> Evaluation {
        let mut updated = previous.clone();
        let mut firing = Vec::new();
        let mut cleared = Vec::new();

        for budget in metrics {
            let id = budget.id();
            let percentage = budget.percentage;

            for tier in ThresholdTier::ALL {
                if self.policy.may_fire(tier, percentage) && !previous.contains(id, tier) {
                    updated.insert(id, tier);
                    firing.push(FiringAlert {
                        budget_id: id.to_string(),
                        tier,
                    });
                }
            }

            // Highest tier first: falling under a lower bound re-arms that tier and all above it.
            for tier in ThresholdTier::ALL.into_iter().rev() {
                if percentage >= tier.lower_bound() {
                    continue;
                }
                for reset in ThresholdTier::ALL.into_iter().filter(|t| *t >= tier) {
                    if updated.remove(id, reset) {
                        cleared.push(NotificationMarker::new(id, reset));
                    }
                }
            }
        }

        Evaluation {
            firing,
            cleared,
            updated_markers: updated,
        }
    }
}

/// Evaluates with the default banded policy.
pub fn evaluate(metrics: &[BudgetMetrics], previous: &MarkerSet) -> Evaluation {
    ThresholdNotifier::default().evaluate(metrics, previous)
}
