//! Category budgets and the metrics derived from them on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{validate_amount, BudgetPeriod, Identifiable};
use crate::errors::{BuddyError, Result};

/// A spending limit for one category. At most one per category and user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(BuddyError::Validation("budget id is empty".into()));
        }
        if self.category_id.trim().is_empty() {
            return Err(BuddyError::Validation(format!(
                "budget {} has no category",
                self.id
            )));
        }
        validate_amount(self.amount, &format!("budget {} amount", self.id))?;
        Ok(())
    }
}

impl Identifiable for Budget {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Budget fields supplied by the user; upserted by category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category_id: String,
    pub amount: f64,
    pub period: BudgetPeriod,
}

impl NewBudget {
    pub fn new(category_id: impl Into<String>, amount: f64, period: BudgetPeriod) -> Self {
        Self {
            category_id: category_id.into(),
            amount,
            period,
        }
    }

    /// Returns the draft with a trimmed category and a validated amount.
    pub fn validated(self) -> Result<Self> {
        let amount = validate_amount(self.amount, "budget amount")?;
        let category_id = self.category_id.trim().to_string();
        if category_id.is_empty() {
            return Err(BuddyError::Validation("budget category is required".into()));
        }
        Ok(Self {
            category_id,
            amount,
            period: self.period,
        })
    }

    pub fn into_budget(self, created_at: DateTime<Utc>) -> Result<Budget> {
        let draft = self.validated()?;
        Ok(Budget {
            id: Uuid::new_v4().to_string(),
            category_id: draft.category_id,
            amount: draft.amount,
            period: draft.period,
            created_at,
        })
    }
}

/// Coarse health of a budget used for list badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Good,
    Warning,
    Over,
}

/// A [`Budget`] together with its spending for the current period.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMetrics {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub is_over_budget: bool,
}

impl BudgetMetrics {
    pub fn from_spent(budget: Budget, spent: f64) -> Self {
        let percentage = if budget.amount <= 0.0 {
            0.0
        } else {
            spent * 100.0 / budget.amount
        };
        Self {
            remaining: budget.amount - spent,
            // Non-positive limits count as zero so any spending is over budget.
            is_over_budget: spent > budget.amount.max(0.0),
            percentage,
            spent,
            budget,
        }
    }

    pub fn id(&self) -> &str {
        &self.budget.id
    }

    pub fn category_id(&self) -> &str {
        &self.budget.category_id
    }

    pub fn status(&self) -> BudgetStatus {
        if self.percentage >= 100.0 {
            BudgetStatus::Over
        } else if self.percentage >= 80.0 {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Good
        }
    }

    /// Percentage clamped to `0..=100` for progress bars.
    pub fn progress(&self) -> f64 {
        self.percentage.clamp(0.0, 100.0)
    }
}
