//! Budget CRUD with the one-budget-per-category rule.

use chrono::{DateTime, Utc};

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::{validate_amount, Budget, BudgetPeriod, NewBudget};

/// Whether [`BudgetService::upsert`] created a budget or reused the category's existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(Budget),
    Updated(Budget),
}

impl UpsertOutcome {
    pub fn budget(&self) -> &Budget {
        match self {
            UpsertOutcome::Created(budget) | UpsertOutcome::Updated(budget) => budget,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, UpsertOutcome::Updated(_))
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Creates a budget, or updates amount and period in place when the
    /// category already has one. Id and creation time are kept on update.
    pub fn upsert(
        budgets: &mut Vec<Budget>,
        draft: NewBudget,
        now: DateTime<Utc>,
    ) -> ServiceResult<UpsertOutcome> {
        let draft = draft.validated()?;
        if let Some(existing) = budgets
            .iter_mut()
            .find(|budget| budget.category_id == draft.category_id)
        {
            existing.amount = draft.amount;
            existing.period = draft.period;
            return Ok(UpsertOutcome::Updated(existing.clone()));
        }
        let budget = draft.into_budget(now)?;
        budgets.push(budget.clone());
        Ok(UpsertOutcome::Created(budget))
    }

    /// Changes the limit and period of the budget identified by `id`.
    pub fn update(
        budgets: &mut [Budget],
        id: &str,
        amount: f64,
        period: BudgetPeriod,
    ) -> ServiceResult<Budget> {
        let amount = validate_amount(amount, "budget amount")?;
        let budget = budgets
            .iter_mut()
            .find(|budget| budget.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget `{id}`")))?;
        budget.amount = amount;
        budget.period = period;
        Ok(budget.clone())
    }

    pub fn remove(budgets: &mut Vec<Budget>, id: &str) -> ServiceResult<Budget> {
        let index = budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("budget `{id}`")))?;
        Ok(budgets.remove(index))
    }

    pub fn for_category<'a>(budgets: &'a [Budget], category_id: &str) -> Option<&'a Budget> {
        budgets
            .iter()
            .find(|budget| budget.category_id == category_id)
    }
}
