//! Derives per-budget spending metrics for the current period.

use chrono::NaiveDate;

use crate::domain::{Budget, BudgetMetrics, Expense};

/// Stateless calculator; every call recomputes from the raw entities.
pub struct BudgetCalculator;

impl BudgetCalculator {
    /// Returns one [`BudgetMetrics`] per budget, in input order.
    pub fn calculate(budgets: &[Budget], expenses: &[Expense], today: NaiveDate) -> Vec<BudgetMetrics> {
        budgets
            .iter()
            .map(|budget| {
                let spent = Self::spent_for(budget, expenses, today);
                BudgetMetrics::from_spent(budget.clone(), spent)
            })
            .collect()
    }

    /// Sum of the expenses that count toward `budget` in the period containing `today`.
    pub fn spent_for(budget: &Budget, expenses: &[Expense], today: NaiveDate) -> f64 {
        expenses
            .iter()
            .filter(|expense| expense.category_id == budget.category_id)
            .filter(|expense| budget.period.contains(today, expense.date))
            .map(|expense| expense.amount)
            .sum()
    }
}
