//! Business logic helpers for managing expenses.

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::{BudgetPeriod, Expense, NewExpense};

/// Provides validated create/delete helpers over a user's expense list.
pub struct ExpenseService;

impl ExpenseService {
    /// Validates the draft and inserts the new expense at the front of the list.
    pub fn add(
        expenses: &mut Vec<Expense>,
        draft: NewExpense,
        now: DateTime<Utc>,
    ) -> ServiceResult<Expense> {
        let expense = draft.into_expense(now)?;
        expenses.insert(0, expense.clone());
        Ok(expense)
    }

    /// Removes the expense identified by `id`, returning the removed instance.
    pub fn remove(expenses: &mut Vec<Expense>, id: &str) -> ServiceResult<Expense> {
        let index = expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("expense `{id}`")))?;
        Ok(expenses.remove(index))
    }

    /// Newest first by effective date; ties keep their stored order.
    pub fn sorted_by_date(expenses: &[Expense]) -> Vec<&Expense> {
        let mut sorted: Vec<&Expense> = expenses.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// Expenses whose date falls in the same period as `today`.
    pub fn in_period(expenses: &[Expense], period: BudgetPeriod, today: NaiveDate) -> Vec<&Expense> {
        expenses
            .iter()
            .filter(|expense| period.contains(today, expense.date))
            .collect()
    }

    pub fn total(expenses: &[&Expense]) -> f64 {
        expenses.iter().map(|expense| expense.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_prepends_and_remove_returns_the_expense() {
        let mut expenses = Vec::new();
        let first = ExpenseService::add(
            &mut expenses,
            NewExpense::new(10.0, "food", "Lunch", date(2025, 1, 2)),
            Utc::now(),
        )
        .expect("add first");
        let second = ExpenseService::add(
            &mut expenses,
            NewExpense::new(20.0, "bills", "Power", date(2025, 1, 3)),
            Utc::now(),
        )
        .expect("add second");
        assert_eq!(expenses[0].id, second.id);

        let removed = ExpenseService::remove(&mut expenses, &first.id).expect("remove");
        assert_eq!(removed.description, "Lunch");
        assert_eq!(expenses.len(), 1);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut expenses = Vec::new();
        let err = ExpenseService::remove(&mut expenses, "missing").expect_err("missing expense");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn invalid_drafts_are_rejected_before_insertion() {
        let mut expenses = Vec::new();
        let result = ExpenseService::add(
            &mut expenses,
            NewExpense::new(-1.0, "food", "", date(2025, 1, 2)),
            Utc::now(),
        );
        assert!(matches!(result, Err(ServiceError::Buddy(_))));
        assert!(expenses.is_empty());
    }

    #[test]
    fn sorts_newest_first_and_filters_by_period() {
        let mut expenses = Vec::new();
        for (amount, on) in [(1.0, date(2025, 1, 5)), (2.0, date(2025, 2, 1)), (3.0, date(2024, 2, 1))] {
            ExpenseService::add(&mut expenses, NewExpense::new(amount, "food", "", on), Utc::now())
                .expect("add");
        }
        let sorted = ExpenseService::sorted_by_date(&expenses);
        assert_eq!(sorted[0].date, date(2025, 2, 1));
        assert_eq!(sorted[2].date, date(2024, 2, 1));

        let this_month = ExpenseService::in_period(&expenses, BudgetPeriod::Monthly, date(2025, 2, 20));
        assert_eq!(ExpenseService::total(&this_month), 2.0);
        let this_year = ExpenseService::in_period(&expenses, BudgetPeriod::Yearly, date(2025, 2, 20));
        assert_eq!(ExpenseService::total(&this_year), 3.0);
    }
}
