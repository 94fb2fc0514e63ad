use chrono::NaiveDate;

use crate::core::services::ExpenseService;
use crate::domain::{month_start_back, BudgetMetrics, BudgetPeriod, Expense};

const RECENT_EXPENSES: usize = 5;
const WARNING_PERCENTAGE: f64 = 80.0;

/// Change of this month's spending against the previous calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthComparison {
    pub difference: f64,
    /// Zero when nothing was spent last month.
    pub percentage_change: f64,
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub month_spent: f64,
    pub monthly_budget_total: f64,
    pub budget_remaining: f64,
    pub last_month: MonthComparison,
    pub recent: Vec<Expense>,
    pub warnings: Vec<BudgetMetrics>,
    pub expense_count: usize,
    pub budget_count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn dashboard(
        expenses: &[Expense],
        metrics: &[BudgetMetrics],
        today: NaiveDate,
    ) -> DashboardSummary {
        let month_spent =
            ExpenseService::total(&ExpenseService::in_period(expenses, BudgetPeriod::Monthly, today));
        let monthly_budget_total: f64 = metrics
            .iter()
            .filter(|entry| entry.budget.period == BudgetPeriod::Monthly)
            .map(|entry| entry.budget.amount)
            .sum();

        let last_month_day = month_start_back(today, 1);
        let last_month_total = ExpenseService::total(&ExpenseService::in_period(
            expenses,
            BudgetPeriod::Monthly,
            last_month_day,
        ));
        let difference = month_spent - last_month_total;
        let percentage_change = if last_month_total > 0.0 {
            difference / last_month_total * 100.0
        } else {
            0.0
        };

        let recent = ExpenseService::sorted_by_date(expenses)
            .into_iter()
            .take(RECENT_EXPENSES)
            .cloned()
            .collect();
        let warnings = metrics
            .iter()
            .filter(|entry| entry.percentage >= WARNING_PERCENTAGE)
            .cloned()
            .collect();

        DashboardSummary {
            month_spent,
            monthly_budget_total,
            budget_remaining: monthly_budget_total - month_spent,
            last_month: MonthComparison {
                difference,
                percentage_change,
            },
            recent,
            warnings,
            expense_count: expenses.len(),
            budget_count: metrics.len(),
        }
    }
}
