//! Spending trends over a trailing window of calendar months.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::core::services::{ServiceError, ServiceResult};
use crate::currency::month_label;
use crate::domain::{month_start_back, CategoryRegistry, Expense};

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

impl MonthlyTotal {
    /// Short label such as `Jan 2025`.
    pub fn label(&self) -> String {
        format!("{} {}", month_label(self.month), self.year)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: String,
    pub name: &'static str,
    pub color: &'static str,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendsReport {
    pub months: u32,
    pub since: NaiveDate,
    pub monthly: Vec<MonthlyTotal>,
    pub categories: Vec<CategoryTotal>,
    pub total: f64,
    pub average_monthly: f64,
}

pub struct TrendsService;

impl TrendsService {
    /// First day included in a window of `months` calendar months ending with today's month.
    pub fn window_start(today: NaiveDate, months: u32) -> ServiceResult<NaiveDate> {
        if months < 1 {
            return Err(ServiceError::Invalid(
                "trend window must cover at least one month".into(),
            ));
        }
        Ok(month_start_back(today, months - 1))
    }

    /// Totals per calendar month that has expenses, oldest first.
    pub fn monthly_totals(
        expenses: &[Expense],
        today: NaiveDate,
        months: u32,
    ) -> ServiceResult<Vec<MonthlyTotal>> {
        let since = Self::window_start(today, months)?;
        let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for expense in Self::in_window(expenses, since) {
            *buckets
                .entry((expense.date.year(), expense.date.month()))
                .or_default() += expense.amount;
        }
        Ok(buckets
            .into_iter()
            .map(|((year, month), total)| MonthlyTotal { year, month, total })
            .collect())
    }

    /// Totals per category over the window, largest first.
    pub fn category_breakdown(
        expenses: &[Expense],
        today: NaiveDate,
        months: u32,
    ) -> ServiceResult<Vec<CategoryTotal>> {
        let since = Self::window_start(today, months)?;
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for expense in Self::in_window(expenses, since) {
            *totals.entry(expense.category_id.as_str()).or_default() += expense.amount;
        }
        let mut breakdown: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category_id, total)| {
                let info = CategoryRegistry::info(category_id);
                CategoryTotal {
                    category_id: category_id.to_string(),
                    name: info.name,
                    color: info.color,
                    total,
                }
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        Ok(breakdown)
    }

    /// Window total divided by the number of months in the window.
    pub fn average_monthly(expenses: &[Expense], today: NaiveDate, months: u32) -> ServiceResult<f64> {
        let since = Self::window_start(today, months)?;
        let total: f64 = Self::in_window(expenses, since).map(|e| e.amount).sum();
        Ok(total / f64::from(months))
    }

    pub fn report(expenses: &[Expense], today: NaiveDate, months: u32) -> ServiceResult<TrendsReport> {
        let since = Self::window_start(today, months)?;
        let monthly = Self::monthly_totals(expenses, today, months)?;
        let categories = Self::category_breakdown(expenses, today, months)?;
        let total: f64 = monthly.iter().map(|entry| entry.total).sum();
        Ok(TrendsReport {
            months,
            since,
            monthly,
            categories,
            total,
            average_monthly: total / f64::from(months),
        })
    }

    fn in_window(expenses: &[Expense], since: NaiveDate) -> impl Iterator<Item = &Expense> {
        expenses.iter().filter(move |expense| expense.date >= since)
    }
}
