use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{BuddyError, Result};

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Budgeting cadence. A budget only counts expenses from the current period.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// Returns `true` when `date` falls in the same period as `today`.
    pub fn contains(self, today: NaiveDate, date: NaiveDate) -> bool {
        match self {
            BudgetPeriod::Monthly => date.year() == today.year() && date.month() == today.month(),
            BudgetPeriod::Yearly => date.year() == today.year(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(BudgetPeriod::Monthly),
            "yearly" | "year" | "annual" | "y" => Ok(BudgetPeriod::Yearly),
            other => Err(format!("unknown budget period `{other}`")),
        }
    }
}

/// Returns the first day of the month `months` before the month containing `date`.
pub fn month_start_back(date: NaiveDate, months: u32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 - months as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Checks an amount at the write boundary and rounds it to minor units (cents).
pub fn validate_amount(amount: f64, field: &str) -> Result<f64> {
    if !amount.is_finite() {
        return Err(BuddyError::Validation(format!("{field} must be a number")));
    }
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded <= 0.0 {
        return Err(BuddyError::Validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(rounded)
}

/// Parses a user-supplied amount such as `12.50`, `€1,250.50` or `12,50`.
///
/// A comma is either thousands grouping (`1,250.50`) or, when it is the only
/// separator and followed by one or two digits, the decimal point (`12,50`).
/// Any other use of a comma is rejected.
pub fn parse_amount(raw: &str, field: &str) -> Result<f64> {
    let invalid = || BuddyError::Validation(format!("{field} `{}` is not a number", raw.trim()));
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .collect();
    let normalized = normalize_separators(&cleaned).ok_or_else(invalid)?;
    let value = normalized.parse::<f64>().map_err(|_| invalid())?;
    validate_amount(value, field)
}

fn normalize_separators(cleaned: &str) -> Option<String> {
    if !cleaned.contains(',') {
        return Some(cleaned.to_string());
    }
    let unsigned = cleaned.trim_start_matches(['+', '-']);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    let groups: Vec<&str> = integer.split(',').collect();
    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

    let grouped = groups[0].len() <= 3
        && all_digits(groups[0])
        && groups[1..].iter().all(|group| group.len() == 3 && all_digits(group))
        && fraction.map_or(true, all_digits);
    if grouped {
        return Some(cleaned.replace(',', ""));
    }

    let decimal_comma = fraction.is_none()
        && groups.len() == 2
        && all_digits(groups[0])
        && (1..=2).contains(&groups[1].len())
        && all_digits(groups[1]);
    decimal_comma.then(|| cleaned.replace(',', "."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_period_requires_same_month_and_year() {
        let today = date(2025, 3, 15);
        assert!(BudgetPeriod::Monthly.contains(today, date(2025, 3, 1)));
        assert!(!BudgetPeriod::Monthly.contains(today, date(2025, 2, 28)));
        assert!(!BudgetPeriod::Monthly.contains(today, date(2024, 3, 15)));
    }

    #[test]
    fn yearly_period_ignores_month() {
        let today = date(2025, 6, 1);
        assert!(BudgetPeriod::Yearly.contains(today, date(2025, 1, 1)));
        assert!(BudgetPeriod::Yearly.contains(today, date(2025, 12, 31)));
        assert!(!BudgetPeriod::Yearly.contains(today, date(2024, 12, 31)));
    }

    #[test]
    fn parses_period_aliases() {
        assert_eq!("Yearly".parse::<BudgetPeriod>(), Ok(BudgetPeriod::Yearly));
        assert_eq!("m".parse::<BudgetPeriod>(), Ok(BudgetPeriod::Monthly));
        assert!("weekly".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn validate_amount_rejects_non_positive_and_nan() {
        assert!(validate_amount(0.0, "amount").is_err());
        assert!(validate_amount(-3.0, "amount").is_err());
        assert!(validate_amount(f64::NAN, "amount").is_err());
        assert!(validate_amount(0.001, "amount").is_err());
        assert_eq!(validate_amount(12.346, "amount").unwrap(), 12.35);
    }

    #[test]
    fn parse_amount_strips_currency_symbols() {
        assert_eq!(parse_amount("€1,250.5", "amount").unwrap(), 1250.5);
        assert_eq!(parse_amount("1,234,567", "amount").unwrap(), 1_234_567.0);
        assert!(parse_amount("abc", "amount").is_err());
    }

    #[test]
    fn parse_amount_reads_a_lone_comma_as_the_decimal_point() {
        assert_eq!(parse_amount("12,50", "amount").unwrap(), 12.5);
        assert_eq!(parse_amount("€ 7,5", "amount").unwrap(), 7.5);
        assert!(parse_amount("12,5000", "amount").is_err());
        assert!(parse_amount("1,2,3", "amount").is_err());
        assert!(parse_amount("12,50.1", "amount").is_err());
    }

    #[test]
    fn month_start_back_crosses_year_boundary() {
        assert_eq!(month_start_back(date(2025, 2, 20), 2), date(2024, 12, 1));
        assert_eq!(month_start_back(date(2025, 2, 20), 0), date(2025, 2, 1));
    }
}
