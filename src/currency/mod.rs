//! Currency display helpers used by alerts, summaries and the CLI.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("EUR")
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        _ => format!("{code} "),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Rounds an amount to the currency's minor-unit precision.
pub fn round_to_minor_units(amount: f64, code: &CurrencyCode) -> f64 {
    let factor = 10f64.powi(minor_units_for(code.as_str()) as i32);
    (amount * factor).round() / factor
}

/// Formats a plain number with `,` grouping and `.` decimals.
pub fn format_number(value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match body.find('.') {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body.as_str(), ""),
    };
    let grouped = group_digits(int_part, ',');
    let sign = if value < 0.0 && body.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}{frac_part}")
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Renders `amount` with the currency symbol, e.g. `€1,234.50` or `-€5.00`.
pub fn format_currency_value(amount: f64, code: &CurrencyCode) -> String {
    let precision = minor_units_for(code.as_str());
    let body = format_number(amount.abs(), precision);
    let symbol = symbol_for(code.as_str());
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{symbol}{body}")
    } else {
        format!("{symbol}{body}")
    }
}

pub fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_euro_with_grouping() {
        let eur = CurrencyCode::default();
        assert_eq!(format_currency_value(1234.5, &eur), "€1,234.50");
        assert_eq!(format_currency_value(-5.0, &eur), "-€5.00");
        assert_eq!(format_currency_value(0.0, &eur), "€0.00");
    }

    #[test]
    fn unknown_codes_fall_back_to_code_prefix() {
        let sek = CurrencyCode::new("sek");
        assert_eq!(format_currency_value(10.0, &sek), "SEK 10.00");
    }

    #[test]
    fn rounds_to_minor_units() {
        let eur = CurrencyCode::default();
        assert_eq!(round_to_minor_units(10.006, &eur), 10.01);
        let jpy = CurrencyCode::new("JPY");
        assert_eq!(round_to_minor_units(10.6, &jpy), 11.0);
    }

    #[test]
    fn groups_large_numbers() {
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-999.0, 0), "-999");
    }
}
