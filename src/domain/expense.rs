//! Expense records and the validated draft used to create them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::CategoryRegistry;
use super::common::{validate_amount, Displayable, Identifiable};
use crate::errors::{BuddyError, Result};

/// A single spending entry. Immutable once stored; removed only by deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    #[serde(alias = "category")]
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    /// Effective date of the expense, distinct from `created_at`.
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Re-checks a stored or imported expense against the write-boundary rules.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(BuddyError::Validation("expense id is empty".into()));
        }
        if self.category_id.trim().is_empty() {
            return Err(BuddyError::Validation(format!(
                "expense {} has no category",
                self.id
            )));
        }
        validate_amount(self.amount, &format!("expense {} amount", self.id))?;
        Ok(())
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        let description = if self.description.is_empty() {
            CategoryRegistry::name_of(&self.category_id)
        } else {
            self.description.as_str()
        };
        format!("{} {} ({:.2})", self.date, description, self.amount)
    }
}

/// Expense fields supplied by the user before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub category_id: String,
    pub description: String,
    pub date: NaiveDate,
}

impl NewExpense {
    pub fn new(
        amount: f64,
        category_id: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            category_id: category_id.into(),
            description: description.into(),
            date,
        }
    }

    /// Validates the draft and turns it into a storable [`Expense`].
    pub fn into_expense(self, created_at: DateTime<Utc>) -> Result<Expense> {
        let amount = validate_amount(self.amount, "expense amount")?;
        let category_id = self.category_id.trim().to_string();
        if category_id.is_empty() {
            return Err(BuddyError::Validation("expense category is required".into()));
        }
        Ok(Expense {
            id: Uuid::new_v4().to_string(),
            amount,
            category_id,
            description: self.description.trim().to_string(),
            date: self.date,
            created_at,
        })
    }
}

/// Serializes dates as `YYYY-MM-DD`; also reads full RFC 3339 timestamps.
mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|stamp| stamp.date_naive())
            .map_err(|_| D::Error::custom(format!("invalid expense date `{trimmed}`")))
    }
}
