//! Simulated e-mail delivery: alerts are appended to an outbox file as JSON lines.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{BudgetAlert, NotificationSink, NotifyError};
use crate::utils::ensure_dir;

const OUTBOX_FILE: &str = "emails.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAlert {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub budget_id: String,
    pub sent_at: DateTime<Utc>,
}

impl EmailAlert {
    pub fn render(alert: &BudgetAlert, to: &str, sent_at: DateTime<Utc>) -> Self {
        let metrics = &alert.metrics;
        let subject = format!(
            "Budget Alert: {} - {:.1}% Used",
            alert.category_name, metrics.percentage
        );
        let hint = if metrics.is_over_budget {
            "You have exceeded your budget limit. Consider reviewing your spending in this category."
        } else {
            "You're approaching your budget limit. Review your upcoming expenses in this category."
        };
        let body = [
            format!("Budget alert for {}", alert.category_name),
            String::new(),
            format!("Category: {}", alert.category_name),
            format!(
                "Budget limit: {} ({})",
                alert.money(metrics.budget.amount),
                metrics.budget.period
            ),
            format!("Spent: {}", alert.money(metrics.spent)),
            format!("Remaining: {}", alert.money(metrics.remaining)),
            format!("Usage: {:.1}%", metrics.percentage),
            String::new(),
            hint.to_string(),
        ]
        .join("\n");
        Self {
            to: to.to_string(),
            subject,
            body,
            budget_id: alert.budget_id().to_string(),
            sent_at,
        }
    }
}

/// Appends rendered alerts to `<outbox>/emails.jsonl` when e-mail alerts are on.
#[derive(Debug, Clone)]
pub struct OutboxEmailSink {
    outbox_dir: PathBuf,
    recipient: Option<String>,
    enabled: bool,
}

impl OutboxEmailSink {
    pub fn new(outbox_dir: impl Into<PathBuf>, recipient: Option<String>, enabled: bool) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
            recipient: recipient
                .map(|address| address.trim().to_string())
                .filter(|address| !address.is_empty()),
            enabled,
        }
    }

    pub fn outbox_file(&self) -> PathBuf {
        self.outbox_dir.join(OUTBOX_FILE)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queued e-mails, oldest first, optionally only those for `budget_id`.
    /// Lines that no longer parse are skipped.
    pub fn history(&self, budget_id: Option<&str>) -> Result<Vec<EmailAlert>, NotifyError> {
        let path = self.outbox_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        let mut emails = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EmailAlert>(line) {
                Ok(email) if budget_id.map_or(true, |id| email.budget_id == id) => {
                    emails.push(email)
                }
                Ok(_) => {}
                Err(err) => warn!(line = index + 1, error = %err, "skipping unreadable outbox entry"),
            }
        }
        Ok(emails)
    }

    /// Empties the outbox and returns how many e-mails it held.
    pub fn clear_history(&self) -> Result<usize, NotifyError> {
        let count = self.history(None)?.len();
        let path = self.outbox_file();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        info!(count, "cleared alert e-mail history");
        Ok(count)
    }

    fn append(&self, path: &Path, email: &EmailAlert) -> Result<(), NotifyError> {
        ensure_dir(&self.outbox_dir)?;
        let line = serde_json::to_string(email)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

impl NotificationSink for OutboxEmailSink {
    fn name(&self) -> &str {
        "email-outbox"
    }

    fn notify(&mut self, alert: &BudgetAlert) -> Result<(), NotifyError> {
        if !self.enabled {
            debug!(budget = alert.budget_id(), "e-mail alerts disabled; skipping");
            return Ok(());
        }
        let recipient = self
            .recipient
            .as_deref()
            .ok_or_else(|| NotifyError::Rejected("no e-mail address configured".into()))?;
        let email = EmailAlert::render(alert, recipient, Utc::now());
        let path = self.outbox_file();
        self.append(&path, &email)?;
        info!(to = recipient, subject = %email.subject, "queued budget alert e-mail");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use crate::domain::{Budget, BudgetMetrics, BudgetPeriod, ThresholdTier};
    use std::fs;
    use tempfile::TempDir;

    fn alert(spent: f64) -> BudgetAlert {
        let budget = Budget {
            id: "b7".into(),
            category_id: "bills".into(),
            amount: 200.0,
            period: BudgetPeriod::Monthly,
            created_at: Utc::now(),
        };
        BudgetAlert::new(
            BudgetMetrics::from_spent(budget, spent),
            ThresholdTier::Critical,
            CurrencyCode::default(),
        )
    }

    #[test]
    fn subject_and_body_summarise_the_budget() {
        let email = EmailAlert::render(&alert(180.0), "me@example.com", Utc::now());
        assert_eq!(email.subject, "Budget Alert: Bills & Utilities - 90.0% Used");
        assert!(email.body.contains("Spent: €180.00"));
        assert!(email.body.contains("Remaining: €20.00"));
        assert!(email.body.contains("approaching"));
    }

    #[test]
    fn enabled_sink_appends_json_lines() {
        let temp = TempDir::new().expect("temp dir");
        let mut sink = OutboxEmailSink::new(temp.path(), Some("me@example.com".into()), true);
        sink.notify(&alert(180.0)).expect("first");
        sink.notify(&alert(190.0)).expect("second");
        let contents = fs::read_to_string(sink.outbox_file()).expect("outbox");
        let lines: Vec<EmailAlert> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].budget_id, "b7");
    }

    #[test]
    fn disabled_sink_writes_nothing_and_missing_address_fails() {
        let temp = TempDir::new().expect("temp dir");
        let mut disabled = OutboxEmailSink::new(temp.path(), Some("me@example.com".into()), false);
        disabled.notify(&alert(180.0)).expect("skipped");
        assert!(!disabled.outbox_file().exists());

        let mut no_address = OutboxEmailSink::new(temp.path(), Some("  ".into()), true);
        assert!(matches!(
            no_address.notify(&alert(180.0)),
            Err(NotifyError::Rejected(_))
        ));
    }

    #[test]
    fn history_filters_by_budget_and_clear_empties_it() {
        let temp = TempDir::new().expect("temp dir");
        let mut sink = OutboxEmailSink::new(temp.path(), Some("me@example.com".into()), true);
        sink.notify(&alert(180.0)).expect("b7");
        sink.notify(&BudgetAlert::sample(CurrencyCode::default()))
            .expect("sample");
        fs::OpenOptions::new()
            .append(true)
            .open(sink.outbox_file())
            .and_then(|mut file| writeln!(file, "{{truncated"))
            .expect("append junk");

        assert_eq!(sink.history(None).expect("all").len(), 2);
        let for_b7 = sink.history(Some("b7")).expect("b7 only");
        assert_eq!(for_b7.len(), 1);
        assert!(for_b7[0].subject.contains("Bills & Utilities"));

        assert_eq!(sink.clear_history().expect("clear"), 2);
        assert!(sink.history(None).expect("empty").is_empty());
        assert_eq!(sink.clear_history().expect("clear again"), 0);
    }
}
