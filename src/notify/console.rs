use colored::Colorize;

use super::{BudgetAlert, NotificationSink, NotifyError};
use crate::domain::ThresholdTier;

/// Prints alerts as coloured toast lines on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn render(alert: &BudgetAlert) -> String {
        let title = alert.title();
        let title = match alert.tier {
            ThresholdTier::Warning => title.bright_yellow().bold(),
            ThresholdTier::Critical => title.yellow().bold(),
            ThresholdTier::Exceeded => title.bright_red().bold(),
        };
        format!("ALERT: [{}] {} - {}", alert.tier, title, alert.description())
    }
}

impl NotificationSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn notify(&mut self, alert: &BudgetAlert) -> Result<(), NotifyError> {
        println!("{}", Self::render(alert));
        Ok(())
    }
}
