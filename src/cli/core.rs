//! Shell errors, loop control and argument parsing shared by the command modules.

use std::io;

use chrono::NaiveDate;
use rustyline::error::ReadlineError;

use crate::{
    config::ConfigError,
    core::services::ServiceError,
    domain::{parse_amount, BudgetPeriod, Category, CategoryRegistry},
    errors::BuddyError,
    notify::NotifyError,
};

pub use crate::cli::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BuddyError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] BuddyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
            other => CommandError::Core(other.into()),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Core(err.into())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

pub(crate) fn require<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_money(input: &str) -> Result<f64, CommandError> {
    parse_amount(input, "amount").map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

pub(crate) fn parse_period(input: &str) -> Result<BudgetPeriod, CommandError> {
    input.parse().map_err(CommandError::InvalidArguments)
}

/// Accepts a category id or its display name, ignoring case.
pub(crate) fn resolve_category(input: &str) -> Result<&'static Category, CommandError> {
    let needle = input.trim().to_lowercase();
    CategoryRegistry::all()
        .iter()
        .find(|category| category.id == needle || category.name.to_lowercase() == needle)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "unknown category `{input}`. Use `categories` to list them."
            ))
        })
}

/// Resolves a full id from a unique prefix such as the short ids shown in listings.
pub(crate) fn resolve_id<'a, I>(input: &str, ids: I, kind: &str) -> Result<String, CommandError>
where
    I: IntoIterator<Item = &'a str>,
{
    let matches: Vec<&str> = ids.into_iter().filter(|id| id.starts_with(input)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == input) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(CommandError::Message(format!("no {kind} matches `{input}`"))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{input}` matches {} {kind}s; use a longer id",
            matches.len()
        ))),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_resolve_by_id_or_name() {
        assert_eq!(resolve_category("FOOD").expect("id").id, "food");
        assert_eq!(resolve_category("bills & utilities").expect("name").id, "bills");
        assert!(resolve_category("pets").is_err());
    }

    #[test]
    fn ids_resolve_from_unique_prefixes() {
        let ids = ["3f2a77c1-aaaa", "3f2b0000-bbbb", "legacy"];
        assert_eq!(
            resolve_id("3f2a", ids.iter().copied(), "expense").expect("unique"),
            "3f2a77c1-aaaa"
        );
        assert!(matches!(
            resolve_id("3f2", ids.iter().copied(), "expense"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(resolve_id("zzz", ids.iter().copied(), "expense").is_err());
        assert_eq!(short_id("legacy"), "legacy");
    }

    #[test]
    fn money_and_periods_parse_user_input() {
        assert_eq!(parse_money("€1,250.50").expect("money"), 1250.5);
        assert!(parse_money("-3").is_err());
        assert_eq!(parse_period("year").expect("period"), BudgetPeriod::Yearly);
        assert!(parse_date("2025-13-01").is_err());
    }
}
