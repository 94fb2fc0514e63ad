use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn script(home: &TempDir, input: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("budget_buddy_cli").unwrap();
    cmd.env("BUDGET_BUDDY_CLI_SCRIPT", "1")
        .env("BUDGET_BUDDY_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_fires_a_budget_warning() {
    let home = TempDir::new().unwrap();
    script(
        &home,
        "# monthly food budget\nbudget set food 100\nexpense add 82 food groceries\nexit\n",
    )
    .success()
    .stdout(contains("Budget Warning: Food & Dining"))
    .stdout(contains("82.0%"));
}

#[test]
fn alerts_are_not_repeated_across_runs() {
    let home = TempDir::new().unwrap();
    script(&home, "budget set food 100\nexpense add 85 food\nexit\n")
        .success()
        .stdout(contains("Critical Budget Alert: Food & Dining"));

    script(&home, "expense add 1 food\nbudget list\nexit\n")
        .success()
        .stdout(contains("Critical Budget Alert").not());
}

#[test]
fn export_writes_a_versioned_snapshot() {
    let home = TempDir::new().unwrap();
    let target = home.path().join("snapshot.json");
    script(
        &home,
        &format!(
            "expense add 12.50 transport bus\ndata export {}\nexit\n",
            target.display()
        ),
    )
    .success()
    .stdout(contains("Exported"));

    let json = std::fs::read_to_string(&target).unwrap();
    assert!(json.contains("\"version\": \"1.0.0\""));
    assert!(json.contains("\"transport\""));
}

#[test]
fn clear_requires_confirmation_in_script_mode() {
    let home = TempDir::new().unwrap();
    script(&home, "expense add 5 food\ndata clear\nexpense list\nexit\n")
        .success()
        .stdout(contains("pass --yes"))
        .stdout(contains("Expenses (1 total)"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = TempDir::new().unwrap();
    script(&home, "budgt list\nexit\n")
        .success()
        .stdout(contains("Suggestion: `budget`?"));
}

#[test]
fn alert_history_lists_queued_emails_until_cleared() {
    let home = TempDir::new().unwrap();
    script(
        &home,
        "config set email me@example.com\nconfig set email_enabled true\nbudget set food 100\nexpense add 85 food\nalerts history\nexit\n",
    )
    .success()
    .stdout(contains("Budget Alert: Food & Dining - 85.0% Used"))
    .stdout(contains("me@example.com"));

    script(&home, "alerts history nosuchbudget\nexit\n")
        .success()
        .stdout(contains("No alert e-mails have been sent."));

    script(&home, "alerts clear --yes\nalerts history\nexit\n")
        .success()
        .stdout(contains("Removed 1 alert e-mail(s)."))
        .stdout(contains("No alert e-mails have been sent."));
}

#[test]
fn test_alert_goes_through_the_console_channel() {
    let home = TempDir::new().unwrap();
    script(&home, "config test-alert\nexit\n")
        .success()
        .stdout(contains("Critical Budget Alert: Food & Dining"))
        .stdout(contains("Test alert sent."));
}

#[test]
fn test_alert_reports_a_misconfigured_email_channel() {
    let home = TempDir::new().unwrap();
    script(&home, "config set email_enabled true\nconfig test-alert\nexit\n")
        .success()
        .stdout(contains("test alert failed on 1 channel(s)"));
}
