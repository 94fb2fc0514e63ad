use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::config::Config;
use crate::notify::BudgetAlert;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config show\nconfig set <key> <value>\nconfig test-alert",
        cmd_config,
    )
    .with_subcommands(&["show", "set", "test-alert"])]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        show_config(context);
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 2 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1].to_lowercase();
            let value = args.get(2..).unwrap_or_default().join(" ");
            let mut updated = context.config.clone();
            updated.set(&key, &value)?;
            context.config_manager.save(&updated)?;
            context.config = updated;
            context.apply_config();
            io::print_success(format!("Updated `{key}`."));
            Ok(())
        }
        "test-alert" => send_test_alert(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}` (use show, set or test-alert)"
        ))),
    }
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    output_section("Configuration");
    io::print_info(format!("  currency      : {}", config.currency));
    io::print_info(format!("  locale        : {}", config.locale));
    io::print_info(format!("  default_user  : {}", config.default_user));
    io::print_info(format!("  alert_policy  : {}", config.alert_policy));
    io::print_info(format!(
        "  email_enabled : {}",
        config.notifications.email_enabled
    ));
    io::print_info(format!(
        "  email         : {}",
        config.notifications.email.as_deref().unwrap_or("(not set)")
    ));
    io::print_info(format!("  file          : {}", context.config_manager.path().display()));
}

/// Pushes a sample alert through every configured channel.
fn send_test_alert(context: &mut ShellContext) -> CommandResult {
    let alert = BudgetAlert::sample(context.tracker.currency().clone());
    let failures = context.tracker.deliver(&alert);
    if failures > 0 {
        return Err(CommandError::Message(format!(
            "test alert failed on {failures} channel(s); check `config show`"
        )));
    }
    io::print_success("Test alert sent.");
    Ok(())
}
