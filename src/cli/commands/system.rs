use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::domain::UserScope;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "user",
            "Show or switch the active user scope",
            "user [id]",
            cmd_user,
        ),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(id) = args.first() else {
        io::print_info(format!("Active user: {}", context.tracker.user()));
        return Ok(());
    };
    let scope = UserScope::new(*id);
    context.tracker.store().register_user(&scope)?;
    context.tracker.switch_user(scope);
    io::print_success(format!("Switched to user `{}`.", context.tracker.user()));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&command) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
