use std::{fs, path::Path};

use chrono::Utc;

use crate::cli::core::{require, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::storage::{clear_all, export_all, import_all, storage_info, AppData};
use crate::utils::write_atomic;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "data",
        "Export, import, clear and inspect stored data",
        "data export <file>\ndata import <file>\ndata clear [--yes]\ndata info",
        cmd_data,
    )
    .with_subcommands(&["export", "import", "clear", "info"])]
}

fn cmd_data(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let sub = args.first().map(|s| s.to_lowercase()).unwrap_or_else(|| "info".into());
    let rest = args.get(1..).unwrap_or_default();
    match sub.as_str() {
        "export" => export(context, rest),
        "import" => import(context, rest),
        "clear" => clear(context, rest),
        "info" => info(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown data action `{other}` (use export, import, clear or info)"
        ))),
    }
}

fn export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = Path::new(require(args, 0, "data export <file>")?);
    let data = export_all(context.tracker.store(), Utc::now())?;
    write_atomic(path, &data.to_json()?)?;
    io::print_success(format!(
        "Exported {} user(s) to {}.",
        data.users.len(),
        path.display()
    ));
    Ok(())
}

fn import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = Path::new(require(args, 0, "data import <file>")?);
    let raw = fs::read_to_string(path)?;
    let data = AppData::from_json(&raw)?;
    let report = import_all(context.tracker.store(), &data)?;
    io::print_success(format!(
        "Imported {} user(s), {} expense(s), {} budget(s).",
        report.users, report.expenses, report.budgets
    ));
    context.tracker.refresh()?;
    Ok(())
}

fn clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !context.confirm("Delete all expenses, budgets and alert history?", args)? {
        io::print_info("Nothing was deleted.");
        return Ok(());
    }
    let removed = clear_all(context.tracker.store())?;
    io::print_success(format!("Cleared {removed} stored entries."));
    Ok(())
}

fn info(context: &mut ShellContext) -> CommandResult {
    let info = storage_info(context.tracker.store())?;
    io::print_info(format!(
        "Storage: {} entries, {:.2} KiB in {}",
        info.entries,
        info.used_kib(),
        context.tracker.store().backend().data_dir().display()
    ));
    Ok(())
}
