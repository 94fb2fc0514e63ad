use crate::cli::core::{
    parse_money, parse_period, require, resolve_category, resolve_id, short_id, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::currency::format_currency_value;
use crate::domain::{BudgetPeriod, BudgetStatus, CategoryRegistry, NewBudget};

const SET_USAGE: &str = "budget set <category> <amount> [monthly|yearly]";
const UPDATE_USAGE: &str = "budget update <id> <amount> [monthly|yearly]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "budget",
        "Create, update, list and delete category budgets",
        "budget set <category> <amount> [monthly|yearly]\nbudget update <id> <amount> [monthly|yearly]\nbudget list\nbudget delete <id>",
        cmd_budget,
    )
    .with_subcommands(&["set", "update", "list", "delete"])]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let sub = args.first().map(|s| s.to_lowercase()).unwrap_or_else(|| "list".into());
    let rest = args.get(1..).unwrap_or_default();
    match sub.as_str() {
        "set" | "add" => set_budget(context, rest),
        "update" => update_budget(context, rest),
        "list" | "ls" => list_budgets(context),
        "delete" | "rm" => delete_budget(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown budget action `{other}` (use set, update, list or delete)"
        ))),
    }
}

fn set_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let category = resolve_category(require(args, 0, SET_USAGE)?)?;
    let amount = parse_money(require(args, 1, SET_USAGE)?)?;
    let period = match args.get(2) {
        Some(raw) => parse_period(raw)?,
        None => BudgetPeriod::Monthly,
    };
    let (outcome, _report) = context
        .tracker
        .add_budget(NewBudget::new(category.id, amount, period))?;
    let budget = outcome.budget();
    let verb = if outcome.is_update() { "updated" } else { "created" };
    io::print_success(format!(
        "Budget {} {verb}: {} {} for {}.",
        short_id(&budget.id),
        format_currency_value(budget.amount, context.tracker.currency()),
        budget.period,
        category.name
    ));
    Ok(())
}

fn update_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let input = require(args, 0, UPDATE_USAGE)?;
    let amount = parse_money(require(args, 1, UPDATE_USAGE)?)?;
    let budgets = context.tracker.budgets();
    let id = resolve_id(input, budgets.iter().map(|b| b.id.as_str()), "budget")?;
    let period = match args.get(2) {
        Some(raw) => parse_period(raw)?,
        None => budgets
            .iter()
            .find(|budget| budget.id == id)
            .map(|budget| budget.period)
            .unwrap_or_default(),
    };
    let (budget, _report) = context.tracker.update_budget(&id, amount, period)?;
    io::print_success(format!(
        "Budget {} now {} {}.",
        short_id(&budget.id),
        format_currency_value(budget.amount, context.tracker.currency()),
        budget.period
    ));
    Ok(())
}

fn list_budgets(context: &mut ShellContext) -> CommandResult {
    let metrics = context.tracker.metrics();
    if metrics.is_empty() {
        io::print_info("No budgets yet. Use `budget set <category> <amount>`.");
        return Ok(());
    }
    let currency = context.tracker.currency();
    let rows: Vec<Vec<String>> = metrics
        .iter()
        .map(|entry| {
            let status = match entry.status() {
                BudgetStatus::Good => "ok",
                BudgetStatus::Warning => "warning",
                BudgetStatus::Over => "over",
            };
            vec![
                short_id(entry.id()).to_string(),
                CategoryRegistry::name_of(entry.category_id()).to_string(),
                entry.budget.period.to_string(),
                format_currency_value(entry.budget.amount, currency),
                format_currency_value(entry.spent, currency),
                format_currency_value(entry.remaining, currency),
                format!("{:.1}%", entry.percentage),
                status.to_string(),
            ]
        })
        .collect();
    output::section("Budgets");
    output::table(
        &["Id", "Category", "Period", "Limit", "Spent", "Remaining", "Used", "Status"],
        &rows,
    );
    Ok(())
}

fn delete_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let input = require(args, 0, "budget delete <id>")?;
    let budgets = context.tracker.budgets();
    let id = resolve_id(input, budgets.iter().map(|b| b.id.as_str()), "budget")?;
    let (removed, _report) = context.tracker.delete_budget(&id)?;
    io::print_success(format!(
        "Deleted {} budget {}.",
        CategoryRegistry::name_of(&removed.category_id),
        short_id(&removed.id)
    ));
    Ok(())
}
