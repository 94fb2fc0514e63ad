use crate::cli::core::{
    parse_date, parse_money, require, resolve_category, resolve_id, short_id, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::ExpenseService;
use crate::currency::format_currency_value;
use crate::domain::{CategoryRegistry, NewExpense};

const ADD_USAGE: &str = "expense add <amount> <category> [--date YYYY-MM-DD] [description]";
const DEFAULT_LIST_LIMIT: usize = 20;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Record, list and delete expenses",
        "expense add <amount> <category> [--date YYYY-MM-DD] [description]\nexpense list [limit]\nexpense delete <id>",
        cmd_expense,
    )
    .with_subcommands(&["add", "list", "delete"])]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let sub = args.first().map(|s| s.to_lowercase()).unwrap_or_else(|| "list".into());
    let rest = args.get(1..).unwrap_or_default();
    match sub.as_str() {
        "add" => add_expense(context, rest),
        "list" | "ls" => list_expenses(context, rest),
        "delete" | "rm" => delete_expense(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown expense action `{other}` (use add, list or delete)"
        ))),
    }
}

fn add_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let amount = parse_money(require(args, 0, ADD_USAGE)?)?;
    let category = resolve_category(require(args, 1, ADD_USAGE)?)?;

    let mut date = None;
    let mut words = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if *arg == "--date" {
            let value = iter
                .next()
                .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {ADD_USAGE}")))?;
            date = Some(parse_date(value)?);
        } else {
            words.push(*arg);
        }
    }
    let date = date.unwrap_or_else(|| context.tracker.today());

    let draft = NewExpense::new(amount, category.id, words.join(" "), date);
    let (expense, _report) = context.tracker.add_expense(draft)?;
    io::print_success(format!(
        "Expense {} added: {} in {} on {}.",
        short_id(&expense.id),
        format_currency_value(expense.amount, context.tracker.currency()),
        category.name,
        expense.date
    ));
    Ok(())
}

fn list_expenses(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments("limit must be a positive integer".into())
        })?,
        None => DEFAULT_LIST_LIMIT,
    };
    let expenses = context.tracker.expenses();
    if expenses.is_empty() {
        io::print_info("No expenses recorded yet.");
        return Ok(());
    }
    let currency = context.tracker.currency();
    let rows: Vec<Vec<String>> = ExpenseService::sorted_by_date(&expenses)
        .into_iter()
        .take(limit)
        .map(|expense| {
            vec![
                short_id(&expense.id).to_string(),
                expense.date.to_string(),
                CategoryRegistry::name_of(&expense.category_id).to_string(),
                format_currency_value(expense.amount, currency),
                expense.description.clone(),
            ]
        })
        .collect();
    output::section(format!("Expenses ({} total)", expenses.len()));
    output::table(&["Id", "Date", "Category", "Amount", "Description"], &rows);
    Ok(())
}

fn delete_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let input = require(args, 0, "expense delete <id>")?;
    let expenses = context.tracker.expenses();
    let id = resolve_id(input, expenses.iter().map(|e| e.id.as_str()), "expense")?;
    let (removed, _report) = context.tracker.delete_expense(&id)?;
    io::print_success(format!(
        "Deleted expense {} ({}).",
        short_id(&removed.id),
        format_currency_value(removed.amount, context.tracker.currency())
    ));
    Ok(())
}
