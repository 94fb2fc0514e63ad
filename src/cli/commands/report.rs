use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::currency::format_currency_value;
use crate::domain::{CategoryRegistry, ThresholdTier};

const DEFAULT_TREND_MONTHS: u32 = 6;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "dashboard",
            "Show this month's spending overview",
            "dashboard",
            cmd_dashboard,
        ),
        CommandEntry::new(
            "trends",
            "Show monthly totals and category breakdown",
            "trends [months]",
            cmd_trends,
        ),
        CommandEntry::new(
            "alerts",
            "Show budgets near or over their limit and delivered alerts",
            "alerts [status]\nalerts history [budget-id]\nalerts clear [--yes]",
            cmd_alerts,
        )
        .with_subcommands(&["status", "history", "clear"]),
        CommandEntry::new(
            "categories",
            "List spending categories",
            "categories",
            cmd_categories,
        ),
    ]
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.tracker.dashboard();
    let currency = context.tracker.currency();
    let money = |amount: f64| format_currency_value(amount, currency);

    output::section(format!("Dashboard for {}", context.tracker.user()));
    io::print_info(format!("  This month     : {}", money(summary.month_spent)));
    io::print_info(format!("  Monthly budgets: {}", money(summary.monthly_budget_total)));
    io::print_info(format!("  Remaining      : {}", money(summary.budget_remaining)));
    let change = &summary.last_month;
    let direction = if change.difference > 0.0 { "more" } else { "less" };
    io::print_info(format!(
        "  vs last month  : {} {direction} ({:+.1}%)",
        money(change.difference.abs()),
        change.percentage_change
    ));
    io::print_info(format!(
        "  Records        : {} expenses, {} budgets",
        summary.expense_count, summary.budget_count
    ));

    if !summary.recent.is_empty() {
        output::section("Recent expenses");
        let rows: Vec<Vec<String>> = summary
            .recent
            .iter()
            .map(|expense| {
                vec![
                    expense.date.to_string(),
                    CategoryRegistry::name_of(&expense.category_id).to_string(),
                    money(expense.amount),
                    expense.description.clone(),
                ]
            })
            .collect();
        output::table(&["Date", "Category", "Amount", "Description"], &rows);
    }

    for warning in &summary.warnings {
        io::print_warning(format!(
            "{} budget at {:.1}% ({} of {})",
            CategoryRegistry::name_of(warning.category_id()),
            warning.percentage,
            money(warning.spent),
            money(warning.budget.amount)
        ));
    }
    Ok(())
}

fn cmd_trends(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let months = match args.first() {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            CommandError::InvalidArguments("months must be a positive integer".into())
        })?,
        None => DEFAULT_TREND_MONTHS,
    };
    let report = context.tracker.trends(months)?;
    let currency = context.tracker.currency();
    let money = |amount: f64| format_currency_value(amount, currency);

    output::section(format!("Spending trends since {}", report.since));
    if report.monthly.is_empty() {
        io::print_info("No expenses in this period.");
        return Ok(());
    }
    let monthly: Vec<Vec<String>> = report
        .monthly
        .iter()
        .map(|entry| vec![entry.label(), money(entry.total)])
        .collect();
    output::table(&["Month", "Total"], &monthly);

    output::section("By category");
    let categories: Vec<Vec<String>> = report
        .categories
        .iter()
        .map(|entry| {
            let share = if report.total > 0.0 {
                entry.total / report.total * 100.0
            } else {
                0.0
            };
            vec![entry.name.to_string(), money(entry.total), format!("{share:.1}%")]
        })
        .collect();
    output::table(&["Category", "Total", "Share"], &categories);
    io::print_info(format!(
        "Average per month over {} months: {}",
        report.months,
        money(report.average_monthly)
    ));
    Ok(())
}

fn cmd_alerts(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        None | Some("status") => alert_status(context),
        Some("history") => alert_history(context, args.get(1).copied()),
        Some("clear") => clear_alert_history(context, &args[1..]),
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown alerts action `{other}` (use status, history or clear)"
        ))),
    }
}

fn alert_status(context: &ShellContext) -> CommandResult {
    let metrics = context.tracker.metrics();
    let markers = context.tracker.markers();
    let currency = context.tracker.currency();

    output::section("Budget alerts");
    let mut shown = false;
    for entry in metrics.iter().filter(|m| m.percentage >= ThresholdTier::Warning.lower_bound()) {
        shown = true;
        let delivered: Vec<String> = markers
            .tiers_for(entry.id())
            .iter()
            .map(|tier| format!("{tier}%"))
            .collect();
        let delivered = if delivered.is_empty() {
            "none".to_string()
        } else {
            delivered.join(", ")
        };
        io::print_warning(format!(
            "{} ({}) at {:.1}%: {} left; alerts sent: {delivered}",
            CategoryRegistry::name_of(entry.category_id()),
            short_id(entry.id()),
            entry.percentage,
            format_currency_value(entry.remaining, currency)
        ));
    }
    if !shown {
        io::print_info("All budgets are below 80%.");
    }
    Ok(())
}

fn alert_history(context: &ShellContext, budget: Option<&str>) -> CommandResult {
    let budget_id = match budget {
        Some(prefix) => Some(resolve_budget_id(context, prefix)?),
        None => None,
    };
    let emails = context.outbox().history(budget_id.as_deref())?;

    output::section("Alert e-mails");
    if emails.is_empty() {
        io::print_info("No alert e-mails have been sent.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = emails
        .iter()
        .map(|email| {
            vec![
                email.sent_at.format("%Y-%m-%d %H:%M").to_string(),
                short_id(&email.budget_id).to_string(),
                email.subject.clone(),
                email.to.clone(),
            ]
        })
        .collect();
    output::table(&["Sent", "Budget", "Subject", "To"], &rows);
    Ok(())
}

/// Matches a budget id or unique id prefix; unknown ids pass through so
/// history for deleted budgets stays reachable.
fn resolve_budget_id(context: &ShellContext, prefix: &str) -> Result<String, CommandError> {
    let matches: Vec<String> = context
        .tracker
        .budgets()
        .into_iter()
        .map(|budget| budget.id)
        .filter(|id| id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [single] => Ok(single.clone()),
        [] => Ok(prefix.to_string()),
        _ => Err(CommandError::InvalidArguments(format!(
            "budget id prefix `{prefix}` is ambiguous"
        ))),
    }
}

fn clear_alert_history(context: &ShellContext, args: &[&str]) -> CommandResult {
    if !context.confirm("Delete the alert e-mail history?", args)? {
        io::print_info("Nothing removed.");
        return Ok(());
    }
    let removed = context.outbox().clear_history()?;
    io::print_success(format!("Removed {removed} alert e-mail(s)."));
    Ok(())
}

fn cmd_categories(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let rows: Vec<Vec<String>> = CategoryRegistry::all()
        .iter()
        .map(|category| {
            vec![
                category.id.to_string(),
                category.name.to_string(),
                category.color.to_string(),
            ]
        })
        .collect();
    output::section("Categories");
    output::table(&["Id", "Name", "Color"], &rows);
    Ok(())
}
