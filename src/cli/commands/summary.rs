use trio_core::CoreError;
use trio_domain::{MonthKey, MonthOverview};

use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Show bucket usage for the active or a given month",
            "summary [YYYY-MM] [--json]",
            cmd_summary,
        ),
        CommandEntry::new(
            "history",
            "List every stored month, newest first",
            "history",
            cmd_history,
        ),
        CommandEntry::new(
            "check",
            "Verify goal contributions against month entries",
            "check",
            cmd_check,
        ),
        CommandEntry::new("save", "Write all documents to disk", "save", cmd_save),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let json = args.contains(&"--json");
    let month = match args.iter().find(|arg| !arg.starts_with("--")) {
        Some(raw) => MonthKey::parse(raw).map_err(CoreError::from)?,
        None => context.session.active_month(),
    };
    let overview = context.session.overview_for(month);

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }
    render_overview(&overview);
    Ok(())
}

fn render_overview(overview: &MonthOverview) {
    output::section(format!(
        "Summary {} (allocation {})",
        overview.month, overview.allocation
    ));
    output::key_values(&[("Income", output::amount(overview.totals.income))]);

    let rows: Vec<Vec<String>> = overview
        .buckets
        .iter()
        .map(|metrics| {
            vec![
                metrics.bucket.to_string(),
                format!("{}%", metrics.percent),
                output::amount(metrics.recommended),
                output::amount(metrics.used),
                output::amount(metrics.remaining),
                output::percent(metrics.percent_used),
            ]
        })
        .collect();
    output::table(
        &["BUCKET", "SHARE", "RECOMMENDED", "USED", "REMAINING", "USED %"],
        &rows,
    );
    for metrics in overview.buckets.iter().filter(|metrics| metrics.is_overspent()) {
        output::warning(format!(
            "{} is over budget by {}",
            metrics.bucket,
            output::amount(-metrics.remaining)
        ));
    }

    output::key_values(&[
        ("Total remaining", output::amount(overview.total_remaining())),
        ("Expense", output::amount(overview.expense())),
        ("Balance", output::amount(overview.balance())),
    ]);
}

fn cmd_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let history = context.session.history();
    if history.is_empty() {
        output::info("No months recorded yet.");
        return Ok(());
    }
    output::section("History");
    let rows: Vec<Vec<String>> = history
        .iter()
        .map(|summary| {
            vec![
                summary.month.to_string(),
                output::amount(summary.income),
                output::amount(summary.expense),
                output::amount(summary.balance),
            ]
        })
        .collect();
    output::table(&["MONTH", "INCOME", "EXPENSE", "BALANCE"], &rows);
    Ok(())
}

fn cmd_check(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let issues = context.session.integrity_report();
    if issues.is_empty() {
        output::success("Goals and month ledgers are consistent.");
        return Ok(());
    }
    for issue in &issues {
        output::warning(issue);
    }
    output::hint("Remove and re-add the affected goal transactions to repair them.");
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.persist_all()?;
    output::success(format!(
        "Saved all documents to {}",
        context.paths.data_dir.display()
    ));
    Ok(())
}
