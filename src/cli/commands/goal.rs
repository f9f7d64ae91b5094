use chrono::NaiveDate;
use trio_domain::{Goal, GoalDraft, GoalTransactionKind, RecordId};

use super::{note_from, parse_id, parse_money, require, ParsedArgs};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "goal list | goal show <goal> | goal create <name> <target> <end-date> [--base N] [--category C] [--currency L] | goal edit <goal> [--name N] [--target T] [--base B] [--end YYYY-MM-DD] [--category C] [--currency L] | goal delete <goal> | goal add <goal> <contribution|adjustment|recurring> <amount> <note...> | goal remove <goal> <txn-id|last>";

const CREATE_OPTIONS: &[&str] = &["base", "category", "currency"];
const EDIT_OPTIONS: &[&str] = &["name", "target", "base", "end", "category", "currency"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "goal",
        "Manage savings goals and their transactions",
        USAGE,
        cmd_goal,
    )]
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args
        .first()
        .map(|arg| arg.to_ascii_lowercase())
        .unwrap_or_else(|| "list".into());
    let rest = args.get(1..).unwrap_or_default();
    match action.as_str() {
        "list" | "ls" => list(context),
        "show" => show(context, rest),
        "create" | "new" => create(context, rest),
        "edit" => edit(context, rest),
        "delete" | "rm" => delete(context, rest),
        "add" => add_transaction(context, rest),
        "remove" => remove_transaction(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown goal action `{other}`. usage: {USAGE}"
        ))),
    }
}

fn list(context: &ShellContext) -> CommandResult {
    let goals = context.session.goals();
    if goals.is_empty() {
        output::info("No goals yet. Try `goal create`.");
        return Ok(());
    }
    output::section("Goals");
    let today = context.session.today();
    let rows: Vec<Vec<String>> = goals
        .iter()
        .map(|goal| {
            vec![
                goal.id.to_string(),
                goal.name.clone(),
                format!("{} / {}", output::amount(goal.base_savings), output::amount(goal.target_amount)),
                output::percent(goal.progress_percent()),
                goal.days_left(today).to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "SAVED / TARGET", "PROGRESS", "DAYS LEFT"], &rows);
    Ok(())
}

fn show(context: &ShellContext, args: &[&str]) -> CommandResult {
    let goal_id = context.resolve_goal(require(args, 0, "goal show <goal>")?)?;
    let progress = context.session.goal_progress(goal_id)?;
    let goal = context.session.goal(goal_id)?;

    output::section(format!("Goal {}", progress.name));
    output::key_values(&[
        ("Currency", progress.currency_label.clone()),
        ("Category", goal.category.clone().unwrap_or_else(|| "-".into())),
        ("Saved", output::amount(progress.base_savings)),
        ("Target", output::amount(progress.target_amount)),
        ("Remaining", output::amount(progress.remaining_amount)),
        ("Progress", output::percent(progress.progress_percent)),
        ("Ends", goal.end_date.to_string()),
        ("Days left", progress.days_left.to_string()),
    ]);

    if goal.transactions.is_empty() {
        output::info("  No transactions.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = goal
        .transactions
        .iter()
        .map(|txn| {
            vec![
                txn.id.to_string(),
                txn.kind.to_string(),
                output::amount(txn.amount),
                txn.note.clone(),
                txn.month.map(|month| month.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    output::table(&["ID", "KIND", "AMOUNT", "NOTE", "MONTH"], &rows);
    Ok(())
}

fn create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "goal create <name> <target> <end-date> [--base N] [--category C] [--currency L]";
    let parsed = ParsedArgs::parse(args, CREATE_OPTIONS)?;
    let name = require(&parsed.positional, 0, usage)?;
    let target = parse_money(require(&parsed.positional, 1, usage)?)?;
    let end_date = parse_date(require(&parsed.positional, 2, usage)?)?;
    let base = parsed.option("base").map(parse_money).transpose()?.unwrap_or(0.0);
    let currency = parsed
        .option("currency")
        .map(str::to_string)
        .unwrap_or_else(|| context.config.currency_label.clone());

    let mut draft = GoalDraft::new(name, target, base, end_date).with_currency(currency);
    if let Some(category) = parsed.option("category") {
        draft = draft.with_category(category);
    }
    let goal = context.session.create_goal(draft)?;
    output::success(format!("Created goal `{}` (#{})", goal.name, goal.id));
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, EDIT_OPTIONS)?;
    let goal_id = context.resolve_goal(require(&parsed.positional, 0, "goal edit <goal> [--option value]...")?)?;
    if parsed.options.is_empty() {
        return Err(CommandError::InvalidArguments(
            "Nothing to change. Pass at least one of --name --target --base --end --category --currency.".into(),
        ));
    }
    let draft = draft_from(context.session.goal(goal_id)?);
    let draft = GoalDraft {
        name: parsed.option("name").map(str::to_string).unwrap_or(draft.name),
        target_amount: parsed
            .option("target")
            .map(parse_money)
            .transpose()?
            .unwrap_or(draft.target_amount),
        base_savings: parsed
            .option("base")
            .map(parse_money)
            .transpose()?
            .unwrap_or(draft.base_savings),
        end_date: parsed
            .option("end")
            .map(parse_date)
            .transpose()?
            .unwrap_or(draft.end_date),
        category: parsed.option("category").map(str::to_string).or(draft.category),
        currency_label: parsed
            .option("currency")
            .map(str::to_string)
            .unwrap_or(draft.currency_label),
    };
    let goal = context.session.update_goal(goal_id, draft)?;
    output::success(format!("Updated goal `{}`", goal.name));
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let goal_id = context.resolve_goal(require(args, 0, "goal delete <goal>")?)?;
    let goal = context.session.delete_goal(goal_id)?;
    let twins = goal.recurring_transactions().count();
    output::success(format!("Deleted goal `{}`", goal.name));
    if twins > 0 {
        output::info(format!("Removed {twins} recurring contribution(s) from the month ledgers."));
    }
    Ok(())
}

fn add_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "goal add <goal> <contribution|adjustment|recurring> <amount> <note...>";
    let goal_id = context.resolve_goal(require(args, 0, usage)?)?;
    let raw_kind = require(args, 1, usage)?;
    let kind = GoalTransactionKind::from_label(raw_kind).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "Unknown transaction kind `{raw_kind}`. Use contribution, adjustment or recurring."
        ))
    })?;
    let amount = parse_money(require(args, 2, usage)?)?;
    let note = note_from(args, 3);

    let txn = context.session.add_goal_transaction(goal_id, kind, &note, amount)?;
    output::success(format!("Added {} #{} of {}", txn.kind, txn.id, output::amount(txn.amount)));
    if let Some(month) = txn.month {
        output::info(format!("Recorded as a discretionary entry in {month}."));
    }
    Ok(())
}

fn remove_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "goal remove <goal> <txn-id|last>";
    let goal_id = context.resolve_goal(require(args, 0, usage)?)?;
    let txn_id = match require(args, 1, usage)? {
        "last" => last_transaction(context, goal_id)?,
        raw => parse_id(raw)?,
    };
    match context.session.remove_goal_transaction(goal_id, txn_id)? {
        Some(txn) => {
            output::success(format!("Removed {} #{}", txn.kind, txn.id));
            if txn.is_recurring() {
                output::info("The matching discretionary entry was removed too.");
            }
        }
        None => output::warning(format!("Goal has no transaction #{txn_id}")),
    }
    Ok(())
}

fn last_transaction(context: &ShellContext, goal_id: RecordId) -> Result<RecordId, CommandError> {
    context
        .session
        .goal_transactions(goal_id)?
        .last()
        .map(|txn| txn.id)
        .ok_or_else(|| CommandError::InvalidArguments("The goal has no transactions.".into()))
}

fn draft_from(goal: &Goal) -> GoalDraft {
    GoalDraft {
        name: goal.name.clone(),
        category: goal.category.clone(),
        currency_label: goal.currency_label.clone(),
        target_amount: goal.target_amount,
        base_savings: goal.base_savings,
        end_date: goal.end_date,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a date in YYYY-MM-DD form.")))
}
