use trio_core::GoalService;
use trio_domain::{EntryCategory, RecordId};

use super::{note_from, parse_category, parse_id, parse_money, require};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "entry add <category> <amount> [note...] | entry remove <category> <id|last> | entry list [category]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "entry",
        "Record, remove or list entries of the active month",
        USAGE,
        cmd_entry,
    )]
}

fn cmd_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = require(args, 0, USAGE)?.to_ascii_lowercase();
    let rest = &args[1..];
    match action.as_str() {
        "add" => add(context, rest),
        "remove" | "rm" => remove(context, rest),
        "list" | "ls" => list(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown entry action `{other}`. usage: {USAGE}"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "entry add <category> <amount> [note...]";
    let category = parse_category(require(args, 0, usage)?)?;
    let amount = parse_money(require(args, 1, usage)?)?;
    let note = note_from(args, 2);
    let entry = context.session.add_entry(category, &note, amount)?;
    output::success(format!(
        "Added {} entry #{} of {} to {}",
        category,
        entry.id,
        output::amount(entry.amount),
        context.session.active_month()
    ));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "entry remove <category> <id|last>";
    let category = parse_category(require(args, 0, usage)?)?;
    let id = match require(args, 1, usage)? {
        "last" => last_id(context, category)?,
        raw => parse_id(raw)?,
    };
    let owner = if category == EntryCategory::Discretionary {
        GoalService::owner_of_recurring(context.session.goals(), id)
    } else {
        None
    };

    match context.session.remove_entry(category, id)? {
        Some(entry) => {
            output::success(format!("Removed {} entry #{}", category, entry.id));
            if let Some(goal) = owner.and_then(|goal_id| context.session.goal(goal_id).ok()) {
                output::info(format!("Also removed the contribution from goal `{}`.", goal.name));
            }
        }
        None => output::warning(format!("No {} entry #{} in {}", category, id, context.session.active_month())),
    }
    Ok(())
}

fn last_id(context: &ShellContext, category: EntryCategory) -> Result<RecordId, CommandError> {
    context
        .session
        .entries(category)
        .last()
        .map(|entry| entry.id)
        .ok_or_else(|| CommandError::InvalidArguments(format!("No {category} entries to remove.")))
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let categories = match args.first() {
        Some(raw) => vec![parse_category(raw)?],
        None => EntryCategory::ALL.to_vec(),
    };
    output::section(format!("Entries for {}", context.session.active_month()));
    for category in categories {
        let entries = context.session.entries(category);
        if entries.is_empty() {
            output::info(format!("  {category}: none"));
            continue;
        }
        output::info(format!("  {category}:"));
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| {
                vec![
                    entry.id.to_string(),
                    output::amount(entry.amount),
                    entry.note.clone(),
                    entry.created_at.clone(),
                ]
            })
            .collect();
        output::table(&["ID", "AMOUNT", "NOTE", "RECORDED"], &rows);
    }
    Ok(())
}
