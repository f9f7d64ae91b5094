use trio_domain::{AllocationPolicy, BudgetBucket};

use super::require;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "allocation [show] | allocation set <needs> <wants> <dream> | allocation cut <needs-end> <wants-end> | allocation reset";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "allocation",
        "Show or change the needs/wants/dream split",
        USAGE,
        cmd_allocation,
    )]
}

fn cmd_allocation(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|arg| arg.to_ascii_lowercase()).as_deref() {
        None | Some("show") => show(context),
        Some("set") => {
            let usage = "allocation set <needs> <wants> <dream>";
            let policy = AllocationPolicy::new(
                percent(require(args, 1, usage)?)?,
                percent(require(args, 2, usage)?)?,
                percent(require(args, 3, usage)?)?,
            );
            apply(context, policy)
        }
        Some("cut") => {
            let usage = "allocation cut <needs-end> <wants-end>";
            let needs_end = percent(require(args, 1, usage)?)?;
            let wants_end = percent(require(args, 2, usage)?)?;
            let policy = AllocationPolicy::from_cut_points(needs_end, wants_end).ok_or_else(|| {
                CommandError::InvalidArguments(
                    "Cut points must satisfy needs-end <= wants-end <= 100.".into(),
                )
            })?;
            apply(context, policy)
        }
        Some("reset") => {
            context.session.reset_allocation()?;
            output::success(format!("Allocation reset to {}", context.session.allocation()));
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "Unknown allocation action `{other}`. usage: {USAGE}"
        ))),
    }
}

fn apply(context: &mut ShellContext, policy: AllocationPolicy) -> CommandResult {
    context.session.set_allocation(policy)?;
    output::success(format!("Allocation set to {policy}"));
    Ok(())
}

fn show(context: &ShellContext) -> CommandResult {
    output::section(format!("Allocation {}", context.session.allocation()));
    let policy = context.session.allocation();
    let rows: Vec<Vec<String>> = BudgetBucket::ALL
        .iter()
        .map(|bucket| {
            vec![
                bucket.to_string(),
                format!("{}%", policy.percent(*bucket)),
                output::amount(context.session.recommended_amount(*bucket)),
            ]
        })
        .collect();
    output::table(&["BUCKET", "SHARE", "RECOMMENDED"], &rows);
    Ok(())
}

fn percent(raw: &str) -> Result<u8, CommandError> {
    raw.trim()
        .trim_end_matches('%')
        .parse::<u8>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a whole percentage.")))
}
