use trio_core::CoreError;
use trio_domain::{EntryCategory, MonthKey};

use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "month",
        "Show or switch the active month",
        "month [YYYY-MM|next|prev]",
        cmd_month,
    )]
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let created = match args.first().map(|arg| arg.to_ascii_lowercase()) {
        None => {
            let month = context.session.active_month();
            let count: usize = EntryCategory::ALL
                .iter()
                .map(|category| context.session.entries(*category).len())
                .sum();
            output::info(format!("Active month: {month} ({count} entries)"));
            return Ok(());
        }
        Some(arg) if arg == "next" => {
            let month = context.session.active_month().next();
            context.session.select_month(month)?
        }
        Some(arg) if arg == "prev" || arg == "previous" => {
            let month = context.session.active_month().previous();
            context.session.select_month(month)?
        }
        Some(arg) => {
            let month = MonthKey::parse(&arg).map_err(CoreError::from)?;
            context.session.select_month(month)?
        }
    };

    let month = context.session.active_month();
    if created {
        output::success(format!("Active month: {month} (new ledger)"));
    } else {
        output::success(format!("Active month: {month}"));
    }
    Ok(())
}
