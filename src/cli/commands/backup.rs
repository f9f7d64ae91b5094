use trio_core::DocumentKey;

use super::require;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "backup list <months|goals|allocation> | backup restore <months|goals|allocation> <backup-id|latest>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "backup",
        "List or restore previous versions of a document",
        USAGE,
        cmd_backup,
    )]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = require(args, 0, USAGE)?.to_ascii_lowercase();
    let key = document_key(require(args, 1, USAGE)?)?;
    match action.as_str() {
        "list" | "ls" => list(context, key),
        "restore" => restore(context, key, require(args, 2, USAGE)?),
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown backup action `{other}`. usage: {USAGE}"
        ))),
    }
}

fn list(context: &ShellContext, key: DocumentKey) -> CommandResult {
    let backups = context.store.list_backups(key)?;
    if backups.is_empty() {
        output::info(format!("No backups of {key} yet."));
        return Ok(());
    }
    output::section(format!("Backups of {key}"));
    let rows: Vec<Vec<String>> = backups
        .iter()
        .map(|backup| {
            vec![
                backup.id.clone(),
                backup
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".into()),
                format!("{} B", backup.size_bytes),
            ]
        })
        .collect();
    output::table(&["ID", "CREATED (UTC)", "SIZE"], &rows);
    Ok(())
}

fn restore(context: &mut ShellContext, key: DocumentKey, id: &str) -> CommandResult {
    let backup = if id.eq_ignore_ascii_case("latest") {
        context
            .store
            .list_backups(key)?
            .into_iter()
            .next()
            .ok_or_else(|| CommandError::Message(format!("No backups of {key} to restore.")))?
    } else {
        context.store.find_backup(key, id)?
    };
    context.store.restore_backup(&backup)?;
    context.reopen_session()?;
    output::success(format!("Restored {key} from {}", backup.id));
    Ok(())
}

fn document_key(raw: &str) -> Result<DocumentKey, CommandError> {
    let needle = raw.trim().to_ascii_lowercase();
    let key = match needle.as_str() {
        "months" | "month" | "records" => Some(DocumentKey::MonthlyRecords),
        "goals" | "goal" => Some(DocumentKey::Goals),
        "allocation" | "percents" => Some(DocumentKey::AllocationPolicy),
        _ => DocumentKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(&needle)),
    };
    key.ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "Unknown document `{raw}`. Use months, goals or allocation."
        ))
    })
}
