use std::collections::HashMap;

use trio_core::validation::parse_amount;
use trio_domain::{EntryCategory, RecordId};

use super::context::CommandError;
use super::registry::{CommandEntry, CommandRegistry};

pub mod allocation;
pub mod backup;
pub mod config;
pub mod entry;
pub mod goal;
pub mod month;
pub mod summary;
pub mod system;

const ROOT_COMMAND_ORDER: &[&str] = &[
    "month",
    "entry",
    "summary",
    "history",
    "allocation",
    "goal",
    "check",
    "save",
    "backup",
    "config",
    "version",
    "help",
    "exit",
];

pub fn register_all(registry: &mut CommandRegistry) {
    let mut entries: Vec<CommandEntry> = Vec::new();
    entries.extend(month::definitions());
    entries.extend(entry::definitions());
    entries.extend(summary::definitions());
    entries.extend(allocation::definitions());
    entries.extend(goal::definitions());
    entries.extend(backup::definitions());
    entries.extend(config::definitions());
    entries.extend(system::definitions());

    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| *name == entry.name)
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in entries {
        registry.register(entry);
    }
}

/// Positional arguments plus `--flag value` pairs.
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    pub options: HashMap<&'a str, &'a str>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(args: &[&'a str], known: &[&str]) -> Result<Self, CommandError> {
        let mut positional = Vec::new();
        let mut options = HashMap::new();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(flag) if known.contains(&flag) => {
                    let value = iter.next().ok_or_else(|| {
                        CommandError::InvalidArguments(format!("`--{flag}` needs a value."))
                    })?;
                    options.insert(flag, value);
                }
                Some(flag) if !flag.is_empty() => {
                    return Err(CommandError::InvalidArguments(format!(
                        "Unknown option `--{flag}`."
                    )))
                }
                _ => positional.push(arg),
            }
        }
        Ok(Self {
            positional,
            options,
        })
    }

    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options.get(name).copied()
    }
}

pub(crate) fn require<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}

pub(crate) fn parse_category(raw: &str) -> Result<EntryCategory, CommandError> {
    EntryCategory::from_label(raw).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "Unknown category `{raw}`. Use income, essentials, discretionary or savings."
        ))
    })
}

pub(crate) fn parse_money(raw: &str) -> Result<f64, CommandError> {
    Ok(parse_amount(raw)?)
}

pub(crate) fn parse_id(raw: &str) -> Result<RecordId, CommandError> {
    raw.parse::<RecordId>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a record id.")))
}

/// Joins the remaining words into a free-text note.
pub(crate) fn note_from(args: &[&str], from: usize) -> String {
    args.get(from..).map(|words| words.join(" ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_in_menu_order() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ROOT_COMMAND_ORDER.to_vec());
    }

    #[test]
    fn options_are_split_from_positionals() {
        let args = ["Trip", "1000", "--base", "250", "2024-12-31"];
        let parsed = ParsedArgs::parse(&args, &["base", "category"]).unwrap();
        assert_eq!(parsed.positional, vec!["Trip", "1000", "2024-12-31"]);
        assert_eq!(parsed.option("base"), Some("250"));
        assert!(ParsedArgs::parse(&["--base"], &["base"]).is_err());
        assert!(ParsedArgs::parse(&["--color", "x"], &["base"]).is_err());
    }

    #[test]
    fn notes_join_trailing_words() {
        assert_eq!(note_from(&["essentials", "300", "rent", "and", "water"], 2), "rent and water");
        assert_eq!(note_from(&["income", "1000"], 2), "");
    }
}
