use strsim::levenshtein;

use super::context::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Largest edit distance still offered as a "did you mean".
const SUGGESTION_DISTANCE: usize = 3;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Shell commands in menu order. The table is small, so lookups scan it.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`, replacing an earlier entry of the same name in place.
    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn list(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    /// The registered name nearest to `input`, if it is close enough.
    pub fn closest(&self, input: &str) -> Option<&'static str> {
        let input = input.to_lowercase();
        self.names()
            .map(|name| (levenshtein(name, &input), name))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn keeps_registration_order_and_replaces_duplicates() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("month", "Switch month", "month", noop));
        registry.register(CommandEntry::new("entry", "Manage entries", "entry", noop));
        registry.register(CommandEntry::new("month", "Switch month again", "month", noop));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["month", "entry"]);
        assert_eq!(registry.get("month").map(|e| e.description), Some("Switch month again"));
        assert!(registry.handler("goal").is_none());
    }

    #[test]
    fn closest_ignores_distant_names() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("summary", "", "", noop));
        registry.register(CommandEntry::new("history", "", "", noop));
        assert_eq!(registry.closest("Sumary"), Some("summary"));
        assert_eq!(registry.closest("allocation"), None);
    }
}
