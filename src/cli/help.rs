use super::output::{hint, info, key_values, section};
use super::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    section("Available commands");
    let width = registry
        .names()
        .map(str::len)
        .max()
        .unwrap_or(0);
    for entry in registry.list() {
        info(format!("  {:<width$}  {}", entry.name, entry.description));
    }
    hint("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    section(format!("Help: {}", entry.name));
    key_values(&[
        ("description", entry.description.to_string()),
        ("usage", entry.usage.to_string()),
    ]);
}
