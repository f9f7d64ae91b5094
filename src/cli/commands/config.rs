use std::path::PathBuf;

use trio_config::Config;
use trio_core::AllocationService;
use trio_domain::AllocationPolicy;

use super::require;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "config [show] | config set <currency|color|retention|allocation|data_dir|log_filter> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|arg| arg.to_ascii_lowercase()).as_deref() {
        None | Some("show") => show(context),
        Some("set") => {
            let key = require(args, 1, USAGE)?;
            let value = args.get(2..).map(|words| words.join(" ")).unwrap_or_default();
            if value.is_empty() {
                return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
            }
            set(context, key, &value)
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "Unknown config action `{other}`. usage: {USAGE}"
        ))),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::key_values(&[
        ("config file", context.config_manager.config_path().display().to_string()),
        ("data dir", context.paths.data_dir.display().to_string()),
        ("currency", config.currency_label.clone()),
        ("color", on_off(config.ui_color_enabled).into()),
        ("retention", config.effective_backup_retention().to_string()),
        ("allocation", config.effective_default_allocation().to_string()),
        ("log_filter", config.log_filter.clone().unwrap_or_else(|| "-".into())),
    ]);
    Ok(())
}

enum Setting {
    Currency(String),
    Color(bool),
    Retention(usize),
    Allocation(AllocationPolicy),
    DataDir(PathBuf),
    LogFilter(String),
}

impl Setting {
    fn parse(key: &str, value: &str) -> Result<Self, CommandError> {
        Ok(match key.to_ascii_lowercase().as_str() {
            "currency" => Setting::Currency(value.to_string()),
            "color" => Setting::Color(parse_flag(value)?),
            "retention" => Setting::Retention(value.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{value}` is not a whole number."))
            })?),
            "allocation" => Setting::Allocation(AllocationService::validate(parse_policy(value)?)?),
            "data_dir" => Setting::DataDir(PathBuf::from(value)),
            "log_filter" => Setting::LogFilter(value.to_string()),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "Unknown config key `{other}`. usage: {USAGE}"
                )))
            }
        })
    }

    fn apply(self, config: &mut Config) {
        match self {
            Setting::Currency(label) => config.currency_label = label,
            Setting::Color(enabled) => config.ui_color_enabled = enabled,
            Setting::Retention(count) => config.backup_retention = count.max(1),
            Setting::Allocation(policy) => config.default_allocation = policy,
            Setting::DataDir(path) => config.data_dir = Some(path),
            Setting::LogFilter(directive) => config.log_filter = Some(directive),
        }
    }

    /// Everything but the currency label is read when the shell starts.
    fn needs_restart(&self) -> bool {
        !matches!(self, Setting::Currency(_))
    }
}

fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let setting = Setting::parse(key, value)?;
    let restart_needed = setting.needs_restart();
    context.config = context.config_manager.update(|config| setting.apply(config))?;
    output::success(format!("Set {key} = {value}"));
    if restart_needed {
        output::hint("Takes effect the next time the shell starts.");
    }
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn parse_flag(value: &str) -> Result<bool, CommandError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CommandError::InvalidArguments(format!("`{value}` is not on or off."))),
    }
}

/// Accepts `50/30/20` or `50 30 20`.
fn parse_policy(value: &str) -> Result<AllocationPolicy, CommandError> {
    let parts: Vec<u8> = value
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not an allocation.")))?;
    match parts.as_slice() {
        [needs, wants, dream] => Ok(AllocationPolicy::new(*needs, *wants, *dream)),
        _ => Err(CommandError::InvalidArguments(
            "An allocation needs three percentages, e.g. 50/30/20.".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::tests::script_context;

    #[test]
    fn policies_parse_with_slashes_or_spaces() {
        assert_eq!(parse_policy("60/30/10").unwrap(), AllocationPolicy::new(60, 30, 10));
        assert_eq!(parse_policy("60 30 10").unwrap(), AllocationPolicy::new(60, 30, 10));
        assert!(parse_policy("60/40").is_err());
    }

    #[test]
    fn set_persists_to_the_config_file() {
        let (_dir, mut context) = script_context();
        context
            .dispatch("config", "config", &["set", "currency", "EUR", "(€)"])
            .unwrap();
        let reloaded = context.config_manager.load().unwrap();
        assert_eq!(reloaded.currency_label, "EUR (€)");
        assert!(context
            .dispatch("config", "config", &["set", "allocation", "50/50/50"])
            .is_err());
    }
}
