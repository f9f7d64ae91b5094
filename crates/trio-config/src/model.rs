use std::{
    env,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use trio_domain::AllocationPolicy;

/// Environment variable overriding the application home directory.
pub const HOME_ENV: &str = "TRIO_HOME";
const HOME_DIR_NAME: &str = ".trio_budget";
const DATA_DIR_NAME: &str = "data";

/// Stores user preferences; every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Currency label given to new goals.
    #[serde(default = "Config::default_currency_label")]
    pub currency_label: String,
    /// Used when no allocation was ever saved or the saved one is invalid.
    #[serde(default)]
    pub default_allocation: AllocationPolicy,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the budget documents. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Tracing directive applied when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_label: Self::default_currency_label(),
            default_allocation: AllocationPolicy::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            backup_retention: Self::default_backup_retention(),
            data_dir: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_currency_label() -> String {
        "THB (฿)".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// `$TRIO_HOME`, else `~/.trio_budget`, else `./.trio_budget`.
    pub fn resolve_home() -> PathBuf {
        if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HOME_DIR_NAME)
    }

    pub fn resolve_data_dir(&self, home: &Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => home.join(DATA_DIR_NAME),
        }
    }

    /// Retention with the floor of one backup applied.
    pub fn effective_backup_retention(&self) -> usize {
        self.backup_retention.max(1)
    }

    /// The configured default allocation, or 50/30/20 when it does not add up to 100.
    pub fn effective_default_allocation(&self) -> AllocationPolicy {
        if self.default_allocation.is_balanced() {
            self.default_allocation
        } else {
            AllocationPolicy::default()
        }
    }
}
