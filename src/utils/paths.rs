use std::path::PathBuf;

use trio_config::Config;

/// Directories the application reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub home: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn resolve(config: &Config) -> Self {
        Self::with_home(Config::resolve_home(), config)
    }

    pub fn with_home(home: PathBuf, config: &Config) -> Self {
        let data_dir = config.resolve_data_dir(&home);
        Self { home, data_dir }
    }
}
