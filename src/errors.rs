use thiserror::Error;
use trio_config::ConfigError;
use trio_core::CoreError;

/// Unified error type for core, storage and configuration failures.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
}

impl BudgetError {
    /// The change was applied in memory but may not be on disk yet.
    pub fn is_persistence(&self) -> bool {
        match self {
            BudgetError::Core(err) => err.is_persistence(),
            BudgetError::StorageError(_) => true,
            BudgetError::ConfigError(_) => false,
        }
    }
}

impl From<ConfigError> for BudgetError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => BudgetError::StorageError(io.to_string()),
            ConfigError::Serde(message) => BudgetError::ConfigError(message),
            invalid @ ConfigError::Invalid { .. } => BudgetError::ConfigError(invalid.to_string()),
        }
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Input error: {0}")]
    Input(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Core(BudgetError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Core(BudgetError::from(err))
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}
