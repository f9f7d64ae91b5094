use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file exists but is not a readable config.
    #[error("{path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serde(String),
}
