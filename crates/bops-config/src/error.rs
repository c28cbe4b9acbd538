//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid name '{0}': expected [A-Za-z0-9_.-] without a leading dot")]
    InvalidName(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
