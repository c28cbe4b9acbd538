//! Framework errors

use bops_config::ConfigError;
use thiserror::Error;

/// Boxed error returned by application handlers and connection factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for framework operations
pub type BopsResult<T> = Result<T, BopsError>;

/// Framework errors
#[derive(Debug, Error)]
pub enum BopsError {
    /// No usable `application` service was registered
    #[error("{0}")]
    UnknownApplication(String),

    #[error("service provider has an empty name")]
    EmptyServiceName,

    #[error("no connection settings for database '{0}'")]
    UnknownConnection(String),

    #[error("failed to open database connection '{name}': {source}")]
    Connection {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("unknown log stream '{0}' (expected stdout, stderr or file:<path>)")]
    UnknownStream(String),

    #[error("logging already initialized: {0}")]
    Logging(String),

    #[error("application failed: {0}")]
    Application(#[source] BoxError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
