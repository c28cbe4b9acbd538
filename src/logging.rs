//! tracing subscriber setup
//!
//! A non-empty RUST_LOG replaces the level passed to [`init`]; otherwise that
//! level applies to every target.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::BopsError;

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl FromStr for LogStream {
    type Err = BopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogStream::Stdout),
            "stderr" => Ok(LogStream::Stderr),
            other => match other.strip_prefix("file:") {
                Some(path) if !path.is_empty() => Ok(LogStream::File(PathBuf::from(path))),
                _ => Err(BopsError::UnknownStream(other.to_string())),
            },
        }
    }
}

/// Filter from a RUST_LOG value, falling back to `level` when it is unset,
/// empty or unparsable.
pub fn filter_for(rust_log: Option<&str>, level: Level) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}

/// Install the global subscriber.
pub fn init(stream: &LogStream, level: Level) -> Result<(), BopsError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(rust_log.as_deref(), level);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match stream {
        LogStream::Stdout => registry.with(fmt::layer().with_writer(std::io::stdout)).try_init(),
        LogStream::Stderr => registry.with(fmt::layer().with_writer(std::io::stderr)).try_init(),
        LogStream::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
    };

    result.map_err(|e| BopsError::Logging(e.to_string()))
}
