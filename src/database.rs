//! Database connection pool
//!
//! Connection settings come from environment variables named
//! `SERVICE_DATABASE_<NAME>_<KEY>`. The driver itself is supplied through
//! [`ConnectionFactory`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::environment::Environment;
use crate::error::{BopsError, BopsResult, BoxError};

/// Settings for one named connection, keyed by lower-cased variable suffix
/// (`host`, `port`, `username`, `password`, `dbname`, `adapter`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub name: String,
    pub settings: BTreeMap<String, String>,
}

impl ConnectionConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn adapter(&self) -> Option<&str> {
        self.get("adapter")
    }

    pub fn port(&self) -> Option<u16> {
        self.get("port").and_then(|p| p.parse().ok())
    }
}

/// Opens driver connections.
pub trait ConnectionFactory: Send + Sync {
    type Connection: Send + Sync + 'static;

    fn connect(&self, config: &ConnectionConfig) -> Result<Self::Connection, BoxError>;
}

/// Environment variable prefix for connection `name`
pub fn prefix_for(name: &str) -> String {
    format!("SERVICE_DATABASE_{}_", name.to_uppercase())
}

/// Lazily opened connections, one per name.
pub struct Pool<F: ConnectionFactory> {
    factory: F,
    environment: Arc<Environment>,
    connections: Mutex<HashMap<String, Arc<F::Connection>>>,
}

impl<F: ConnectionFactory> Pool<F> {
    pub fn new(factory: F, environment: Arc<Environment>) -> Self {
        Self {
            factory,
            environment,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Settings for `name`, or `UnknownConnection` if none are defined.
    pub fn config_for(&self, name: &str) -> BopsResult<ConnectionConfig> {
        let settings = self.environment.with_prefix(&prefix_for(name));
        if settings.is_empty() {
            return Err(BopsError::UnknownConnection(name.to_string()));
        }
        Ok(ConnectionConfig {
            name: name.to_string(),
            settings,
        })
    }

    /// The connection for `name`, opened on first use.
    pub fn connection(&self, name: &str) -> BopsResult<Arc<F::Connection>> {
        let key = name.to_lowercase();
        let mut connections = self.connections.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(conn) = connections.get(&key) {
            return Ok(Arc::clone(conn));
        }

        let config = self.config_for(name)?;
        let conn = self
            .factory
            .connect(&config)
            .map_err(|source| BopsError::Connection {
                name: name.to_string(),
                source,
            })?;
        debug!(connection = name, adapter = ?config.adapter(), "database connection opened");

        let conn = Arc::new(conn);
        connections.insert(key, Arc::clone(&conn));
        Ok(conn)
    }

    /// Names of connections opened so far
    pub fn open_connections(&self) -> Vec<String> {
        let connections = self.connections.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = connections.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<F: ConnectionFactory> std::fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("open", &self.open_connections())
            .finish()
    }
}

/// Connection factory that hands back the resolved settings; useful when the
/// driver is wired up elsewhere and only the settings are needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsOnly;

impl ConnectionFactory for SettingsOnly {
    type Connection = ConnectionConfig;

    fn connect(&self, config: &ConnectionConfig) -> Result<ConnectionConfig, BoxError> {
        Ok(config.clone())
    }
}
