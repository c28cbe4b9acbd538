//! Service providers
//!
//! A provider binds one named capability into the [`Container`] during
//! startup. Providers named in configuration are looked up in a
//! [`ProviderRegistry`] of factory functions; nothing is constructed from
//! arbitrary type names.

mod config;
mod database;
mod error_handler;
mod events;
mod filesystem;
mod registry;

use std::sync::Arc;

use tracing::debug;

use crate::container::Container;
use crate::environment::Environment;
use crate::error::{BopsError, BopsResult};
use crate::navigator::Navigator;

pub use config::ConfigProvider;
pub use database::DatabaseProvider;
pub use error_handler::ErrorHandlerProvider;
pub use events::EventsProvider;
pub use filesystem::FilesystemProvider;
pub use registry::{ProviderFactory, ProviderRegistry};

/// Well-known service names
pub mod services {
    pub const NAVIGATOR: &str = "navigator";
    pub const ENVIRONMENT: &str = "environment";
    pub const ERROR_HANDLER: &str = "error_handler";
    pub const EVENTS: &str = "events";
    pub const FILESYSTEM: &str = "filesystem";
    pub const CONFIG: &str = "config";
    pub const DB_POOL: &str = "db_pool";
    pub const APPLICATION: &str = "application";
}

/// What providers may read while registering
#[derive(Clone)]
pub struct Context {
    pub navigator: Arc<dyn Navigator>,
    pub environment: Arc<Environment>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.navigator.root_dir())
            .field("environment", &self.environment.name())
            .finish()
    }
}

pub trait ServiceProvider: Send + Sync {
    /// Service name the provider registers under
    fn name(&self) -> &str;

    fn register(&self, container: &mut Container, ctx: &Context) -> BopsResult<()>;
}

/// Register `provider`, rejecting providers without a name.
pub fn install(
    provider: &dyn ServiceProvider,
    container: &mut Container,
    ctx: &Context,
) -> BopsResult<()> {
    let name = provider.name();
    if name.trim().is_empty() {
        return Err(BopsError::EmptyServiceName);
    }
    provider.register(container, ctx)?;
    debug!(provider = name, "service provider installed");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::navigator::DirectoryNavigator;
    use std::path::Path;

    pub fn context(root: &Path, environment: &str) -> Context {
        Context {
            navigator: Arc::new(DirectoryNavigator::new(root)),
            environment: Arc::new(Environment::from_vars(
                environment,
                Vec::<(String, String)>::new(),
            )),
        }
    }
}
