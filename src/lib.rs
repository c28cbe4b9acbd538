//! bops - application bootstrap
//!
//! Builds an explicit service container, loads layered `.env` files,
//! installs service providers (error handler, events, filesystem, merged
//! configuration, database pool) and dispatches to an application handler.

pub mod application;
pub mod bootstrap;
pub mod container;
pub mod database;
pub mod environment;
pub mod error;
pub mod error_handler;
pub mod events;
pub mod filesystem;
pub mod logging;
pub mod navigator;
pub mod provider;

pub use application::Application;
pub use bootstrap::{Bootstrap, BootstrapBuilder};
pub use container::Container;
pub use environment::Environment;
pub use error::{BopsError, BopsResult, BoxError};
pub use navigator::{DirectoryNavigator, Navigator};
pub use provider::{ProviderRegistry, ServiceProvider};

pub use bops_config as config;
