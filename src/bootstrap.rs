//! Startup sequence
//!
//! 1. Share the navigator and load the layered environment
//! 2. Install the error handler and events manager
//! 3. Install the filesystem and configuration
//! 4. Install providers named in `providers.{toml,json}`
//! 5. Share raw values from `services.{toml,json}`
//!
//! [`Bootstrap::run`] then dispatches to the `application` service.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use bops_config::{Config, Fragment, Loader, LocalDirectory};

use crate::application::Application;
use crate::container::Container;
use crate::environment::Environment;
use crate::error::{BopsError, BopsResult};
use crate::error_handler::ErrorHandler;
use crate::events::{EventsManager, Listener};
use crate::navigator::Navigator;
use crate::provider::{
    install, services, ConfigProvider, Context, ErrorHandlerProvider, EventsProvider,
    FilesystemProvider, ProviderRegistry,
};

/// Fragment listing extra providers: `providers = ["name", ...]`
pub const PROVIDERS_FRAGMENT: &str = "providers";

/// Fragment whose top-level entries are shared as raw services
pub const SERVICES_FRAGMENT: &str = "services";

/// Message of the error raised when no application is registered
pub const UNKNOWN_APPLICATION: &str = "The application service is not defined";

pub struct BootstrapBuilder {
    navigator: Arc<dyn Navigator>,
    registry: ProviderRegistry,
    environment: Option<String>,
    listeners: Vec<(String, Arc<dyn Listener>)>,
}

impl BootstrapBuilder {
    /// Replace the provider registry (defaults to the built-ins).
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Force the environment name instead of reading `BOPS_ENVIRONMENT`.
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Attach a listener as soon as the events manager exists, so it also
    /// sees the `bootstrap:*` events fired during [`build`](Self::build).
    pub fn listen(mut self, event_type: &str, listener: Arc<dyn Listener>) -> Self {
        self.listeners.push((event_type.to_string(), listener));
        self
    }

    pub fn build(self) -> BopsResult<Bootstrap> {
        let mut container = Container::new();
        container.set_shared_arc(services::NAVIGATOR, Arc::new(Arc::clone(&self.navigator)));

        let environment = Arc::new(Environment::load_with(
            self.navigator.root_dir(),
            self.environment.as_deref(),
        ));
        container.set_shared_arc(services::ENVIRONMENT, Arc::clone(&environment));
        info!(environment = environment.name(), "bootstrapping");

        let ctx = Context {
            navigator: self.navigator,
            environment,
        };

        install(&ErrorHandlerProvider, &mut container, &ctx)?;
        install(&EventsProvider, &mut container, &ctx)?;
        if let Some(events) = container.get::<EventsManager>(services::EVENTS) {
            for (event_type, listener) in self.listeners {
                events.attach(&event_type, listener);
            }
        }

        let mut bootstrap = Bootstrap {
            container,
            ctx,
            registry: self.registry,
        };
        bootstrap.fire("bootstrap:beforeServices", Value::Null);
        bootstrap.setup_services()?;
        bootstrap.fire(
            "bootstrap:afterServices",
            json!({ "services": bootstrap.container.names() }),
        );

        Ok(bootstrap)
    }
}

/// A bootstrapped application: its container plus the context it was built in.
pub struct Bootstrap {
    container: Container,
    ctx: Context,
    registry: ProviderRegistry,
}

impl Bootstrap {
    pub fn builder(navigator: impl Navigator + 'static) -> BootstrapBuilder {
        BootstrapBuilder {
            navigator: Arc::new(navigator),
            registry: ProviderRegistry::with_builtins(),
            environment: None,
            listeners: Vec::new(),
        }
    }

    /// Bootstrap with the built-in provider registry.
    pub fn new(navigator: impl Navigator + 'static) -> BopsResult<Self> {
        Self::builder(navigator).build()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn environment(&self) -> &Environment {
        &self.ctx.environment
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.ctx.navigator.as_ref()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn config(&self) -> Option<Arc<Config>> {
        self.container.get::<Config>(services::CONFIG)
    }

    pub fn events(&self) -> Option<Arc<EventsManager>> {
        self.container.get::<EventsManager>(services::EVENTS)
    }

    /// Register the application handler.
    pub fn set_application(&mut self, app: Arc<dyn Application>) {
        self.container.set_shared(services::APPLICATION, app);
    }

    /// Dispatch to the `application` service and return its response body.
    pub fn run(&self) -> BopsResult<String> {
        let app = self
            .container
            .get::<Arc<dyn Application>>(services::APPLICATION)
            .ok_or_else(|| BopsError::UnknownApplication(UNKNOWN_APPLICATION.to_string()))?;

        self.fire("application:beforeHandle", Value::Null);
        match app.handle(&self.container) {
            Ok(content) => {
                self.fire("application:afterHandle", json!({ "bytes": content.len() }));
                Ok(content)
            }
            Err(e) => {
                if let Some(handler) = self.container.get::<ErrorHandler>(services::ERROR_HANDLER) {
                    handler.report(&*e);
                }
                Err(BopsError::Application(e))
            }
        }
    }

    fn fire(&self, event_type: &str, data: Value) {
        if let Some(events) = self.events() {
            events.fire(event_type, "bootstrap", data);
        }
    }

    fn setup_services(&mut self) -> BopsResult<()> {
        install(&FilesystemProvider, &mut self.container, &self.ctx)?;
        install(&ConfigProvider, &mut self.container, &self.ctx)?;

        let loader = LocalDirectory::new(self.ctx.navigator.config_dir());

        if let Some(map) = load_optional(&loader, PROVIDERS_FRAGMENT) {
            match map.get(PROVIDERS_FRAGMENT) {
                Some(Value::Array(names)) if !names.is_empty() => self.setup_providers(names)?,
                Some(Value::Array(_)) | None => {}
                Some(_) => warn!("ignoring providers list: expected an array of names"),
            }
        }

        if let Some(map) = load_optional(&loader, SERVICES_FRAGMENT) {
            for (name, value) in map {
                self.container.set_shared(&name, value);
            }
        }

        Ok(())
    }

    fn setup_providers(&mut self, names: &[Value]) -> BopsResult<()> {
        for entry in names {
            let Some(name) = entry.as_str() else {
                warn!(entry = %entry, "ignoring non-string provider entry");
                continue;
            };
            match self.registry.create(name) {
                Some(provider) => install(provider.as_ref(), &mut self.container, &self.ctx)?,
                None => warn!(provider = name, "ignoring unknown service provider"),
            }
        }
        Ok(())
    }
}

fn load_optional(loader: &LocalDirectory, name: &str) -> Option<serde_json::Map<String, Value>> {
    match loader.load(name) {
        Fragment::Loaded { map, .. } => Some(map),
        Fragment::Absent => None,
        Fragment::Malformed { reason, .. } => {
            warn!(fragment = name, %reason, "ignoring malformed bootstrap file");
            None
        }
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("ctx", &self.ctx)
            .field("container", &self.container)
            .finish()
    }
}
