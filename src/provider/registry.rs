//! Static registry of named provider factories

use std::collections::BTreeMap;
use std::fmt;

use super::{
    ConfigProvider, DatabaseProvider, ErrorHandlerProvider, EventsProvider, FilesystemProvider,
    ServiceProvider,
};
use crate::database::SettingsOnly;

/// Builds a fresh provider instance
pub type ProviderFactory = Box<dyn Fn() -> Box<dyn ServiceProvider> + Send + Sync>;

#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in providers:
    /// `error_handler`, `events`, `filesystem`, `config`, `database`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("error_handler", || Box::new(ErrorHandlerProvider));
        registry.register("events", || Box::new(EventsProvider));
        registry.register("filesystem", || Box::new(FilesystemProvider));
        registry.register("config", || Box::new(ConfigProvider));
        registry.register("database", || Box::new(DatabaseProvider::new(SettingsOnly)));
        registry
    }

    /// Add or replace the factory for `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn ServiceProvider> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn ServiceProvider>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::error::BopsResult;
    use crate::provider::Context;

    struct Custom;

    impl ServiceProvider for Custom {
        fn name(&self) -> &str {
            "custom"
        }

        fn register(&self, container: &mut Container, _ctx: &Context) -> BopsResult<()> {
            container.set_shared("custom", 1u32);
            Ok(())
        }
    }

    #[test]
    fn test_builtins() {
        let registry = ProviderRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["config", "database", "error_handler", "events", "filesystem"]
        );
        assert_eq!(registry.create("events").unwrap().name(), "events");
        assert!(registry.create("App\\Provider\\Missing").is_none());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = ProviderRegistry::new();
        registry.register("custom", || Box::new(Custom));

        assert!(registry.contains("custom"));
        assert_eq!(registry.create("custom").unwrap().name(), "custom");
    }
}
