//! Shared-service container
//!
//! The container is an ordinary value owned by the bootstrap and handed to
//! providers by reference. There is no process-wide default instance.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type Service = Arc<dyn Any + Send + Sync>;

/// Named, shared services
#[derive(Default, Clone)]
pub struct Container {
    services: BTreeMap<String, Service>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `name`, replacing any previous service.
    pub fn set_shared<T: Any + Send + Sync>(&mut self, name: &str, value: T) {
        self.set_shared_arc(name, Arc::new(value));
    }

    pub fn set_shared_arc<T: Any + Send + Sync>(&mut self, name: &str, value: Arc<T>) {
        if self.services.insert(name.to_string(), value).is_some() {
            tracing::debug!(service = name, "replaced shared service");
        }
    }

    /// Fetch a service. Returns `None` if it is missing or of another type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services.get(name)?.clone().downcast::<T>().ok()
    }

    pub fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.services.remove(name).is_some()
    }

    /// Registered service names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.names())
            .finish()
    }
}
