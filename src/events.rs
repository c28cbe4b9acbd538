//! Synchronous events manager
//!
//! Event types are named `component:action`. A listener attached to
//! `component` receives every action of that component; a listener attached
//! to `component:action` receives only that action.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// A fired event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Full type, e.g. `bootstrap:afterServices`
    pub event_type: String,
    /// Name of the component that fired the event
    pub source: String,
    pub data: Value,
}

impl Event {
    pub fn component(&self) -> &str {
        self.event_type
            .split_once(':')
            .map(|(c, _)| c)
            .unwrap_or(&self.event_type)
    }
}

/// Receives fired events.
pub trait Listener: Send + Sync {
    fn handle(&self, event: &Event);
}

impl<F> Listener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn handle(&self, event: &Event) {
        self(event)
    }
}

#[derive(Default)]
pub struct EventsManager {
    listeners: RwLock<BTreeMap<String, Vec<Arc<dyn Listener>>>>,
}

impl EventsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, event_type: &str, listener: Arc<dyn Listener>) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }

    pub fn detach_all(&self, event_type: &str) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.remove(event_type);
    }

    pub fn has_listeners(&self, event_type: &str) -> bool {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        listeners.get(event_type).is_some_and(|l| !l.is_empty())
    }

    /// Notify component-wide listeners, then exact-type listeners, in attach
    /// order. Returns the number of listeners notified.
    pub fn fire(&self, event_type: &str, source: &str, data: Value) -> usize {
        let event = Event {
            event_type: event_type.to_string(),
            source: source.to_string(),
            data,
        };

        // Snapshot so listeners may attach/detach while being notified.
        let targets: Vec<Arc<dyn Listener>> = {
            let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
            let component = event.component();
            let mut targets = Vec::new();
            if component != event_type {
                if let Some(l) = listeners.get(component) {
                    targets.extend(l.iter().cloned());
                }
            }
            if let Some(l) = listeners.get(event_type) {
                targets.extend(l.iter().cloned());
            }
            targets
        };

        tracing::trace!(event = event_type, listeners = targets.len(), "firing event");
        for listener in &targets {
            listener.handle(&event);
        }
        targets.len()
    }
}

impl std::fmt::Debug for EventsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        let counts: BTreeMap<&str, usize> =
            listeners.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("EventsManager").field("listeners", &counts).finish()
    }
}
