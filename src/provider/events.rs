//! Registers the shared [`EventsManager`].

use super::{services, Context, ServiceProvider};
use crate::container::Container;
use crate::error::BopsResult;
use crate::events::EventsManager;

#[derive(Debug, Clone, Copy, Default)]
pub struct EventsProvider;

impl ServiceProvider for EventsProvider {
    fn name(&self) -> &str {
        services::EVENTS
    }

    fn register(&self, container: &mut Container, _ctx: &Context) -> BopsResult<()> {
        container.set_shared(self.name(), EventsManager::new());
        Ok(())
    }
}
