//! Registers the [`ErrorHandler`] service.

use super::{services, Context, ServiceProvider};
use crate::container::Container;
use crate::error::BopsResult;
use crate::error_handler::ErrorHandler;

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandlerProvider;

impl ServiceProvider for ErrorHandlerProvider {
    fn name(&self) -> &str {
        services::ERROR_HANDLER
    }

    fn register(&self, container: &mut Container, _ctx: &Context) -> BopsResult<()> {
        container.set_shared(self.name(), ErrorHandler::new());
        Ok(())
    }
}
