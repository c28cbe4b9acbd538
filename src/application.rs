//! Application handler contract

use std::sync::Arc;

use crate::container::Container;
use crate::error::BoxError;

/// The handler the bootstrap dispatches to once services are installed.
///
/// Register it as an `Arc<dyn Application>` under the `application` service.
pub trait Application: Send + Sync {
    /// Handle the current request and return the response body.
    fn handle(&self, container: &Container) -> Result<String, BoxError>;
}

impl<F> Application for F
where
    F: Fn(&Container) -> Result<String, BoxError> + Send + Sync,
{
    fn handle(&self, container: &Container) -> Result<String, BoxError> {
        self(container)
    }
}

/// Wrap a handler for registration in the container.
pub fn shared<A: Application + 'static>(app: A) -> Arc<dyn Application> {
    Arc::new(app)
}
