//! Registers a database [`Pool`] over a connection factory.

use std::sync::Arc;

use super::{services, Context, ServiceProvider};
use crate::container::Container;
use crate::database::{ConnectionFactory, Pool};
use crate::error::BopsResult;

#[derive(Debug, Clone)]
pub struct DatabaseProvider<F> {
    factory: F,
}

impl<F> DatabaseProvider<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F> ServiceProvider for DatabaseProvider<F>
where
    F: ConnectionFactory + Clone + 'static,
{
    fn name(&self) -> &str {
        services::DB_POOL
    }

    fn register(&self, container: &mut Container, ctx: &Context) -> BopsResult<()> {
        let pool = Pool::new(self.factory.clone(), Arc::clone(&ctx.environment));
        container.set_shared(self.name(), pool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SettingsOnly;
    use crate::environment::Environment;
    use crate::navigator::DirectoryNavigator;
    use crate::provider::install;
    use tempfile::TempDir;

    #[test]
    fn test_pool_reads_context_environment() {
        let dir = TempDir::new().unwrap();
        let ctx = Context {
            navigator: Arc::new(DirectoryNavigator::new(dir.path())),
            environment: Arc::new(Environment::from_vars(
                "production",
                [("SERVICE_DATABASE_MAIN_HOST", "db.prod")],
            )),
        };
        let mut container = Container::new();
        install(&DatabaseProvider::new(SettingsOnly), &mut container, &ctx).unwrap();

        let pool = container.get::<Pool<SettingsOnly>>(services::DB_POOL).unwrap();
        let conn = pool.connection("main").unwrap();
        assert_eq!(conn.get("host"), Some("db.prod"));
    }
}
