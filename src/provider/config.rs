//! Registers the merged configuration.
//!
//! Every fragment file in the config directory takes part, in file name
//! order. The result is cached under the `global` factory name.

use std::path::Path;

use bops_config::{CachePolicy, Config, Factory, LocalDirectory, FRAGMENT_EXTENSIONS};

use super::{services, Context, ServiceProvider};
use crate::container::Container;
use crate::error::BopsResult;
use crate::filesystem::Filesystem;

/// Factory name of the application configuration
pub const GLOBAL_FACTORY: &str = "global";

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigProvider;

impl ConfigProvider {
    /// Fragment names (file stems) found in `dir`, sorted and deduplicated.
    pub fn fragment_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = Filesystem::rooted(dir)
            .list_files()
            .iter()
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| FRAGMENT_EXTENSIONS.contains(&e))
            })
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// The factory this provider loads through.
    pub fn factory(ctx: &Context) -> BopsResult<Factory<LocalDirectory>> {
        Ok(Factory::new(
            GLOBAL_FACTORY,
            LocalDirectory::new(ctx.navigator.config_dir()),
            ctx.navigator.config_cache_dir(),
            if ctx.environment.is_development() {
                CachePolicy::Rebuild
            } else {
                CachePolicy::ReuseExisting
            },
        )?)
    }

    pub fn load(ctx: &Context) -> BopsResult<Config> {
        let names = Self::fragment_names(ctx.navigator.config_dir());
        Ok(Self::factory(ctx)?.load(&names)?)
    }
}

impl ServiceProvider for ConfigProvider {
    fn name(&self) -> &str {
        services::CONFIG
    }

    fn register(&self, container: &mut Container, ctx: &Context) -> BopsResult<()> {
        let config = Self::load(ctx)?;
        tracing::info!(keys = config.len(), "configuration loaded");
        container.set_shared(self.name(), config);
        Ok(())
    }
}
