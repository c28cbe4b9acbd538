//! Project directory layout

use std::path::{Path, PathBuf};

/// Resolves the directories the bootstrap reads from and writes to.
pub trait Navigator: Send + Sync {
    /// Project root; `.env` files live here
    fn root_dir(&self) -> &Path;

    /// Directory holding configuration fragments
    fn config_dir(&self) -> &Path;

    /// Directory holding generated config cache artifacts
    fn config_cache_dir(&self) -> &Path;
}

/// Conventional layout under a single root directory:
///
/// ```text
/// <root>/.env
/// <root>/config/*.toml
/// <root>/var/cache/config/
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryNavigator {
    root: PathBuf,
    config: PathBuf,
    config_cache: PathBuf,
}

impl DirectoryNavigator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config: root.join("config"),
            config_cache: root.join("var").join("cache").join("config"),
            root,
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = dir.into();
        self
    }

    pub fn with_config_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_cache = dir.into();
        self
    }
}

impl Navigator for DirectoryNavigator {
    fn root_dir(&self) -> &Path {
        &self.root
    }

    fn config_dir(&self) -> &Path {
        &self.config
    }

    fn config_cache_dir(&self) -> &Path {
        &self.config_cache
    }
}
