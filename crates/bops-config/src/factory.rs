//! Config factory: merge named fragments and cache the result
//!
//! Outside development the cached artifact is returned as-is and fragments are
//! not read at all. In development every load re-merges and rewrites the
//! artifact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Map;
use tracing::{debug, warn};

use crate::artifact::{CacheArtifact, SkippedFragment};
use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::loader::{validate_name, Fragment, Loader};
use crate::merge::mount_fragment;

/// Prefix of cache artifact file names
pub const CACHE_PREFIX: &str = "__";

/// Suffix of cache artifact file names (before the extension)
pub const CACHE_SUFFIX: &str = "__";

/// Environment name that disables artifact reuse
pub const DEVELOPMENT: &str = "development";

/// Whether an existing artifact may be served instead of merging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always merge and rewrite the artifact
    Rebuild,
    /// Serve the artifact when present
    ReuseExisting,
}

impl CachePolicy {
    /// `Rebuild` for `development` (any case), `ReuseExisting` otherwise.
    pub fn for_environment(environment: &str) -> Self {
        if environment.eq_ignore_ascii_case(DEVELOPMENT) {
            CachePolicy::Rebuild
        } else {
            CachePolicy::ReuseExisting
        }
    }
}

/// Merges fragments into a [`Config`] and maintains its cache artifact.
#[derive(Debug)]
pub struct Factory<L> {
    name: String,
    loader: L,
    cache_dir: PathBuf,
    policy: CachePolicy,
}

impl<L: Loader> Factory<L> {
    /// Create a factory. `name` becomes `__<name>__` in the artifact file name.
    pub fn new(
        name: &str,
        loader: L,
        cache_dir: impl Into<PathBuf>,
        policy: CachePolicy,
    ) -> ConfigResult<Self> {
        validate_name(name)?;
        Ok(Self {
            name: format!("{CACHE_PREFIX}{name}{CACHE_SUFFIX}"),
            loader,
            cache_dir: cache_dir.into(),
            policy,
        })
    }

    /// Decorated factory name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.json", self.name))
    }

    /// Load the merged configuration for `fragments`, in order.
    pub fn load<S: AsRef<str>>(&self, fragments: &[S]) -> ConfigResult<Config> {
        let path = self.artifact_path();

        if self.policy == CachePolicy::ReuseExisting && path.is_file() {
            match CacheArtifact::from_file(&path) {
                Ok(artifact) => {
                    debug!(factory = %self.name, path = %path.display(), "config cache hit");
                    return Ok(artifact.config);
                }
                Err(e) => {
                    warn!(factory = %self.name, error = %e, "unusable config cache, rebuilding");
                }
            }
        }

        let artifact = self.merge(fragments);
        artifact.write_to_file(&path)?;
        debug!(
            factory = %self.name,
            path = %path.display(),
            sources = artifact.sources.len(),
            skipped = artifact.skipped.len(),
            "config cache written"
        );

        Ok(artifact.config)
    }

    /// The artifact currently on disk, if any.
    pub fn cached(&self) -> ConfigResult<Option<CacheArtifact>> {
        let path = self.artifact_path();
        if !path.is_file() {
            return Ok(None);
        }
        CacheArtifact::from_file(&path).map(Some)
    }

    /// Remove the artifact. Returns whether one existed.
    pub fn clear_cache(&self) -> ConfigResult<bool> {
        let path = self.artifact_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ConfigError::io(path, e)),
        }
    }

    fn merge<S: AsRef<str>>(&self, fragments: &[S]) -> CacheArtifact {
        let mut acc = Map::new();
        let mut sources = Vec::new();
        let mut skipped = Vec::new();

        for name in fragments {
            let name = name.as_ref();
            match self.loader.load(name) {
                Fragment::Loaded { map, source } => {
                    mount_fragment(&mut acc, name, map);
                    sources.push(source);
                }
                Fragment::Absent => {
                    debug!(fragment = name, "config fragment absent");
                    skipped.push(SkippedFragment {
                        name: name.to_string(),
                        reason: "absent".to_string(),
                        path: None,
                    });
                }
                Fragment::Malformed { path, reason } => {
                    warn!(fragment = name, %reason, "skipping malformed config fragment");
                    skipped.push(SkippedFragment {
                        name: name.to_string(),
                        reason,
                        path: path.map(|p| p.to_string_lossy().to_string()),
                    });
                }
            }
        }

        CacheArtifact::new(&self.name, Config::from_map(acc), sources, skipped)
    }
}
