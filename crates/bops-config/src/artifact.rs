//! Cache artifact: a generated snapshot of the merged configuration
//!
//! The artifact records where each fragment came from so a stale cache can be
//! traced back to its inputs.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::loader::FragmentSource;

/// Schema version for cache artifacts
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "bops/config_cache@1";

/// Header written into every artifact
pub const NOTICE: &str = "!! PLEASE DO NOT EDIT THIS FILE DIRECTLY !!";

/// A fragment that contributed nothing to the merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFragment {
    pub name: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Serialized snapshot of a merged configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheArtifact {
    pub schema_version: u32,
    pub schema_id: String,
    pub notice: String,

    /// Decorated factory name
    pub factory: String,

    pub created_at: DateTime<Utc>,

    /// Contributing fragments in merge order
    pub sources: Vec<FragmentSource>,

    #[serde(default)]
    pub skipped: Vec<SkippedFragment>,

    /// The merged configuration
    pub config: Config,
}

impl CacheArtifact {
    pub fn new(
        factory: &str,
        config: Config,
        sources: Vec<FragmentSource>,
        skipped: Vec<SkippedFragment>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            notice: NOTICE.to_string(),
            factory: factory.to_string(),
            created_at: Utc::now(),
            sources,
            skipped,
            config,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write atomically to file (write-then-rename)
    pub fn write_to_file(&self, path: &Path) -> ConfigResult<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|e| ConfigError::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| ConfigError::io(path, e))?;

        Ok(())
    }

    /// Load from file, rejecting artifacts written under another schema.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let artifact: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if artifact.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported schema_version {} (expected {})",
                    artifact.schema_version, SCHEMA_VERSION
                ),
            });
        }

        Ok(artifact)
    }
}
