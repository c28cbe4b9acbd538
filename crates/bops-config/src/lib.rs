//! Configuration fragments, merging and caching for bops.
//!
//! A [`Factory`] reads an ordered list of named fragments through a
//! [`Loader`], merges them into one [`Config`] and snapshots the result to a
//! cache artifact. The `config` fragment merges at the top level; every other
//! fragment is mounted under its own name.

mod artifact;
mod config;
mod error;
mod factory;
mod loader;
mod merge;
mod redact;

pub use artifact::{CacheArtifact, SkippedFragment, NOTICE, SCHEMA_ID, SCHEMA_VERSION};
pub use config::Config;
pub use error::{ConfigError, ConfigResult};
pub use factory::{CachePolicy, Factory, CACHE_PREFIX, CACHE_SUFFIX, DEVELOPMENT};
pub use loader::{
    toml_to_json, validate_name, Fragment, FragmentSource, Loader, LocalDirectory, MemoryLoader,
    FRAGMENT_EXTENSIONS,
};
pub use merge::{deep_merge, mount_fragment, ROOT_FRAGMENT};
pub use redact::{redact_secrets, REDACTED};
