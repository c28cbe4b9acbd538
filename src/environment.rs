//! Layered environment files
//!
//! `.env` is read first, then `.env.<name>` for the resolved environment name.
//! Later files override earlier ones; missing files are ignored. Variables are
//! kept in the [`Environment`] value and the process environment is never
//! modified.
//!
//! `${VAR}` references resolve against the process environment and earlier
//! lines of the same file only. A reference in `.env.<name>` to a variable
//! defined in `.env` expands to an empty string.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use bops_config::{validate_name, DEVELOPMENT};

/// Variable selecting the environment name
pub const ENVIRONMENT_KEY: &str = "BOPS_ENVIRONMENT";

/// Base environment file name
pub const ENV_FILE: &str = ".env";

/// Resolved environment: a name plus the variables read from env files.
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    vars: BTreeMap<String, String>,
    files: Vec<PathBuf>,
    inherit: bool,
}

impl Environment {
    /// Load `.env` and `.env.<name>` from `root`, falling back to the process
    /// environment for lookups.
    pub fn load(root: &Path) -> Self {
        Self::load_with(root, None)
    }

    /// Like [`Environment::load`], with `name` taking precedence over
    /// `BOPS_ENVIRONMENT`.
    pub fn load_with(root: &Path, name: Option<&str>) -> Self {
        let mut env = Self {
            name: String::new(),
            vars: BTreeMap::new(),
            files: Vec::new(),
            inherit: true,
        };

        env.read_file(&root.join(ENV_FILE));

        env.name = name
            .map(str::to_string)
            .or_else(|| env.get(ENVIRONMENT_KEY))
            .filter(|n| !n.trim().is_empty())
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| DEVELOPMENT.to_string());

        match validate_name(&env.name) {
            Ok(()) => {
                let layered = root.join(format!("{ENV_FILE}.{}", env.name));
                env.read_file(&layered);
            }
            Err(e) => warn!(environment = %env.name, error = %e, "not loading environment-specific file"),
        }

        debug!(environment = %env.name, files = env.files.len(), "environment loaded");
        env
    }

    /// Environment with explicit variables and no process fallback.
    pub fn from_vars<I, K, V>(name: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.to_string(),
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            files: Vec::new(),
            inherit: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the environment name is `mode` (case-insensitive)
    pub fn contains(&self, mode: &str) -> bool {
        self.name.eq_ignore_ascii_case(mode)
    }

    pub fn is_development(&self) -> bool {
        self.contains(DEVELOPMENT)
    }

    /// Env files that were read, in load order
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Look up a variable; env files win over the process environment.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(v) = self.vars.get(key) {
            return Some(v.clone());
        }
        if self.inherit {
            return std::env::var(key).ok();
        }
        None
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// All variables starting with `prefix`, keyed by the lower-cased remainder.
    pub fn with_prefix(&self, prefix: &str) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();

        let strip = |key: &str| -> Option<String> {
            key.strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .map(str::to_lowercase)
        };

        if self.inherit {
            for (key, value) in std::env::vars() {
                if let Some(k) = strip(&key) {
                    out.insert(k, value);
                }
            }
        }
        for (key, value) in &self.vars {
            if let Some(k) = strip(key) {
                out.insert(k, value.clone());
            }
        }
        out
    }

    fn read_file(&mut self, path: &Path) {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!(path = %path.display(), "env file not present");
                return;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable env file");
                return;
            }
        };

        for item in iter {
            match item {
                Ok((key, value)) => {
                    self.vars.insert(key, value);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "stopping at malformed env line");
                    break;
                }
            }
        }
        self.files.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_default_to_development() {
        let dir = TempDir::new().unwrap();
        let env = Environment::load_with(dir.path(), None);
        // BOPS_ENVIRONMENT may leak in from the process; only check the file side.
        if std::env::var(ENVIRONMENT_KEY).is_err() {
            assert_eq!(env.name(), "development");
            assert!(env.is_development());
        }
        assert!(env.loaded_files().is_empty());
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "BOPS_ENVIRONMENT=production\nAPP_NAME=base\nAPP_DEBUG=true\n",
        )
        .unwrap();
        fs::write(dir.path().join(".env.production"), "APP_DEBUG=false\n").unwrap();

        let env = Environment::load(dir.path());
        assert_eq!(env.name(), "production");
        assert!(!env.is_development());
        assert_eq!(env.get("APP_NAME").as_deref(), Some("base"));
        assert_eq!(env.get("APP_DEBUG").as_deref(), Some("false"));
        assert_eq!(env.loaded_files().len(), 2);
    }

    #[test]
    fn test_explicit_name_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "BOPS_ENVIRONMENT=production\n").unwrap();
        fs::write(dir.path().join(".env.staging"), "ONLY_STAGING=1\n").unwrap();

        let env = Environment::load_with(dir.path(), Some("staging"));
        assert_eq!(env.name(), "staging");
        assert_eq!(env.get("ONLY_STAGING").as_deref(), Some("1"));
    }

    #[test]
    fn test_invalid_name_skips_layered_file() {
        let dir = TempDir::new().unwrap();
        let env = Environment::load_with(dir.path(), Some("../outside"));
        assert_eq!(env.name(), "../outside");
        assert!(env.loaded_files().is_empty());
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let env = Environment::from_vars("Production", Vec::<(String, String)>::new());
        assert!(env.contains("production"));
        assert!(!env.contains("development"));
    }

    #[test]
    fn test_with_prefix_strips_and_lowercases() {
        let mut env = Environment::from_vars(
            "production",
            [
                ("SERVICE_DATABASE_MAIN_HOST", "db"),
                ("SERVICE_DATABASE_MAIN_PORT", "3306"),
                ("SERVICE_DATABASE_MAIN_", "ignored"),
                ("SERVICE_DATABASE_OTHER_HOST", "other"),
            ],
        );
        env.set("SERVICE_DATABASE_MAIN_DBNAME", "app");

        let vars = env.with_prefix("SERVICE_DATABASE_MAIN_");
        assert_eq!(vars.len(), 3);
        assert_eq!(vars["host"], "db");
        assert_eq!(vars["port"], "3306");
        assert_eq!(vars["dbname"], "app");
    }

    #[test]
    fn test_references_do_not_cross_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "BOPS_ENV_TEST_BASE=/srv\nBOPS_ENV_TEST_LOGS=${BOPS_ENV_TEST_BASE}/logs\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".env.staging"),
            "BOPS_ENV_TEST_CACHE=${BOPS_ENV_TEST_BASE}/cache\n",
        )
        .unwrap();

        let env = Environment::load_with(dir.path(), Some("staging"));
        assert_eq!(env.get("BOPS_ENV_TEST_LOGS").as_deref(), Some("/srv/logs"));
        assert_eq!(env.get("BOPS_ENV_TEST_CACHE").as_deref(), Some("/cache"));
    }

    #[test]
    fn test_get_or_default() {
        let env = Environment::from_vars("testing", [("A", "1")]);
        assert_eq!(env.get_or("A", "x"), "1");
        assert_eq!(env.get_or("B", "x"), "x");
    }
}
