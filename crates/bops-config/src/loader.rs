//! Fragment loaders
//!
//! A loader maps a fragment name to its content. Absent and malformed
//! fragments are reported separately so callers can tell "nothing there"
//! from "something broken there".

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, ConfigResult};

/// File extensions tried by [`LocalDirectory`], in lookup order.
pub const FRAGMENT_EXTENSIONS: &[&str] = &["toml", "json"];

/// Where a loaded fragment came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSource {
    /// Fragment name
    pub name: String,

    /// File path (None for in-memory fragments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for in-memory fragments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Outcome of loading one fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// The fragment exists and its root is a mapping
    Loaded {
        map: Map<String, Value>,
        source: FragmentSource,
    },

    /// No source exists for this name
    Absent,

    /// A source exists but could not be read or is not a mapping
    Malformed {
        path: Option<PathBuf>,
        reason: String,
    },
}

impl Fragment {
    fn malformed(path: Option<&Path>, reason: impl Into<String>) -> Self {
        Fragment::Malformed {
            path: path.map(Path::to_path_buf),
            reason: reason.into(),
        }
    }
}

/// Resolves fragment names to fragment content.
pub trait Loader {
    fn load(&self, name: &str) -> Fragment;
}

impl<L: Loader + ?Sized> Loader for &L {
    fn load(&self, name: &str) -> Fragment {
        (**self).load(name)
    }
}

impl<L: Loader + ?Sized> Loader for Box<L> {
    fn load(&self, name: &str) -> Fragment {
        (**self).load(name)
    }
}

/// Check that a fragment or factory name is safe to use as a file stem.
pub fn validate_name(name: &str) -> ConfigResult<()> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9_.-]*$").expect("static pattern is valid")
    });
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

/// Loads fragments from `<dir>/<name>.toml`, falling back to `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    dir: PathBuf,
}

impl LocalDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the first existing source file for `name`, if any.
    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        FRAGMENT_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl Loader for LocalDirectory {
    fn load(&self, name: &str) -> Fragment {
        if let Err(e) = validate_name(name) {
            return Fragment::malformed(None, e.to_string());
        }

        let Some(path) = self.path_of(name) else {
            return Fragment::Absent;
        };

        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Fragment::Absent,
            Err(e) => return Fragment::malformed(Some(&path), e.to_string()),
        };

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = match String::from_utf8(bytes) {
            Ok(c) => c,
            Err(e) => return Fragment::malformed(Some(&path), format!("Invalid UTF-8: {e}")),
        };

        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        let parsed = if is_json {
            parse_json(&contents)
        } else {
            parse_toml(&contents)
        };

        match parsed {
            Ok(map) => Fragment::Loaded {
                map,
                source: FragmentSource {
                    name: name.to_string(),
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                },
            },
            Err(reason) => Fragment::malformed(Some(&path), reason),
        }
    }
}

/// In-memory loader, counting how many times fragments were requested.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    fragments: HashMap<String, Value>,
    reads: Cell<usize>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment. Non-object values are kept and reported as malformed.
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.fragments.insert(name.to_string(), value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fragments.remove(name)
    }

    /// Number of `load` calls served so far
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl Loader for MemoryLoader {
    fn load(&self, name: &str) -> Fragment {
        self.reads.set(self.reads.get() + 1);
        match self.fragments.get(name) {
            None => Fragment::Absent,
            Some(Value::Object(map)) => Fragment::Loaded {
                map: map.clone(),
                source: FragmentSource {
                    name: name.to_string(),
                    path: None,
                    digest: None,
                },
            },
            Some(other) => Fragment::malformed(None, format!("expected a mapping, got {}", kind_of(other))),
        }
    }
}

fn parse_toml(contents: &str) -> Result<Map<String, Value>, String> {
    let table: toml::Table =
        toml::from_str(contents).map_err(|e| format!("TOML parse error: {e}"))?;
    Ok(table
        .into_iter()
        .map(|(k, v)| (k, toml_to_json(v)))
        .collect())
}

fn parse_json(contents: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a mapping, got {}", kind_of(&other))),
        Err(e) => Err(format!("JSON parse error: {e}")),
    }
}

/// Convert TOML Value to JSON Value
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
