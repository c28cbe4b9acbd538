//! Filesystem accessor rooted at one directory
//!
//! All paths are relative to the root; absolute paths and `..` components are
//! rejected.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `relative` under the root.
    pub fn path_of(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let relative = relative.as_ref();
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe || relative.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes filesystem root: {}", relative.display()),
            ));
        }
        Ok(self.root.join(relative))
    }

    pub fn has(&self, relative: impl AsRef<Path>) -> bool {
        self.path_of(relative).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> io::Result<String> {
        fs::read_to_string(self.path_of(relative)?)
    }

    /// Write atomically (write-then-rename), creating parent directories.
    pub fn put(&self, relative: impl AsRef<Path>, contents: &str) -> io::Result<()> {
        let path = self.path_of(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut temp = path.clone().into_os_string();
        temp.push(".tmp");
        let temp_path = PathBuf::from(temp);
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &path)
    }

    /// Remove a file. Returns whether it existed.
    pub fn delete(&self, relative: impl AsRef<Path>) -> io::Result<bool> {
        match fs::remove_file(self.path_of(relative)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Files directly under the root, relative and sorted. A missing root
    /// lists as empty.
    pub fn list_files(&self) -> Vec<PathBuf> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.path().strip_prefix(&self.root).ok().map(Path::to_path_buf))
            .collect();
        files.sort();
        files
    }
}
