//! Access to Go source files.
//!
//! The loader reads through [`SourceTree`] so tests can run against an
//! in-memory tree instead of the file system.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub trait SourceTree {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Files (not directories) directly inside `dir`, sorted by path.
    fn files_in(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;
}

/// The real file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsTree;

impl SourceTree for FsTree {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn files_in(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// An in-memory tree of files keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`MemoryTree::insert`].
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceTree for MemoryTree {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file", path.display()),
            )
        })
    }

    fn files_in(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such directory", dir.display()),
            ));
        }
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tree_listing() {
        let tree = MemoryTree::new()
            .with("/m/go.mod", "module m")
            .with("/m/a.go", "package m")
            .with("/m/sub/b.go", "package sub");
        let files = tree.files_in(Path::new("/m")).unwrap_or_default();
        assert_eq!(
            files,
            vec![PathBuf::from("/m/a.go"), PathBuf::from("/m/go.mod")]
        );
        assert!(tree.is_dir(Path::new("/m/sub")));
        assert!(!tree.is_dir(Path::new("/m/a.go")));
        assert!(tree.is_file(Path::new("/m/sub/b.go")));
        assert!(tree.files_in(Path::new("/other")).is_err());
    }
}
