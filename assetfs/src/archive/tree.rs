//! Directory tree for archives that store a flat entry table.

use std::collections::{HashMap, HashSet};

use super::{ArchiveEntry, EntryKind};
use crate::path::{join, split_dir_base};

/// Hierarchical view over a flat list of file paths.
///
/// Directories are implied by the files beneath them. Children keep the
/// order in which they were first inserted, which is the container's own
/// table order.
#[derive(Debug, Default, Clone)]
pub struct EntryTree<T> {
    /// Directory path -> children in insertion order.
    children: HashMap<String, Vec<ArchiveEntry>>,

    /// File path -> payload.
    files: HashMap<String, T>,

    /// All known directory paths, including the root `""`.
    directories: HashSet<String>,
}

impl<T> EntryTree<T> {
    /// Create a tree containing only the root directory.
    pub fn new() -> Self {
        let mut directories = HashSet::new();
        directories.insert(String::new());
        Self {
            children: HashMap::new(),
            files: HashMap::new(),
            directories,
        }
    }

    /// Insert a file at a sanitized path.
    ///
    /// Returns `false` (and keeps the existing payload) if the path is
    /// already present as a file or directory.
    pub fn insert_file(&mut self, path: &str, payload: T) -> bool {
        if path.is_empty() || self.files.contains_key(path) || self.directories.contains(path) {
            return false;
        }

        let (dir, name) = split_dir_base(path);
        if self.files.contains_key(dir) {
            // A file already occupies the parent's path
            return false;
        }
        self.ensure_dir(dir);
        self.children
            .entry(dir.to_string())
            .or_default()
            .push(ArchiveEntry::file(name));
        self.files.insert(path.to_string(), payload);
        true
    }

    fn ensure_dir(&mut self, dir: &str) {
        if self.directories.contains(dir) {
            return;
        }

        let (parent, name) = split_dir_base(dir);
        self.ensure_dir(parent);
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(ArchiveEntry::dir(name));
        self.directories.insert(dir.to_string());
    }

    /// Children of `dir`, empty if it does not exist.
    pub fn children(&self, dir: &str) -> Vec<ArchiveEntry> {
        self.children.get(dir).cloned().unwrap_or_default()
    }

    /// Probe a path.
    pub fn stat(&self, path: &str) -> Option<EntryKind> {
        if self.files.contains_key(path) {
            Some(EntryKind::File)
        } else if self.directories.contains(path) {
            Some(EntryKind::Directory)
        } else {
            None
        }
    }

    /// Payload stored for a file.
    pub fn get(&self, path: &str) -> Option<&T> {
        self.files.get(path)
    }

    /// Number of files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Full paths of every file, in no particular order.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Full path of a child of `dir`.
    pub fn child_path(dir: &str, name: &str) -> String {
        join(dir, name)
    }
}
