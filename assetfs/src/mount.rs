//! Ordered mount table.
//!
//! Mounts are searched in the order they were added and the earliest mount
//! that contains a path wins. There is no unmount; the table is torn down as
//! a whole when its owner is dropped.
//!
//! ```text
//! add_path("Patch")      ──► [0] Patch/        (loose)
//! add_path("Game.rgss3a")──► [1] Game.rgss3a   (archive:rgss3a)
//!
//! stat("Data/Map001.rvdata2")
//!   [0] Patch/ ── miss
//!   [1] Game.rgss3a ── hit ──► File
//! ```
//!
//! Each path gets two chances to mount. The native primitive takes a UTF-8
//! path and opens either a directory or an archive file. If that fails, the
//! path is opened as a plain OS file and mounted through the stream
//! primitive, which covers archive files the native primitive cannot name.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::archive::{Archive, ArchiveEntry, ArchiverRegistry, DirArchive, EntryKind};
use crate::error::{VfsError, VfsResult};
use crate::io::{ArchiveIo, FileIo};
use crate::stream::{BackendTag, Stream};
use crate::walk::Walk;

/// Public description of one mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// Path or name the mount was created from.
    pub name: String,

    /// Backend serving the mount.
    pub backend: BackendTag,
}

struct Mount {
    name: String,
    archive: Box<dyn Archive>,
}

/// Ordered list of mounted roots.
pub struct MountTable {
    registry: ArchiverRegistry,
    allow_symlinks: bool,
    mounts: Vec<Mount>,
}

impl MountTable {
    /// Create an empty table that opens containers with `registry`.
    pub fn new(registry: ArchiverRegistry, allow_symlinks: bool) -> Self {
        Self {
            registry,
            allow_symlinks,
            mounts: Vec::new(),
        }
    }

    /// Archivers available to this table.
    pub fn registry(&self) -> &ArchiverRegistry {
        &self.registry
    }

    fn push(&mut self, name: String, archive: Box<dyn Archive>) {
        info!(mount = %name, backend = %archive.tag(), position = self.mounts.len(), "Mounted");
        self.mounts.push(Mount { name, archive });
    }

    /// Mount a directory or archive file through the native path primitive.
    pub fn mount_native(&mut self, path: &Path) -> VfsResult<()> {
        let name = path.to_str().ok_or_else(|| VfsError::Mount {
            path: path.display().to_string(),
            reason: "path is not valid UTF-8".to_string(),
        })?;

        if path.is_dir() {
            let archive = DirArchive::open(path, self.allow_symlinks)?;
            self.push(name.to_string(), Box::new(archive));
            return Ok(());
        }

        let io = FileIo::open(path).map_err(|e| VfsError::Mount {
            path: name.to_string(),
            reason: e.to_string(),
        })?;
        let archive = self.registry.open(Box::new(io), name)?;
        self.push(name.to_string(), archive);
        Ok(())
    }

    /// Mount a container delivered as a raw stream.
    pub fn mount_io(&mut self, io: Box<dyn ArchiveIo>, name: &str) -> VfsResult<()> {
        let archive = self.registry.open(io, name)?;
        self.push(name.to_string(), archive);
        Ok(())
    }

    /// Mount `path`, falling back to the stream primitive.
    ///
    /// Returns the error of the last attempt when both fail.
    pub fn add_path(&mut self, path: &Path) -> VfsResult<()> {
        let native_err = match self.mount_native(path) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        debug!(path = %path.display(), error = %native_err, "Native mount failed, trying stream mount");

        let io = FileIo::open(path).map_err(|e| VfsError::Mount {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.mount_io(Box::new(io), &path.to_string_lossy())
    }

    /// Number of mounts.
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Check if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Mounts in search order.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .iter()
            .map(|m| MountInfo {
                name: m.name.clone(),
                backend: m.archive.tag(),
            })
            .collect()
    }

    /// Probe a canonical path. The first mount that has it decides its kind.
    pub fn stat(&self, path: &str) -> Option<EntryKind> {
        self.mounts.iter().find_map(|m| m.archive.stat(path))
    }

    /// Check if any mount has an entry at exactly `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.stat(path).is_some()
    }

    /// Merged listing of `dir` across mounts.
    ///
    /// Mounts contribute in order; a name already listed by an earlier mount
    /// is not repeated.
    pub fn read_dir(&self, dir: &str) -> Vec<ArchiveEntry> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for mount in &self.mounts {
            for entry in mount.archive.enumerate(dir) {
                if seen.insert(entry.name.clone()) {
                    out.push(entry);
                }
            }
        }
        out
    }

    /// Lazy recursive traversal starting at `root`.
    pub fn walk(&self, root: &str) -> Walk<'_> {
        Walk::new(self, root)
    }

    /// Open the file at `path` from the first mount that has it as a file.
    ///
    /// Fails with [`VfsError::NotFound`] if no mount has it, or with
    /// [`VfsError::Backend`] if the owning mount cannot open it.
    pub fn open(&mut self, path: &str) -> VfsResult<Stream> {
        let mount = self
            .mounts
            .iter_mut()
            .find(|m| m.archive.stat(path) == Some(EntryKind::File))
            .ok_or_else(|| VfsError::NotFound {
                path: path.to_string(),
            })?;

        let handle = mount
            .archive
            .open_entry(path)
            .map_err(|e| VfsError::backend(path, &e))?;
        Ok(Stream::new(handle, mount.archive.tag(), path))
    }
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountTable")
            .field("registry", &self.registry)
            .field("allow_symlinks", &self.allow_symlinks)
            .field("mounts", &self.mounts())
            .finish()
    }
}
