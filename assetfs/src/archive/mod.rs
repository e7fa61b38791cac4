//! Archive format plugins.
//!
//! An [`Archiver`] recognizes one container format and opens it as an
//! [`Archive`]: a read-only tree of entries that can be enumerated, probed
//! and opened. The set of archivers is fixed when the filesystem is created
//! ([`ArchiverRegistry`]); mounting tries them in priority order and the
//! first one that recognizes the container wins.
//!
//! # Built-in formats
//!
//! | Archiver          | Extension | Header version |
//! |-------------------|-----------|----------------|
//! | [`DirArchive`]    | (dir)     | n/a            |
//! | [`Rgss1Archiver`] | `rgssad`  | 1              |
//! | [`Rgss2Archiver`] | `rgss2a`  | 1              |
//! | [`Rgss3Archiver`] | `rgss3a`  | 3              |
//!
//! Loose directories are not registered archivers; the mount table opens
//! them directly through the native path primitive.

mod dir;
pub mod rgss;
mod tree;

use std::fmt;
use std::io;

use tracing::trace;

use crate::error::{VfsError, VfsResult};
use crate::io::ArchiveIo;
use crate::path::find_ext;
use crate::stream::{BackendTag, NativeFile};

pub use dir::{DirArchive, LooseFile};
pub use rgss::{Rgss1Archiver, Rgss2Archiver, Rgss3Archiver};
pub use tree::EntryTree;

/// Kind of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory (explicit or implied by nested entries).
    Directory,
}

impl EntryKind {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// A single child of a directory, as enumerated by an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name (no directory component).
    pub name: String,

    /// File or directory.
    pub kind: EntryKind,
}

impl ArchiveEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Static description of an archiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiverInfo {
    /// File extension this format conventionally uses (without the dot).
    pub extension: &'static str,

    /// Human-readable description.
    pub description: &'static str,
}

/// A mounted, read-only container.
pub trait Archive: Send {
    /// List the direct children of `dir` in enumeration order.
    ///
    /// Returns an empty list if `dir` does not exist.
    fn enumerate(&self, dir: &str) -> Vec<ArchiveEntry>;

    /// Probe a path. `""` is the root directory.
    fn stat(&self, path: &str) -> Option<EntryKind>;

    /// Open a file entry for random-access reads.
    fn open_entry(&mut self, path: &str) -> io::Result<Box<dyn NativeFile>>;

    /// Tag stamped on streams opened from this archive.
    fn tag(&self) -> BackendTag;
}

/// A container format plugin.
pub trait Archiver: Send + Sync {
    /// Static description.
    fn info(&self) -> ArchiverInfo;

    /// Check whether the container at the current source is in this format.
    ///
    /// Implementations may move the cursor; callers rewind before `open`.
    fn recognize(&self, io: &mut dyn ArchiveIo) -> io::Result<bool>;

    /// Parse the container and expose its entries.
    fn open(&self, io: Box<dyn ArchiveIo>) -> VfsResult<Box<dyn Archive>>;
}

/// Fixed, ordered set of archivers.
///
/// Built once at startup and owned by the mount table; there is no way to
/// register or remove archivers afterwards.
pub struct ArchiverRegistry {
    archivers: Vec<Box<dyn Archiver>>,
}

impl ArchiverRegistry {
    /// A registry with no archivers (loose directories only).
    pub fn empty() -> Self {
        Self {
            archivers: Vec::new(),
        }
    }

    /// The three built-in RGSS generations, in priority order.
    pub fn standard() -> Self {
        Self::empty()
            .with(Rgss1Archiver)
            .with(Rgss2Archiver)
            .with(Rgss3Archiver)
    }

    /// Append an archiver at the lowest priority.
    pub fn with(mut self, archiver: impl Archiver + 'static) -> Self {
        self.archivers.push(Box::new(archiver));
        self
    }

    /// Descriptions of all registered archivers, in priority order.
    pub fn infos(&self) -> Vec<ArchiverInfo> {
        self.archivers.iter().map(|a| a.info()).collect()
    }

    /// Number of registered archivers.
    pub fn len(&self) -> usize {
        self.archivers.len()
    }

    /// Check if no archivers are registered.
    pub fn is_empty(&self) -> bool {
        self.archivers.is_empty()
    }

    /// Archivers in the order they should be tried for `mount_name`.
    ///
    /// Archivers whose extension matches the mount name go first; the rest
    /// keep their registration order.
    fn try_order(&self, mount_name: &str) -> Vec<&dyn Archiver> {
        let ext = find_ext(mount_name).unwrap_or("");
        let (mut preferred, rest): (Vec<&dyn Archiver>, Vec<&dyn Archiver>) = self
            .archivers
            .iter()
            .map(|a| &**a)
            .partition(|a| a.info().extension.eq_ignore_ascii_case(ext));
        preferred.extend(rest);
        preferred
    }

    /// Open a container with the first archiver that recognizes it.
    pub fn open(&self, mut io: Box<dyn ArchiveIo>, mount_name: &str) -> VfsResult<Box<dyn Archive>> {
        for archiver in self.try_order(mount_name) {
            let info = archiver.info();
            io.seek(0)?;

            match archiver.recognize(&mut *io) {
                Ok(true) => {
                    trace!(mount = %mount_name, format = info.extension, "Archiver recognized container");
                    io.seek(0)?;
                    return archiver.open(io);
                }
                Ok(false) => {}
                Err(e) => {
                    trace!(mount = %mount_name, format = info.extension, error = %e, "Archiver probe failed");
                }
            }
        }

        Err(VfsError::UnrecognizedArchive {
            path: mount_name.to_string(),
        })
    }
}

impl Default for ArchiverRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ArchiverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.archivers.iter().map(|a| a.info().extension))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryIo;

    /// Archiver that recognizes a fixed magic prefix and records nothing.
    struct MagicArchiver {
        magic: &'static [u8],
        info: ArchiverInfo,
    }

    struct EmptyArchive(&'static str);

    impl Archive for EmptyArchive {
        fn enumerate(&self, _dir: &str) -> Vec<ArchiveEntry> {
            Vec::new()
        }

        fn stat(&self, path: &str) -> Option<EntryKind> {
            path.is_empty().then_some(EntryKind::Directory)
        }

        fn open_entry(&mut self, _path: &str) -> io::Result<Box<dyn NativeFile>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "empty"))
        }

        fn tag(&self) -> BackendTag {
            BackendTag::Archive(self.0)
        }
    }

    impl Archiver for MagicArchiver {
        fn info(&self) -> ArchiverInfo {
            self.info
        }

        fn recognize(&self, io: &mut dyn ArchiveIo) -> io::Result<bool> {
            let mut buf = vec![0u8; self.magic.len()];
            io.read_exact(&mut buf)?;
            Ok(buf == self.magic)
        }

        fn open(&self, _io: Box<dyn ArchiveIo>) -> VfsResult<Box<dyn Archive>> {
            Ok(Box::new(EmptyArchive(self.info.extension)))
        }
    }

    fn magic(ext: &'static str, magic: &'static [u8]) -> MagicArchiver {
        MagicArchiver {
            magic,
            info: ArchiverInfo {
                extension: ext,
                description: "test",
            },
        }
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = ArchiverRegistry::standard();
        let exts: Vec<_> = registry.infos().iter().map(|i| i.extension).collect();
        assert_eq!(exts, vec!["rgssad", "rgss2a", "rgss3a"]);
    }

    #[test]
    fn test_extension_match_is_tried_first() {
        let registry = ArchiverRegistry::empty()
            .with(magic("aaa", b"AB"))
            .with(magic("bbb", b"AB"));

        // Both recognize the data; extension decides which wins
        let archive = registry
            .open(Box::new(MemoryIo::new(b"ABCD".to_vec())), "pack.BBB")
            .unwrap();
        assert_eq!(archive.tag(), BackendTag::Archive("bbb"));

        let archive = registry
            .open(Box::new(MemoryIo::new(b"ABCD".to_vec())), "pack.zip")
            .unwrap();
        assert_eq!(archive.tag(), BackendTag::Archive("aaa"));
    }

    #[test]
    fn test_falls_through_to_recognizing_archiver() {
        let registry = ArchiverRegistry::empty()
            .with(magic("aaa", b"XX"))
            .with(magic("bbb", b"AB"));

        let archive = registry
            .open(Box::new(MemoryIo::new(b"ABCD".to_vec())), "pack.aaa")
            .unwrap();
        assert_eq!(archive.tag(), BackendTag::Archive("bbb"));
    }

    #[test]
    fn test_unrecognized_container() {
        let registry = ArchiverRegistry::standard();
        let result = registry.open(Box::new(MemoryIo::new(b"PK\x03\x04".to_vec())), "pack.zip");
        assert!(matches!(result, Err(VfsError::UnrecognizedArchive { .. })));
    }

    #[test]
    fn test_entry_kind_helpers() {
        assert!(EntryKind::File.is_file());
        assert!(EntryKind::Directory.is_dir());
        assert_eq!(ArchiveEntry::file("a").kind, EntryKind::File);
        assert_eq!(ArchiveEntry::dir("b").kind, EntryKind::Directory);
    }
}
