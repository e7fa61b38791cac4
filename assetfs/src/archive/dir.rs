//! Loose directory backend.
//!
//! Mounting a native directory exposes its contents read-only. Symbolic
//! links are invisible unless the filesystem was created with
//! `allow_symlinks`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{Archive, ArchiveEntry, EntryKind};
use crate::error::{VfsError, VfsResult};
use crate::path::SEPARATOR;
use crate::stream::{read_only_error, BackendTag, NativeFile};

/// A mounted native directory.
#[derive(Debug)]
pub struct DirArchive {
    root: PathBuf,
    allow_symlinks: bool,
}

impl DirArchive {
    /// Mount `root`, which must be an existing directory.
    pub fn open(root: impl AsRef<Path>, allow_symlinks: bool) -> VfsResult<Self> {
        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|e| VfsError::Mount {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        if !metadata.is_dir() {
            return Err(VfsError::Mount {
                path: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            allow_symlinks,
        })
    }

    /// Native root of this mount.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path to a native one, refusing to traverse symlinks
    /// unless they are allowed.
    fn native_path(&self, path: &str) -> Option<PathBuf> {
        let mut native = self.root.clone();
        for component in path.split(SEPARATOR).filter(|c| !c.is_empty()) {
            native.push(component);
            if !self.allow_symlinks {
                let metadata = fs::symlink_metadata(&native).ok()?;
                if metadata.file_type().is_symlink() {
                    return None;
                }
            }
        }
        Some(native)
    }
}

impl Archive for DirArchive {
    fn enumerate(&self, dir: &str) -> Vec<ArchiveEntry> {
        let Some(native) = self.native_path(dir) else {
            return Vec::new();
        };
        let Ok(read_dir) = fs::read_dir(&native) else {
            return Vec::new();
        };

        let mut entries: Vec<ArchiveEntry> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let file_type = entry.file_type().ok()?;

                let kind = if file_type.is_symlink() {
                    if !self.allow_symlinks {
                        return None;
                    }
                    let target = fs::metadata(entry.path()).ok()?;
                    if target.is_dir() {
                        EntryKind::Directory
                    } else {
                        EntryKind::File
                    }
                } else if file_type.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };

                Some(ArchiveEntry { name, kind })
            })
            .collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn stat(&self, path: &str) -> Option<EntryKind> {
        let native = self.native_path(path)?;
        let metadata = fs::metadata(native).ok()?;
        if metadata.is_dir() {
            Some(EntryKind::Directory)
        } else {
            Some(EntryKind::File)
        }
    }

    fn open_entry(&mut self, path: &str) -> io::Result<Box<dyn NativeFile>> {
        let native = self.native_path(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {}", path))
        })?;

        if fs::metadata(&native)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path),
            ));
        }

        trace!(path = %native.display(), "Opening loose file");
        Ok(Box::new(LooseFile::open(&native)?))
    }

    fn tag(&self) -> BackendTag {
        BackendTag::Loose
    }
}

/// Native file handle for a loose asset or a write-directory file.
#[derive(Debug)]
pub struct LooseFile {
    file: File,
    writable: bool,
}

impl LooseFile {
    /// Open an existing file read-only.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            file: File::open(path)?,
            writable: false,
        })
    }

    /// Create (or truncate) a file for writing, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            writable: true,
        })
    }
}

impl NativeFile for LooseFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(read_only_error());
        }
        self.file.write(buf)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn length(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}
