//! The filesystem context.
//!
//! [`FileSystem`] owns everything the engine's asset layer needs: the mount
//! table with its archiver registry, the optional path cache, and the write
//! directory. Create one at startup, mount, build the cache, then resolve
//! assets through it. Dropping it unmounts everything.
//!
//! # Lifecycle
//!
//! ```text
//! FileSystem::new(config)
//!     │
//!     ├── add_path(..) / mount_io(..)     (order = precedence)
//!     │
//!     ├── create_path_cache()             (once, after mounting)
//!     │
//!     ├── open_read / open_read_raw / exists / init_font_sets
//!     │
//!     └── drop                            (whole-table teardown)
//! ```
//!
//! Mounting after the cache exists is allowed but rebuilds the cache in
//! full; there is no incremental update.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::{ArchiverRegistry, LooseFile};
use crate::cache::PathCache;
use crate::config::VfsConfig;
use crate::error::{VfsError, VfsResult};
use crate::fonts::{self, FontSetSink};
use crate::io::ArchiveIo;
use crate::mount::{MountInfo, MountTable};
use crate::path::{sanitize, SEPARATOR};
use crate::resolver::{self, OpenHandler, Resolved};
use crate::stream::{BackendTag, Stream};

/// Virtual filesystem context.
pub struct FileSystem {
    config: VfsConfig,
    mounts: MountTable,
    cache: Option<PathCache>,
    write_dir: Option<PathBuf>,
}

impl FileSystem {
    /// Create a filesystem with the built-in archivers and nothing mounted.
    ///
    /// `config.mounts` and `config.write_dir` are ignored here; see
    /// [`FileSystem::from_config`].
    pub fn new(config: VfsConfig) -> Self {
        Self::with_registry(config, ArchiverRegistry::standard())
    }

    /// Create a filesystem with a custom archiver set.
    pub fn with_registry(config: VfsConfig, registry: ArchiverRegistry) -> Self {
        debug!(archivers = ?registry, allow_symlinks = config.allow_symlinks, "Filesystem created");
        let mounts = MountTable::new(registry, config.allow_symlinks);
        Self {
            config,
            mounts,
            cache: None,
            write_dir: None,
        }
    }

    /// Create a filesystem and apply everything in `config`.
    ///
    /// Mounts are added in order (failures are logged and skipped), the
    /// write directory is set, and the path cache is built if enabled.
    pub fn from_config(config: VfsConfig) -> Self {
        let mut vfs = Self::new(config);

        for path in vfs.config.mounts.clone() {
            vfs.add_path(&path);
        }

        if let Some(dir) = vfs.config.write_dir.clone() {
            if let Err(e) = vfs.set_write_dir(&dir) {
                warn!(path = %dir.display(), error = %e, "Could not set write directory");
            }
        }

        if vfs.config.path_cache {
            vfs.create_path_cache();
        }
        vfs
    }

    /// Configuration this filesystem was created with.
    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    /// Mount a directory or archive.
    ///
    /// Failures are logged and reported as `false`; the path then simply
    /// contributes nothing.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.mounts.add_path(path) {
            Ok(()) => {
                self.refresh_stale_cache();
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed adding path");
                false
            }
        }
    }

    /// Mount a container delivered as a raw host stream.
    pub fn mount_io(&mut self, io: Box<dyn ArchiveIo>, name: &str) -> bool {
        match self.mounts.mount_io(io, name) {
            Ok(()) => {
                self.refresh_stale_cache();
                true
            }
            Err(e) => {
                warn!(name, error = %e, "Failed mounting stream");
                false
            }
        }
    }

    fn refresh_stale_cache(&mut self) {
        if self.cache.is_some() {
            warn!("Mount added after path cache was built; rebuilding cache");
            self.create_path_cache();
        }
    }

    /// Build (or rebuild) the case-insensitive path cache.
    pub fn create_path_cache(&mut self) {
        self.cache = Some(PathCache::build(&self.mounts, self.config.normalization));
    }

    /// Whether a path cache is active.
    pub fn has_path_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// The active path cache, if any.
    pub fn path_cache(&self) -> Option<&PathCache> {
        self.cache.as_ref()
    }

    /// Mounts in search order.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.mounts.mounts()
    }

    /// The underlying mount table.
    pub fn mount_table(&self) -> &MountTable {
        &self.mounts
    }

    /// Resolve `filename` (usually without extension) and offer each
    /// candidate to `handler` until one is claimed.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NoFile`] when nothing matched or nothing was claimed
    /// - [`VfsError::Backend`] when a listed candidate could not be opened
    /// - [`VfsError::InvalidPath`] / [`VfsError::PathTooLong`] for bad requests
    pub fn open_read<H: OpenHandler>(&mut self, filename: &str, mut handler: H) -> VfsResult<Resolved> {
        resolver::open_read(&mut self.mounts, self.cache.as_ref(), filename, &mut handler)
    }

    /// Open an exact path: no case folding, no extension discovery.
    ///
    /// The caller is expected to know the file exists; a missing file is
    /// reported as [`VfsError::NotFound`].
    pub fn open_read_raw(&mut self, filename: &str, free_on_close: bool) -> VfsResult<Stream> {
        let path = sanitize(filename)?;
        let stream = self.mounts.open(&path).map_err(|e| {
            if e.is_not_found() {
                warn!(path = %path, "open_read_raw on a missing file");
            }
            e
        })?;
        Ok(stream.with_free_on_close(free_on_close))
    }

    /// Like [`FileSystem::open_read_raw`], refilling a caller-owned wrapper.
    pub fn open_read_raw_into(
        &mut self,
        stream: &mut Stream,
        filename: &str,
        free_on_close: bool,
    ) -> VfsResult<()> {
        let opened = self.open_read_raw(filename, free_on_close)?;
        stream.refill(opened);
        Ok(())
    }

    /// Check if an entry exists at exactly `filename`.
    ///
    /// Case-sensitive and independent of the path cache.
    pub fn exists(&self, filename: &str) -> bool {
        match sanitize(filename) {
            Ok(path) => self.mounts.exists(&path),
            Err(_) => false,
        }
    }

    /// Hand every TrueType/OpenType file under `Fonts/` to `sink`.
    ///
    /// Returns the number of fonts added.
    pub fn init_font_sets<S: FontSetSink>(&mut self, mut sink: S) -> usize {
        fonts::scan(&mut self.mounts, &mut sink)
    }

    /// Set the directory that receives files opened with
    /// [`FileSystem::open_write`], creating it if needed.
    pub fn set_write_dir(&mut self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        info!(path = %path.display(), "Write directory set");
        self.write_dir = Some(path.to_path_buf());
        Ok(())
    }

    /// The current write directory.
    pub fn write_dir(&self) -> Option<&Path> {
        self.write_dir.as_deref()
    }

    /// Create or truncate `filename` under the write directory.
    ///
    /// The write directory is not a mount; files written here are only
    /// visible to reads if the same directory is also mounted.
    pub fn open_write(&mut self, filename: &str) -> VfsResult<Stream> {
        let dir = self.write_dir.as_ref().ok_or(VfsError::NoWriteDir)?;
        let path = sanitize(filename)?;
        if path.is_empty() {
            return Err(VfsError::InvalidPath {
                path: filename.to_string(),
                reason: "empty file name".to_string(),
            });
        }

        let mut native = dir.clone();
        native.extend(path.split(SEPARATOR));

        let file = LooseFile::create(&native).map_err(|e| VfsError::backend(path.as_str(), &e))?;
        debug!(path = %native.display(), "Opened for writing");
        Ok(Stream::new(Box::new(file), BackendTag::Loose, path))
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new(VfsConfig::default())
    }
}

impl fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystem")
            .field("mounts", &self.mounts)
            .field("path_cache", &self.cache.is_some())
            .field("write_dir", &self.write_dir)
            .finish()
    }
}

impl Drop for FileSystem {
    fn drop(&mut self) {
        debug!(mounts = self.mounts.len(), "Filesystem torn down");
    }
}
