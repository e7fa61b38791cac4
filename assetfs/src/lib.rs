//! AssetFS - Virtual filesystem for game assets
//!
//! This library lets a game engine load assets (scripts, images, fonts, audio)
//! by logical name without caring whether the bytes live in a loose on-disk
//! file, inside an encrypted archive, or in a raw host-provided stream.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       FileSystem                         │
//! │                                                          │
//! │  add_path("Game.rgss3a")  ──► MountTable ──► Archiver    │
//! │  add_path("Patch/")                 │        registry    │
//! │  create_path_cache()  ──► PathCache (lower → mixed)      │
//! │  open_read("Graphics/Title", handler)                    │
//! │        │                                                 │
//! │        ▼                                                 │
//! │  OpenResolver ──► Stream ──► handler.try_read(.., "png") │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Precedence
//!
//! Mounts are searched in mount order: the earliest mount that contains a
//! path wins. Mount override directories *before* the base package if they
//! should shadow it.
//!
//! # Example
//!
//! ```ignore
//! use assetfs::{FileSystem, VfsConfig};
//!
//! let mut fs = FileSystem::new(VfsConfig::default());
//! fs.add_path("Game.rgss3a");
//! fs.create_path_cache();
//!
//! let resolved = fs.open_read("Graphics/Titles/Title", |mut stream: assetfs::Stream, ext: Option<&str>| {
//!     ext == Some("png") && stream.size().is_ok()
//! })?;
//! println!("loaded {}", resolved.path);
//! ```

pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod fonts;
pub mod io;
pub mod logging;
pub mod mount;
pub mod normalize;
pub mod path;
pub mod profile;
pub mod resolver;
pub mod stream;
pub mod walk;

pub use archive::{Archive, ArchiveEntry, Archiver, ArchiverInfo, ArchiverRegistry, EntryKind};
pub use cache::PathCache;
pub use config::{default_config_path, ConfigError, VfsConfig};
pub use error::{VfsError, VfsResult};
pub use filesystem::FileSystem;
pub use fonts::FontSetSink;
pub use io::{ArchiveIo, FileIo, MemoryIo};
pub use logging::{init_logging, LoggingConfig, LoggingError, LoggingGuard};
pub use mount::{MountInfo, MountTable};
pub use normalize::NameNormalization;
pub use profile::ProfileError;
pub use resolver::{OpenHandler, Resolved};
pub use stream::{BackendTag, NativeFile, Stream, Whence};
pub use walk::{Walk, WalkEntry};

/// Crate version, reported by the CLI and in mount diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
