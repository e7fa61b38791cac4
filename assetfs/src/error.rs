//! Error types for the virtual filesystem.
//!
//! Mount failures are normally swallowed by [`FileSystem::add_path`] and only
//! logged; everything else surfaces to the caller through [`VfsError`].
//!
//! [`FileSystem::add_path`]: crate::FileSystem::add_path

use std::io;

use thiserror::Error;

/// Result type for filesystem operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// Errors that can occur while mounting, resolving or reading assets.
#[derive(Debug, Error)]
pub enum VfsError {
    /// A logical name resolved to zero accepted or claimed candidates.
    #[error("No such file: {name}")]
    NoFile { name: String },

    /// The backend failed to open an entry that enumeration reported.
    ///
    /// Carries the backend's own message. The lookup is aborted.
    #[error("Backend error opening {path}: {message}")]
    Backend { path: String, message: String },

    /// A literal path does not exist in any mount.
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// The path contains components the virtual namespace does not allow.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The path exceeds the maximum virtual path length.
    #[error("Path too long: {len} bytes (max: {max})")]
    PathTooLong { len: usize, max: usize },

    /// A mount could not be established.
    #[error("Failed to mount {path}: {reason}")]
    Mount { path: String, reason: String },

    /// No registered archiver recognized the container.
    #[error("Unrecognized archive format: {path}")]
    UnrecognizedArchive { path: String },

    /// The container header or entry table is malformed.
    #[error("Corrupt archive: {reason}")]
    CorruptArchive { reason: String },

    /// `open_write` was called without a write directory.
    #[error("No write directory configured")]
    NoWriteDir,

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VfsError {
    /// Create a backend error from an I/O failure on `path`.
    pub fn backend(path: impl Into<String>, source: &io::Error) -> Self {
        VfsError::Backend {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a corrupt-archive error.
    pub fn corrupt(reason: impl Into<String>) -> Self {
        VfsError::CorruptArchive {
            reason: reason.into(),
        }
    }

    /// Check if this is a "missing asset" error.
    ///
    /// Both [`VfsError::NoFile`] and [`VfsError::NotFound`] count; callers
    /// typically surface these to the end user as a missing asset.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NoFile { .. } | VfsError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_display() {
        let err = VfsError::NoFile {
            name: "Graphics/Title".to_string(),
        };
        assert_eq!(err.to_string(), "No such file: Graphics/Title");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_backend_error_carries_native_message() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = VfsError::backend("Audio/BGM/Town.ogg", &io_err);

        let message = err.to_string();
        assert!(message.contains("Audio/BGM/Town.ogg"));
        assert!(message.contains("access denied"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_path_too_long_display() {
        let err = VfsError::PathTooLong { len: 600, max: 512 };
        assert_eq!(err.to_string(), "Path too long: 600 bytes (max: 512)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: VfsError = io_err.into();
        assert!(matches!(err, VfsError::Io(_)));
    }
}
