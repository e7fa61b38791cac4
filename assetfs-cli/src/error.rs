//! CLI error type.

use std::fmt;
use std::io;

use assetfs::{ConfigError, LoggingError, ProfileError, VfsError};

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded
    Config(String),
    /// Logging could not be initialized
    Logging(LoggingError),
    /// A filesystem operation failed
    Vfs(VfsError),
    /// A profile could not be written
    Profile(ProfileError),
    /// Nothing was mounted
    NoMounts,
    /// `exists` found nothing at the path
    Missing(String),
    /// Reading a stream or writing to stdout failed
    Io(io::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Missing(_) => 1,
            CliError::Vfs(e) if e.is_not_found() => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Vfs(e) => write!(f, "{}", e),
            CliError::Profile(e) => write!(f, "{}", e),
            CliError::NoMounts => write!(
                f,
                "Nothing mounted. Use --mount <PATH> or list paths under [mounts] in the config file."
            ),
            CliError::Missing(path) => write!(f, "{} does not exist", path),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Logging(e) => Some(e),
            CliError::Vfs(e) => Some(e),
            CliError::Profile(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<VfsError> for CliError {
    fn from(e: VfsError) -> Self {
        CliError::Vfs(e)
    }
}

impl From<ProfileError> for CliError {
    fn from(e: ProfileError) -> Self {
        CliError::Profile(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
