//! Logging setup.
//!
//! The library itself only emits `tracing` events. Binaries call
//! [`init_logging`] once at startup to install a subscriber: human-readable
//! output on stderr, plus an optional plain-text log file written from a
//! background thread. `RUST_LOG` overrides the configured level.
//!
//! Keep the returned [`LoggingGuard`] alive for the life of the program;
//! dropping it flushes and closes the log file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Errors from installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level or filter directive did not parse.
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    /// The log file's directory could not be created.
    #[error("Failed to prepare log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed.
    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`, `assetfs=debug`).
    pub level: String,

    /// Also write events to this file.
    pub log_file: Option<PathBuf>,

    /// Colorize stderr output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            ansi: true,
        }
    }
}

/// Keeps the background log writer running.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| level.to_string());
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        filter: directive.clone(),
        reason: e.to_string(),
    })
}

/// Split a log file path into `(directory, file name)`, creating the directory.
fn prepare_log_file(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError> {
    let file_name = path.file_name().ok_or_else(|| LoggingError::LogFile {
        path: path.display().to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "no file name"),
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|source| LoggingError::LogFile {
        path: path.display().to_string(),
        source,
    })?;

    Ok((dir, PathBuf::from(file_name)))
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level)?;

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.ansi)
        .with_target(false);

    let (file_layer, file_guard) = match &config.log_file {
        Some(path) => {
            let (dir, file_name) = prepare_log_file(path)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
