//! Shared setup for commands that need a mounted filesystem.

use assetfs::{default_config_path, init_logging, FileSystem, LoggingConfig, LoggingGuard, VfsConfig};
use tracing::{debug, info};

use crate::error::CliError;
use crate::GlobalArgs;

/// Filter directive for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the effective configuration: config file first, then CLI overrides.
///
/// An explicit `--config` must load; the per-user default is only read when
/// it exists. Paths given with `--mount` are searched before configured ones.
pub fn resolve_config(args: &GlobalArgs) -> Result<VfsConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => VfsConfig::load(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                VfsConfig::load(&default_path)?
            } else {
                VfsConfig::default()
            }
        }
    };

    if !args.mounts.is_empty() {
        let mut mounts = args.mounts.clone();
        mounts.append(&mut config.mounts);
        config.mounts = mounts;
    }
    if args.no_path_cache {
        config.path_cache = false;
    }

    Ok(config)
}

/// Logging plus a filesystem built from the resolved configuration.
pub struct CliRunner {
    vfs: FileSystem,
    _log_guard: LoggingGuard,
}

impl CliRunner {
    /// Initialize logging and mount everything configured.
    pub fn new(args: &GlobalArgs) -> Result<Self, CliError> {
        let log_guard = init_logging(&LoggingConfig {
            level: log_level(args.verbose).to_string(),
            log_file: args.log_file.clone(),
            ..LoggingConfig::default()
        })?;

        let config = resolve_config(args)?;
        debug!(config = ?config, "Resolved configuration");

        let vfs = FileSystem::from_config(config);
        if vfs.mounts().is_empty() {
            return Err(CliError::NoMounts);
        }

        Ok(Self {
            vfs,
            _log_guard: log_guard,
        })
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = assetfs::VERSION,
            mounts = self.vfs.mounts().len(),
            path_cache = self.vfs.has_path_cache(),
            "assetfs starting"
        );
    }

    pub fn vfs(&self) -> &FileSystem {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut FileSystem {
        &mut self.vfs
    }
}
