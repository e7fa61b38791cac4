//! Filesystem configuration.
//!
//! A [`VfsConfig`] describes what to mount and how the filesystem behaves.
//! It can be built in code or loaded from an ini file.
//!
//! # Example Configuration (INI)
//!
//! ```ini
//! [filesystem]
//! allow_symlinks = false
//! path_cache = true
//! unicode_nfc = auto
//! write_dir = saves
//!
//! [mounts]
//! patch = Patch
//! game = Game.rgss3a
//! ```
//!
//! Entries under `[mounts]` are mounted in file order; their keys are only
//! labels. Relative paths (mounts and `write_dir`) resolve against the
//! directory containing the config file.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::normalize::NameNormalization;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed.
    #[error("Failed to load config {path}: {reason}")]
    Load { path: String, reason: String },

    /// A key holds a value of the wrong form.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Configuration for a [`FileSystem`](crate::FileSystem).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsConfig {
    /// Follow symbolic links inside loose directories.
    pub allow_symlinks: bool,

    /// Build the path cache after mounting in `FileSystem::from_config`.
    pub path_cache: bool,

    /// Canonicalization applied to names when the path cache is built.
    pub normalization: NameNormalization,

    /// Paths to mount, in search order.
    pub mounts: Vec<PathBuf>,

    /// Directory receiving files opened for writing.
    pub write_dir: Option<PathBuf>,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            allow_symlinks: false,
            path_cache: true,
            normalization: NameNormalization::Platform,
            mounts: Vec::new(),
            write_dir: None,
        }
    }
}

impl VfsConfig {
    /// Set whether loose directories follow symbolic links.
    pub fn with_allow_symlinks(mut self, allow: bool) -> Self {
        self.allow_symlinks = allow;
        self
    }

    /// Set whether `from_config` builds the path cache.
    pub fn with_path_cache(mut self, enabled: bool) -> Self {
        self.path_cache = enabled;
        self
    }

    /// Set the name normalization policy.
    pub fn with_normalization(mut self, normalization: NameNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Append a mount at the lowest precedence.
    pub fn with_mount(mut self, path: impl Into<PathBuf>) -> Self {
        self.mounts.push(path.into());
        self
    }

    /// Set the write directory.
    pub fn with_write_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.write_dir = Some(path.into());
        self
    }

    /// Load configuration from an ini file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let mut config = Self::default();

        if let Some(section) = ini.section(Some("filesystem")) {
            if let Some(value) = section.get("allow_symlinks") {
                config.allow_symlinks = parse_bool("filesystem.allow_symlinks", value)?;
            }
            if let Some(value) = section.get("path_cache") {
                config.path_cache = parse_bool("filesystem.path_cache", value)?;
            }
            if let Some(value) = section.get("unicode_nfc") {
                config.normalization = parse_normalization(value)?;
            }
            if let Some(value) = section.get("write_dir") {
                let value = value.trim();
                if !value.is_empty() {
                    config.write_dir = Some(base.join(value));
                }
            }
        }

        if let Some(section) = ini.section(Some("mounts")) {
            config.mounts = section
                .iter()
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
                .map(|value| base.join(value))
                .collect();
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_normalization(value: &str) -> Result<NameNormalization, ConfigError> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Ok(NameNormalization::Platform);
    }
    Ok(match parse_bool("filesystem.unicode_nfc", value)? {
        true => NameNormalization::Nfc,
        false => NameNormalization::Preserve,
    })
}

/// Default location of the configuration file: `<config dir>/assetfs/config.ini`.
///
/// Falls back to the current directory when the platform has no config dir.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("assetfs")
        .join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = VfsConfig::default();
        assert!(!config.allow_symlinks);
        assert!(config.path_cache);
        assert_eq!(config.normalization, NameNormalization::Platform);
        assert!(config.mounts.is_empty());
        assert!(config.write_dir.is_none());
    }

    #[test]
    fn test_builder() {
        let config = VfsConfig::default()
            .with_allow_symlinks(true)
            .with_path_cache(false)
            .with_normalization(NameNormalization::Nfc)
            .with_mount("Patch")
            .with_mount("Game.rgss3a")
            .with_write_dir("Saves");

        assert!(config.allow_symlinks);
        assert!(!config.path_cache);
        assert_eq!(config.mounts, vec![PathBuf::from("Patch"), PathBuf::from("Game.rgss3a")]);
        assert_eq!(config.write_dir, Some(PathBuf::from("Saves")));
    }

    #[test]
    fn test_load_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[filesystem]\n\
             allow_symlinks = yes\n\
             path_cache = false\n\
             unicode_nfc = true\n\
             write_dir = saves\n\
             \n\
             [mounts]\n\
             patch = Patch\n\
             game = Game.rgss3a\n\
             extra = /opt/rtp\n",
        )
        .unwrap();

        let config = VfsConfig::load(&path).unwrap();
        assert!(config.allow_symlinks);
        assert!(!config.path_cache);
        assert_eq!(config.normalization, NameNormalization::Nfc);
        assert_eq!(config.write_dir, Some(temp.path().join("saves")));
        assert_eq!(
            config.mounts,
            vec![
                temp.path().join("Patch"),
                temp.path().join("Game.rgss3a"),
                PathBuf::from("/opt/rtp"),
            ]
        );
    }

    #[test]
    fn test_load_missing_sections_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "").unwrap();

        assert_eq!(VfsConfig::load(&path).unwrap(), VfsConfig::default());
    }

    #[test]
    fn test_load_invalid_bool() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[filesystem]\npath_cache = maybe\n").unwrap();

        assert!(matches!(
            VfsConfig::load(&path),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "filesystem.path_cache"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            VfsConfig::load("/nonexistent/assetfs/config.ini"),
            Err(ConfigError::Load { .. })
        ));
    }

    #[test]
    fn test_unicode_nfc_auto() {
        assert_eq!(parse_normalization("auto").unwrap(), NameNormalization::Platform);
        assert_eq!(parse_normalization("0").unwrap(), NameNormalization::Preserve);
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("assetfs/config.ini"));
    }
}
