//! Private profile strings.
//!
//! Game scripts keep small settings (volume, key bindings, window mode) in
//! Windows-style `.ini` files next to the game and read them back through
//! the classic `GetPrivateProfileString` / `WritePrivateProfileString`
//! pair. These helpers give the same behaviour on every platform.
//!
//! An empty section name addresses the keys that appear before any
//! `[section]` header.

use std::fs::File;
use std::path::Path;

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from writing profile strings.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The existing profile could not be parsed.
    #[error("Failed to read profile {path}: {reason}")]
    Read { path: String, reason: String },

    /// The profile could not be written back.
    #[error("Failed to write profile {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn section_name(section: &str) -> Option<&str> {
    if section.is_empty() {
        None
    } else {
        Some(section)
    }
}

/// Read `key` from `section`, returning `default` when it is absent.
///
/// A missing profile is created empty. A profile that cannot be read or
/// parsed yields the default.
pub fn get_string(section: &str, key: &str, default: &str, path: impl AsRef<Path>) -> String {
    let path = path.as_ref();

    if !path.exists() {
        if let Err(e) = File::create(path) {
            warn!(path = %path.display(), error = %e, "Could not create profile");
        }
        return default.to_string();
    }

    match Ini::load_from_file(path) {
        Ok(ini) => ini
            .get_from(section_name(section), key)
            .unwrap_or(default)
            .to_string(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read profile");
            default.to_string()
        }
    }
}

/// Set `key` in `section` to `value`, creating the file and section as needed.
pub fn write_string(
    section: &str,
    key: &str,
    value: &str,
    path: impl AsRef<Path>,
) -> Result<(), ProfileError> {
    let path = path.as_ref();

    let mut ini = if path.exists() {
        Ini::load_from_file(path).map_err(|e| ProfileError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
    } else {
        Ini::new()
    };

    ini.with_section(section_name(section)).set(key, value);
    ini.write_to_file(path).map_err(|source| ProfileError::Write {
        path: path.display().to_string(),
        source,
    })?;

    debug!(path = %path.display(), section, key, "Profile string written");
    Ok(())
}
