//! Virtual path handling.
//!
//! Virtual paths are `/`-separated, relative to the union root, and bounded
//! to [`MAX_PATH_LEN`] bytes. Every path that enters the filesystem goes
//! through [`sanitize`] first so the rest of the crate can assume a canonical
//! form: no leading separator, no empty components, no `.` or `..`.

use crate::error::{VfsError, VfsResult};

/// Maximum length of a virtual path in bytes.
pub const MAX_PATH_LEN: usize = 512;

/// Path separator used in the virtual namespace.
pub const SEPARATOR: char = '/';

/// Canonicalize a requested virtual path.
///
/// Leading and repeated separators are collapsed. `.` and `..` components
/// and embedded NUL bytes are rejected.
///
/// # Examples
///
/// ```
/// use assetfs::path::sanitize;
///
/// assert_eq!(sanitize("/Graphics//Titles/Title").unwrap(), "Graphics/Titles/Title");
/// assert_eq!(sanitize("").unwrap(), "");
/// assert!(sanitize("Graphics/../Data").is_err());
/// ```
pub fn sanitize(path: &str) -> VfsResult<String> {
    check_len(path)?;

    if path.contains('\0') {
        return Err(VfsError::InvalidPath {
            path: path.escape_default().to_string(),
            reason: "embedded NUL byte".to_string(),
        });
    }

    let mut out = String::with_capacity(path.len());
    for component in path.split(SEPARATOR).filter(|c| !c.is_empty()) {
        if component == "." || component == ".." {
            return Err(VfsError::InvalidPath {
                path: path.to_string(),
                reason: format!("'{}' components are not allowed", component),
            });
        }
        if !out.is_empty() {
            out.push(SEPARATOR);
        }
        out.push_str(component);
    }

    Ok(out)
}

/// Fail with [`VfsError::PathTooLong`] if `path` exceeds [`MAX_PATH_LEN`].
pub fn check_len(path: &str) -> VfsResult<()> {
    if path.len() > MAX_PATH_LEN {
        return Err(VfsError::PathTooLong {
            len: path.len(),
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}

/// Split a sanitized path into `(directory, base_name)` at the last separator.
///
/// Paths without a separator live in the root directory `""`.
///
/// ```
/// use assetfs::path::split_dir_base;
///
/// assert_eq!(split_dir_base("Graphics/Titles/Title"), ("Graphics/Titles", "Title"));
/// assert_eq!(split_dir_base("Game.ini"), ("", "Game.ini"));
/// ```
pub fn split_dir_base(path: &str) -> (&str, &str) {
    match path.rfind(SEPARATOR) {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Join a directory and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        let mut out = String::with_capacity(dir.len() + 1 + name.len());
        out.push_str(dir);
        out.push(SEPARATOR);
        out.push_str(name);
        out
    }
}

/// Locate the extension of the final path component.
///
/// Returns the text after the last `.`, or `None` when the final component
/// has no dot. A dot at the very start of the string does not count.
///
/// ```
/// use assetfs::path::find_ext;
///
/// assert_eq!(find_ext("Title.png"), Some("png"));
/// assert_eq!(find_ext("Audio/BGM/Town.mid.ogg"), Some("ogg"));
/// assert_eq!(find_ext("Graphics.d/Title"), None);
/// assert_eq!(find_ext("Title"), None);
/// ```
pub fn find_ext(filename: &str) -> Option<&str> {
    let bytes = filename.as_bytes();
    for idx in (1..bytes.len()).rev() {
        match bytes[idx] {
            b'/' => return None,
            b'.' => return Some(&filename[idx + 1..]),
            _ => {}
        }
    }
    None
}

/// ASCII lower-case copy, matching the C locale folding legacy assets assume.
pub fn lowercase(path: &str) -> String {
    path.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // sanitize
    // ========================================================================

    #[test]
    fn test_sanitize_collapses_separators() {
        assert_eq!(sanitize("a//b///c").unwrap(), "a/b/c");
        assert_eq!(sanitize("/a/b/").unwrap(), "a/b");
    }

    #[test]
    fn test_sanitize_preserves_case() {
        assert_eq!(sanitize("Graphics/Title.PNG").unwrap(), "Graphics/Title.PNG");
    }

    #[test]
    fn test_sanitize_rejects_dot_components() {
        assert!(matches!(
            sanitize("./Title"),
            Err(VfsError::InvalidPath { .. })
        ));
        assert!(matches!(
            sanitize("Graphics/../../etc/passwd"),
            Err(VfsError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_sanitize_allows_dots_inside_names() {
        assert_eq!(sanitize("..hidden/a..b").unwrap(), "..hidden/a..b");
    }

    #[test]
    fn test_sanitize_rejects_nul() {
        assert!(sanitize("Title\0.png").is_err());
    }

    #[test]
    fn test_sanitize_rejects_overlong_path() {
        let long = "a".repeat(MAX_PATH_LEN + 1);
        assert!(matches!(
            sanitize(&long),
            Err(VfsError::PathTooLong { len, max }) if len == MAX_PATH_LEN + 1 && max == MAX_PATH_LEN
        ));

        let exact = "a".repeat(MAX_PATH_LEN);
        assert!(sanitize(&exact).is_ok());
    }

    // ========================================================================
    // split / join
    // ========================================================================

    #[test]
    fn test_split_root_file() {
        assert_eq!(split_dir_base("Title"), ("", "Title"));
    }

    #[test]
    fn test_split_nested() {
        assert_eq!(split_dir_base("a/b/c.txt"), ("a/b", "c.txt"));
    }

    #[test]
    fn test_join_root() {
        assert_eq!(join("", "Title.png"), "Title.png");
        assert_eq!(join("Graphics", "Title.png"), "Graphics/Title.png");
    }

    // ========================================================================
    // find_ext
    // ========================================================================

    #[test]
    fn test_find_ext_trailing_dot() {
        assert_eq!(find_ext("Title."), Some(""));
    }

    #[test]
    fn test_find_ext_leading_dot_ignored() {
        assert_eq!(find_ext(".gitignore"), None);
        assert_eq!(find_ext("dir/.hidden"), Some("hidden"));
    }

    #[test]
    fn test_find_ext_stops_at_separator() {
        assert_eq!(find_ext("v1.2/readme"), None);
    }

    #[test]
    fn test_lowercase_is_ascii_only() {
        assert_eq!(lowercase("Graphics/ÄBC.PNG"), "graphics/Äbc.png");
    }
}
