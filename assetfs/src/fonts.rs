//! Font inventory.
//!
//! At startup the engine registers every font shipped with the game so
//! scripts can refer to fonts by family name. Fonts live in a `Fonts/`
//! directory in any mount; only TrueType and OpenType files are picked up.

use tracing::{debug, warn};

use crate::mount::MountTable;
use crate::path::{find_ext, join};
use crate::stream::Stream;

/// Directory scanned for fonts.
pub const FONTS_DIR: &str = "Fonts";

/// Receives each discovered font file.
pub trait FontSetSink {
    /// Register the font at `path`, reading it from `stream`.
    fn add_font(&mut self, stream: &mut Stream, path: &str);
}

impl<F> FontSetSink for F
where
    F: FnMut(&mut Stream, &str),
{
    fn add_font(&mut self, stream: &mut Stream, path: &str) {
        self(stream, path)
    }
}

/// Whether a file name has a font extension (case-insensitive).
pub fn is_font_file(name: &str) -> bool {
    find_ext(name).is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
}

/// Hand every font under [`FONTS_DIR`] to `sink`, returning how many were added.
pub(crate) fn scan<S: FontSetSink + ?Sized>(table: &mut MountTable, sink: &mut S) -> usize {
    let names: Vec<String> = table
        .read_dir(FONTS_DIR)
        .into_iter()
        .filter(|e| e.kind.is_file() && is_font_file(&e.name))
        .map(|e| e.name)
        .collect();

    let mut added = 0;
    for name in names {
        let path = join(FONTS_DIR, &name);
        match table.open(&path) {
            Ok(mut stream) => {
                sink.add_font(&mut stream, &path);
                added += 1;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Skipping unreadable font");
            }
        }
    }

    debug!(fonts = added, "Font scan complete");
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiverRegistry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_font_file() {
        assert!(is_font_file("VL-Gothic.ttf"));
        assert!(is_font_file("Noto.OTF"));
        assert!(!is_font_file("readme.txt"));
        assert!(!is_font_file("ttf"));
    }

    #[test]
    fn test_scan_collects_fonts_only() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Fonts/Sub")).unwrap();
        fs::write(temp.path().join("Fonts/A.ttf"), b"ttf-a").unwrap();
        fs::write(temp.path().join("Fonts/B.OTF"), b"otf-b").unwrap();
        fs::write(temp.path().join("Fonts/License.txt"), b"").unwrap();
        fs::write(temp.path().join("Fonts/Sub/C.ttf"), b"").unwrap();

        let mut table = MountTable::new(ArchiverRegistry::standard(), false);
        table.add_path(temp.path()).unwrap();

        let mut fonts = Vec::new();
        let count = scan(&mut table, &mut |stream: &mut Stream, path: &str| {
            fonts.push((path.to_string(), stream.read_to_end_vec().unwrap()));
        });

        assert_eq!(count, 2);
        assert_eq!(
            fonts,
            vec![
                ("Fonts/A.ttf".to_string(), b"ttf-a".to_vec()),
                ("Fonts/B.OTF".to_string(), b"otf-b".to_vec()),
            ]
        );
    }

    #[test]
    fn test_scan_without_fonts_dir() {
        let temp = TempDir::new().unwrap();
        let mut table = MountTable::new(ArchiverRegistry::standard(), false);
        table.add_path(temp.path()).unwrap();

        let count = scan(&mut table, &mut |_: &mut Stream, _: &str| {});
        assert_eq!(count, 0);
    }
}
