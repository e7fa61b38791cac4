//! Case-insensitive path cache.
//!
//! Game data written for case-insensitive filesystems refers to assets
//! with whatever casing the author typed. The cache is built once, after all
//! mounts are established, from a single walk of the merged tree:
//!
//! ```text
//! Graphics/Titles/Title.png        file_lists                      paths
//! Graphics/Titles/Logo.PNG   ──►   "graphics/titles" → [title.png,  "graphics/titles/title.png"
//! Data/Scripts.rxdata                                   logo.png]     → "Graphics/Titles/Title.png"
//!                                  "data" → [scripts.rxdata]        "graphics/titles/logo.png"
//!                                  "graphics" → []                    → "Graphics/Titles/Logo.PNG"
//!                                  "" → [] ...                      ...
//! ```
//!
//! Every name goes through the configured [`NameNormalization`] before it is
//! lower-cased. Each lower-cased path is recorded once; when two mounts
//! disagree only in case, the entry the walk visits first wins.
//!
//! The cache is never updated in place. Mounting after it is built leaves
//! it stale until it is rebuilt.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::mount::MountTable;
use crate::normalize::NameNormalization;
use crate::path::{join, lowercase, split_dir_base};

/// Flattened case-insensitive index of every reachable file.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    /// Lower-cased directory path -> lower-cased file names it contains.
    file_lists: HashMap<String, Vec<String>>,

    /// Lower-cased full path -> real full path.
    paths: HashMap<String, String>,

    normalization: NameNormalization,
}

impl PathCache {
    /// Walk every mount and index its files.
    pub fn build(table: &MountTable, normalization: NameNormalization) -> Self {
        let mut cache = Self {
            file_lists: HashMap::new(),
            paths: HashMap::new(),
            normalization,
        };
        cache.file_lists.insert(String::new(), Vec::new());

        let mut skipped = 0usize;
        let mut seen = HashSet::new();

        for entry in table.walk("") {
            let (dir, name) = split_dir_base(&entry.path);
            let canonical = join(&normalization.apply(dir), &normalization.apply(name));
            let lower = lowercase(&canonical);

            if entry.kind.is_dir() {
                cache.file_lists.entry(lower).or_default();
                continue;
            }

            if !seen.insert(lower.clone()) {
                skipped += 1;
                continue;
            }

            let (lower_dir, lower_name) = split_dir_base(&lower);
            cache
                .file_lists
                .entry(lower_dir.to_string())
                .or_default()
                .push(lower_name.to_string());
            cache.paths.insert(lower, entry.path);
        }

        if skipped > 0 {
            debug!(skipped, "Path cache skipped entries differing only in case");
        }
        info!(
            files = cache.file_count(),
            directories = cache.directory_count(),
            normalization = %normalization,
            "Path cache built"
        );
        cache
    }

    /// Lower-cased file names recorded for a lower-cased directory.
    pub fn files_in(&self, lower_dir: &str) -> Option<&[String]> {
        self.file_lists.get(lower_dir).map(Vec::as_slice)
    }

    /// Real path for a lower-cased full path.
    pub fn real_path(&self, lower_path: &str) -> Option<&str> {
        self.paths.get(lower_path).map(String::as_str)
    }

    /// Number of indexed files.
    pub fn file_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of indexed directories, including the root.
    pub fn directory_count(&self) -> usize {
        self.file_lists.len()
    }

    /// Normalization the cache was built with.
    pub fn normalization(&self) -> NameNormalization {
        self.normalization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiverRegistry;
    use crate::archive::rgss::testing::encode_v1;
    use crate::io::MemoryIo;
    use std::fs;
    use tempfile::TempDir;

    fn loose(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for path in files {
            let full = temp.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, path.as_bytes()).unwrap();
        }
        temp
    }

    fn table(dirs: &[&TempDir]) -> MountTable {
        let mut table = MountTable::new(ArchiverRegistry::standard(), false);
        for dir in dirs {
            table.add_path(dir.path()).unwrap();
        }
        table
    }

    #[test]
    fn test_build_indexes_files_by_lower_case() {
        let dir = loose(&["Graphics/Titles/Title.png", "Data/Scripts.rxdata", "Game.ini"]);
        let cache = PathCache::build(&table(&[&dir]), NameNormalization::Preserve);

        assert_eq!(cache.file_count(), 3);
        assert_eq!(
            cache.files_in("graphics/titles").unwrap(),
            &["title.png".to_string()]
        );
        assert_eq!(
            cache.real_path("graphics/titles/title.png"),
            Some("Graphics/Titles/Title.png")
        );
        assert_eq!(cache.files_in("").unwrap(), &["game.ini".to_string()]);
        assert_eq!(cache.files_in("graphics").unwrap().len(), 0);
    }

    #[test]
    fn test_every_listed_name_has_a_real_path() {
        let dir = loose(&["A/b.txt", "A/C/d.txt", "e.txt"]);
        let cache = PathCache::build(&table(&[&dir]), NameNormalization::Preserve);

        for (lower_dir, names) in &cache.file_lists {
            for name in names {
                assert!(cache.real_path(&join(lower_dir, name)).is_some());
            }
        }
    }

    #[test]
    fn test_case_collision_across_mounts_keeps_first() {
        let a = loose(&["Data/Map.rxdata"]);
        let b = loose(&["data/map.RXDATA", "data/Other.rxdata"]);
        let cache = PathCache::build(&table(&[&a, &b]), NameNormalization::Preserve);

        let names = cache.files_in("data").unwrap();
        assert_eq!(names.iter().filter(|n| *n == "map.rxdata").count(), 1);
        assert!(names.contains(&"other.rxdata".to_string()));
        assert_eq!(cache.real_path("data/map.rxdata"), Some("Data/Map.rxdata"));
        assert_eq!(cache.real_path("data/other.rxdata"), Some("data/Other.rxdata"));
    }

    #[test]
    fn test_nfc_keys_map_to_real_decomposed_path() {
        let mut table = MountTable::new(ArchiverRegistry::standard(), false);
        table
            .mount_io(
                Box::new(MemoryIo::new(encode_v1(&[("Pictures\\E\u{301}toile.png", b"x")]))),
                "pack.rgssad",
            )
            .unwrap();

        let cache = PathCache::build(&table, NameNormalization::Nfc);
        assert_eq!(
            cache.real_path("pictures/\u{c9}toile.png"),
            Some("Pictures/E\u{301}toile.png")
        );
        assert!(cache.real_path("pictures/e\u{301}toile.png").is_none());
    }

    #[test]
    fn test_empty_table_has_root_only() {
        let table = MountTable::new(ArchiverRegistry::standard(), false);
        let cache = PathCache::build(&table, NameNormalization::Preserve);
        assert_eq!(cache.file_count(), 0);
        assert_eq!(cache.directory_count(), 1);
        assert!(cache.files_in("").unwrap().is_empty());
    }
}
