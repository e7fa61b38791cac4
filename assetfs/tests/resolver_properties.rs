//! Property tests for name resolution and the path cache.
//!
//! Run with: `cargo test --test resolver_properties`

mod common;

use std::collections::HashSet;

use assetfs::path::{find_ext, join};
use assetfs::resolver::prefix_match;
use assetfs::{ArchiverRegistry, MemoryIo, MountTable, NameNormalization, PathCache, Stream};
use assetfs::{FileSystem, VfsConfig};
use proptest::prelude::*;

use common::rgss3;

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,11}"
}

fn ext_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}"
}

proptest! {
    #[test]
    fn test_base_always_matches_its_own_files(base in name_strategy(), ext in ext_strategy()) {
        let with_ext = format!("{}.{}", base, ext);
        prop_assert!(prefix_match(&base, &base));
        prop_assert!(prefix_match(&with_ext, &base));
        prop_assert_eq!(find_ext(&with_ext), Some(ext.as_str()));
    }

    #[test]
    fn test_longer_stem_never_matches(base in name_strategy(), suffix in "[A-Za-z0-9_]{1,4}", ext in ext_strategy()) {
        let candidate = format!("{}{}.{}", base, suffix, ext);
        prop_assert!(!prefix_match(&candidate, &base));
    }

    #[test]
    fn test_find_ext_ignores_directory_dots(dir in "[a-z]{1,6}\\.[a-z]{1,3}", base in name_strategy()) {
        let joined = join(&dir, &base);
        prop_assert_eq!(find_ext(&joined), None);
    }

    #[test]
    fn test_open_read_finds_every_file_by_stem(
        files in prop::collection::btree_map(name_strategy(), ext_strategy(), 1..12)
    ) {
        let entries: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|(stem, ext)| (format!("Data\\{}.{}", stem, ext), stem.as_bytes().to_vec()))
            .collect();
        let refs: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(n, d)| (n.as_str(), d.as_slice()))
            .collect();

        let mut vfs = FileSystem::new(VfsConfig::default().with_normalization(NameNormalization::Preserve));
        prop_assert!(vfs.mount_io(Box::new(MemoryIo::new(rgss3(17, &refs))), "Game.rgss3a"));

        for (stem, ext) in &files {
            let mut observed = None;
            let request = format!("Data/{}", stem);
            let result = vfs.open_read(&request, |mut s: Stream, e: Option<&str>| {
                observed = e.map(str::to_string);
                s.read_to_end_vec().map(|d| d == stem.as_bytes()).unwrap_or(false)
            });
            prop_assert!(result.is_ok(), "{} not resolved", request);
            prop_assert_eq!(observed.as_deref(), Some(ext.as_str()));
        }
    }

    #[test]
    fn test_cache_lists_each_lower_name_once(
        names in prop::collection::vec("[A-Ca-c]{1,3}\\.[a-c]{1,2}", 1..20)
    ) {
        let entries: Vec<(String, Vec<u8>)> = names
            .iter()
            .map(|n| (format!("Dir\\{}", n), Vec::new()))
            .collect();
        let refs: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(n, d)| (n.as_str(), d.as_slice()))
            .collect();

        let mut table = MountTable::new(ArchiverRegistry::standard(), false);
        table.mount_io(Box::new(MemoryIo::new(rgss3(1, &refs))), "Game.rgss3a").unwrap();
        let cache = PathCache::build(&table, NameNormalization::Preserve);

        let listed = cache.files_in("dir").unwrap_or(&[]);
        let unique: HashSet<_> = listed.iter().collect();
        prop_assert_eq!(unique.len(), listed.len());

        let expected: HashSet<String> = names.iter().map(|n| n.to_ascii_lowercase()).collect();
        prop_assert_eq!(listed.len(), expected.len());

        for name in listed {
            let real = cache.real_path(&format!("dir/{}", name));
            prop_assert!(real.is_some());
            prop_assert_eq!(real.unwrap().to_ascii_lowercase(), format!("dir/{}", name));
        }
    }
}
