//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assetfs::archive::rgss::{advance_magic, crypt, HEADER_MAGIC};
use tempfile::TempDir;

/// Create a temporary directory populated with `files`.
pub fn loose_dir(files: &[(&str, &[u8])]) -> TempDir {
    let temp = TempDir::new().unwrap();
    write_files(temp.path(), files);
    temp
}

/// Write `files` under `root`, creating parent directories.
pub fn write_files(root: &Path, files: &[(&str, &[u8])]) {
    for (path, data) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, data).unwrap();
    }
}

/// Build an `.rgssad` / `.rgss2a` container.
pub fn rgss1(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = HEADER_MAGIC.to_vec();
    out.push(1);

    let mut magic = 0xDEAD_CAFEu32;
    for (name, data) in entries {
        out.extend_from_slice(&(name.len() as u32 ^ magic).to_le_bytes());
        magic = advance_magic(magic);
        for b in name.bytes() {
            out.push(b ^ magic as u8);
            magic = advance_magic(magic);
        }
        out.extend_from_slice(&(data.len() as u32 ^ magic).to_le_bytes());
        magic = advance_magic(magic);

        let mut blob = data.to_vec();
        let mut data_magic = magic;
        crypt(&mut blob, 0, &mut data_magic);
        out.extend_from_slice(&blob);
    }
    out
}

/// Build an `.rgss3a` container.
pub fn rgss3(seed: u32, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let key = seed.wrapping_mul(9).wrapping_add(3);
    let mut out = HEADER_MAGIC.to_vec();
    out.push(3);
    out.extend_from_slice(&seed.to_le_bytes());

    let table_len: usize = entries.iter().map(|(n, _)| 16 + n.len()).sum::<usize>() + 4;
    let mut offset = out.len() + table_len;
    let mut blobs = Vec::new();

    for (i, (name, data)) in entries.iter().enumerate() {
        let entry_magic = 0xC0FF_EE00u32 ^ i as u32;
        for word in [offset as u32, data.len() as u32, entry_magic, name.len() as u32] {
            out.extend_from_slice(&(word ^ key).to_le_bytes());
        }
        for (j, b) in name.bytes().enumerate() {
            out.push(b ^ (key >> (8 * (j % 4))) as u8);
        }

        let mut blob = data.to_vec();
        let mut m = entry_magic;
        crypt(&mut blob, 0, &mut m);
        blobs.extend_from_slice(&blob);
        offset += data.len();
    }
    out.extend_from_slice(&key.to_le_bytes());
    out.extend_from_slice(&blobs);
    out
}
