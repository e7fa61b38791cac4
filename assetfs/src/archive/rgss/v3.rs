//! Entry table for `.rgss3a`.
//!
//! A seed word follows the header; the table key is derived from it once
//! and never advances. Records are fixed-width apart from the name and the
//! table ends at the first record whose offset decodes to zero.

use super::{check_bounds, check_name_len, decode_name, truncated, RgssEntry};
use crate::error::VfsResult;
use crate::io::ArchiveIo;

/// Derive the table key from the stored seed.
pub(super) fn table_key(seed: u32) -> u32 {
    seed.wrapping_mul(9).wrapping_add(3)
}

/// Read every record, starting just after the header.
pub(super) fn read_table(io: &mut dyn ArchiveIo) -> VfsResult<Vec<(String, RgssEntry)>> {
    let container_len = io.length()?;
    let key = table_key(io.read_u32_le().map_err(truncated)?);
    let mut entries = Vec::new();

    loop {
        let offset = io.read_u32_le().map_err(truncated)? ^ key;
        if offset == 0 {
            break;
        }

        let size = io.read_u32_le().map_err(truncated)? ^ key;
        let magic = io.read_u32_le().map_err(truncated)? ^ key;
        let name_len = check_name_len(io.read_u32_le().map_err(truncated)? ^ key)?;

        let mut raw = vec![0u8; name_len];
        io.read_exact(&mut raw).map_err(truncated)?;
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte ^= (key >> (8 * (i % 4))) as u8;
        }
        let name = decode_name(&raw)?;

        let entry = RgssEntry {
            offset: u64::from(offset),
            size: u64::from(size),
            magic,
        };
        check_bounds(&name, &entry, container_len)?;
        entries.push((name, entry));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::rgss::testing::encode_v3;
    use crate::archive::rgss::HEADER_LEN;
    use crate::error::VfsError;
    use crate::io::MemoryIo;

    fn table(bytes: Vec<u8>) -> VfsResult<Vec<(String, RgssEntry)>> {
        let mut io = MemoryIo::new(bytes);
        io.seek(HEADER_LEN).unwrap();
        read_table(&mut io)
    }

    #[test]
    fn test_table_key() {
        assert_eq!(table_key(0), 3);
        assert_eq!(table_key(1), 12);
        assert_eq!(table_key(u32::MAX), u32::MAX.wrapping_mul(9).wrapping_add(3));
    }

    #[test]
    fn test_reads_records_until_zero_offset() {
        let entries = table(encode_v3(
            0xABCD,
            &[("Data\\Actors.rvdata2", b"actors"), ("Audio\\SE\\Bell.ogg", b"ogg")],
        ))
        .unwrap();

        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Data/Actors.rvdata2", "Audio/SE/Bell.ogg"]);
        assert_eq!(entries[0].1.size, 6);
        assert_eq!(entries[1].1.offset, entries[0].1.offset + 6);
    }

    #[test]
    fn test_missing_terminator_is_corrupt() {
        let mut bytes = encode_v3(5, &[]);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(table(bytes), Err(VfsError::CorruptArchive { .. })));
    }

    #[test]
    fn test_offset_past_end_is_corrupt() {
        let mut bytes = encode_v3(5, &[("a.txt", b"abcdef")]);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(table(bytes), Err(VfsError::CorruptArchive { .. })));
    }
}
