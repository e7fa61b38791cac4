//! Entry table for `.rgssad` / `.rgss2a`.
//!
//! The table is interleaved with the data: each record is followed
//! directly by its payload, and the table ends at end of file. A single key
//! rolls through the whole table, one step per word and per name byte.

use super::{
    advance_magic, check_bounds, check_name_len, decode_name, truncated, RgssEntry,
};
use crate::error::VfsResult;
use crate::io::ArchiveIo;

/// Table key at the first record.
pub(super) const INITIAL_MAGIC: u32 = 0xDEAD_CAFE;

/// Read every record, starting just after the header.
pub(super) fn read_table(io: &mut dyn ArchiveIo) -> VfsResult<Vec<(String, RgssEntry)>> {
    let container_len = io.length()?;
    let mut magic = INITIAL_MAGIC;
    let mut entries = Vec::new();

    while io.tell()? < container_len {
        let name_len = check_name_len(io.read_u32_le().map_err(truncated)? ^ magic)?;
        magic = advance_magic(magic);

        let mut raw = vec![0u8; name_len];
        io.read_exact(&mut raw).map_err(truncated)?;
        for byte in raw.iter_mut() {
            *byte ^= magic as u8;
            magic = advance_magic(magic);
        }
        let name = decode_name(&raw)?;

        let size = io.read_u32_le().map_err(truncated)? ^ magic;
        magic = advance_magic(magic);

        let entry = RgssEntry {
            offset: io.tell()?,
            size: u64::from(size),
            magic,
        };
        check_bounds(&name, &entry, container_len)?;
        io.seek(entry.offset + entry.size)?;

        entries.push((name, entry));
    }

    Ok(entries)
}
