//! RGSS encrypted archives.
//!
//! All three generations share an 8-byte header, `RGSSAD\0` followed by a
//! version byte, and the same per-entry data cipher. They differ only in
//! how the entry table is laid out and obfuscated:
//!
//! ```text
//! version 1 (rgssad, rgss2a)          version 3 (rgss3a)
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │ header                   │        │ header                   │
//! ├──────────────────────────┤        ├──────────────────────────┤
//! │ name_len ^ magic         │        │ seed                     │
//! │ name     ^ magic (bytes) │        ├──────────────────────────┤
//! │ size     ^ magic         │        │ offset, size, magic,     │
//! │ data (encrypted)         │        │ name_len, name  ^ key    │
//! ├──────────────────────────┤        │ ... until offset == 0    │
//! │ ... until end of file    │        ├──────────────────────────┤
//! └──────────────────────────┘        │ data blobs (encrypted)   │
//!                                     └──────────────────────────┘
//! ```
//!
//! Entry data is XORed with a rolling 32-bit key: byte `p` of an entry uses
//! byte `p % 4` of the key, and the key advances after every fourth byte.

mod v1;
mod v3;

use std::io;

use tracing::debug;

use super::{Archive, ArchiveEntry, Archiver, ArchiverInfo, EntryKind, EntryTree};
use crate::error::{VfsError, VfsResult};
use crate::io::ArchiveIo;
use crate::path::{sanitize, MAX_PATH_LEN};
use crate::stream::{BackendTag, NativeFile};

/// Fixed header prefix shared by every generation.
pub const HEADER_MAGIC: &[u8; 7] = b"RGSSAD\0";

/// Length of the header including the version byte.
pub const HEADER_LEN: u64 = 8;

/// Advance a cipher key by one step.
///
/// ```
/// use assetfs::archive::rgss::advance_magic;
///
/// assert_eq!(advance_magic(1), 10);
/// assert_eq!(advance_magic(0xDEADCAFE), 0xDEADCAFEu32.wrapping_mul(7).wrapping_add(3));
/// ```
pub fn advance_magic(magic: u32) -> u32 {
    magic.wrapping_mul(7).wrapping_add(3)
}

/// XOR `data` in place as bytes `start..start + data.len()` of an entry.
///
/// `magic` must be the key in effect at `start`; it is left at the key in
/// effect after the last byte. The cipher is its own inverse.
pub fn crypt(data: &mut [u8], start: u64, magic: &mut u32) {
    for (i, byte) in data.iter_mut().enumerate() {
        let pos = start + i as u64;
        let shift = 8 * (pos % 4) as u32;
        *byte ^= (*magic >> shift) as u8;
        if pos % 4 == 3 {
            *magic = advance_magic(*magic);
        }
    }
}

/// Read the header and return its version byte, or `None` if the prefix
/// does not match.
fn read_version(io: &mut dyn ArchiveIo) -> io::Result<Option<u8>> {
    let mut header = [0u8; HEADER_LEN as usize];
    io.read_exact(&mut header)?;
    if &header[..7] != HEADER_MAGIC {
        return Ok(None);
    }
    Ok(Some(header[7]))
}

/// Location and starting key of one entry's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RgssEntry {
    pub offset: u64,
    pub size: u64,
    pub magic: u32,
}

/// Validate a decoded entry against the container bounds.
fn check_bounds(name: &str, entry: &RgssEntry, container_len: u64) -> VfsResult<()> {
    let end = entry.offset.checked_add(entry.size);
    match end {
        Some(end) if end <= container_len => Ok(()),
        _ => Err(VfsError::corrupt(format!(
            "entry '{}' ({} bytes at {}) extends past end of archive ({} bytes)",
            name, entry.size, entry.offset, container_len
        ))),
    }
}

/// Validate a raw name length before reading the name.
fn check_name_len(len: u32) -> VfsResult<usize> {
    let len = len as usize;
    if len == 0 || len > MAX_PATH_LEN {
        return Err(VfsError::corrupt(format!("invalid entry name length {}", len)));
    }
    Ok(len)
}

/// Turn decrypted name bytes into a canonical virtual path.
fn decode_name(raw: &[u8]) -> VfsResult<String> {
    let name = String::from_utf8_lossy(raw).replace('\\', "/");
    sanitize(&name).map_err(|e| VfsError::corrupt(format!("bad entry name: {}", e)))
}

/// Map a truncated table read to a corrupt-archive error.
fn truncated(e: io::Error) -> VfsError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        VfsError::corrupt("truncated entry table")
    } else {
        VfsError::Io(e)
    }
}

/// Entry tree plus the container it indexes.
pub(crate) struct RgssArchive {
    io: Box<dyn ArchiveIo>,
    tree: EntryTree<RgssEntry>,
    extension: &'static str,
}

impl RgssArchive {
    fn new(io: Box<dyn ArchiveIo>, extension: &'static str) -> Self {
        Self {
            io,
            tree: EntryTree::new(),
            extension,
        }
    }

    fn insert(&mut self, name: String, entry: RgssEntry) {
        if !self.tree.insert_file(&name, entry) {
            debug!(archive = self.extension, entry = %name, "Skipping duplicate archive entry");
        }
    }
}

impl Archive for RgssArchive {
    fn enumerate(&self, dir: &str) -> Vec<ArchiveEntry> {
        self.tree.children(dir)
    }

    fn stat(&self, path: &str) -> Option<EntryKind> {
        self.tree.stat(path)
    }

    fn open_entry(&mut self, path: &str) -> io::Result<Box<dyn NativeFile>> {
        let entry = *self.tree.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {}", path))
        })?;

        let mut io = self.io.duplicate()?;
        io.seek(entry.offset)?;
        Ok(Box::new(RgssEntryReader {
            io,
            entry,
            pos: 0,
            magic: entry.magic,
        }))
    }

    fn tag(&self) -> BackendTag {
        BackendTag::Archive(self.extension)
    }
}

/// Decrypting reader over one entry, with its own container cursor.
struct RgssEntryReader {
    io: Box<dyn ArchiveIo>,
    entry: RgssEntry,
    pos: u64,
    magic: u32,
}

impl NativeFile for RgssEntryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.entry.size - self.pos;
        let want = (buf.len() as u64).min(remaining) as usize;
        if want == 0 {
            return Ok(0);
        }

        let n = self.io.read(&mut buf[..want])?;
        crypt(&mut buf[..n], self.pos, &mut self.magic);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        if offset > self.entry.size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {} past end of entry ({})", offset, self.entry.size),
            ));
        }

        self.io.seek(self.entry.offset + offset)?;
        self.magic = (0..offset / 4).fold(self.entry.magic, |m, _| advance_magic(m));
        self.pos = offset;
        Ok(())
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    fn length(&mut self) -> io::Result<u64> {
        Ok(self.entry.size)
    }
}

/// Recognize a header with the given version.
fn recognize_version(io: &mut dyn ArchiveIo, version: u8) -> io::Result<bool> {
    Ok(read_version(io)? == Some(version))
}

/// Parse a version-1 container.
fn open_v1(mut io: Box<dyn ArchiveIo>, extension: &'static str) -> VfsResult<Box<dyn Archive>> {
    if read_version(&mut *io)? != Some(1) {
        return Err(VfsError::corrupt("not a version 1 RGSS archive"));
    }
    let entries = v1::read_table(&mut *io)?;

    let mut archive = RgssArchive::new(io, extension);
    for (name, entry) in entries {
        archive.insert(name, entry);
    }
    debug!(archive = extension, entries = archive.tree.file_count(), "Opened RGSS archive");
    Ok(Box::new(archive))
}

/// RPG Maker XP archive (`.rgssad`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgss1Archiver;

impl Archiver for Rgss1Archiver {
    fn info(&self) -> ArchiverInfo {
        ArchiverInfo {
            extension: "rgssad",
            description: "RGSS encrypted archive (RPG Maker XP)",
        }
    }

    fn recognize(&self, io: &mut dyn ArchiveIo) -> io::Result<bool> {
        recognize_version(io, 1)
    }

    fn open(&self, io: Box<dyn ArchiveIo>) -> VfsResult<Box<dyn Archive>> {
        open_v1(io, self.info().extension)
    }
}

/// RPG Maker VX archive (`.rgss2a`). Same layout as `.rgssad`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgss2Archiver;

impl Archiver for Rgss2Archiver {
    fn info(&self) -> ArchiverInfo {
        ArchiverInfo {
            extension: "rgss2a",
            description: "RGSS2 encrypted archive (RPG Maker VX)",
        }
    }

    fn recognize(&self, io: &mut dyn ArchiveIo) -> io::Result<bool> {
        recognize_version(io, 1)
    }

    fn open(&self, io: Box<dyn ArchiveIo>) -> VfsResult<Box<dyn Archive>> {
        open_v1(io, self.info().extension)
    }
}

/// RPG Maker VX Ace archive (`.rgss3a`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgss3Archiver;

impl Archiver for Rgss3Archiver {
    fn info(&self) -> ArchiverInfo {
        ArchiverInfo {
            extension: "rgss3a",
            description: "RGSS3 encrypted archive (RPG Maker VX Ace)",
        }
    }

    fn recognize(&self, io: &mut dyn ArchiveIo) -> io::Result<bool> {
        recognize_version(io, 3)
    }

    fn open(&self, mut io: Box<dyn ArchiveIo>) -> VfsResult<Box<dyn Archive>> {
        let extension = self.info().extension;
        if read_version(&mut *io)? != Some(3) {
            return Err(VfsError::corrupt("not a version 3 RGSS archive"));
        }
        let entries = v3::read_table(&mut *io)?;

        let mut archive = RgssArchive::new(io, extension);
        for (name, entry) in entries {
            archive.insert(name, entry);
        }
        debug!(archive = extension, entries = archive.tree.file_count(), "Opened RGSS archive");
        Ok(Box::new(archive))
    }
}
