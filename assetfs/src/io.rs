//! Container-level random-access I/O.
//!
//! [`ArchiveIo`] is what an [`Archiver`](crate::Archiver) reads a container
//! through. It is smaller than `Read + Seek`: absolute seeks
//! only, an explicit length, and [`ArchiveIo::duplicate`] so a container can
//! hand every open entry its own cursor.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Random-access source for a mounted container.
pub trait ArchiveIo: Send {
    /// Read up to `buf.len()` bytes at the current offset.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move to an absolute offset.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Current absolute offset.
    fn tell(&mut self) -> io::Result<u64>;

    /// Total length in bytes.
    fn length(&mut self) -> io::Result<u64>;

    /// Produce an independent handle positioned at this handle's current offset.
    fn duplicate(&mut self) -> io::Result<Box<dyn ArchiveIo>>;

    /// Read exactly `buf.len()` bytes or fail with `UnexpectedEof`.
    fn read_exact(&mut self, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read(buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "unexpected end of container",
                    ))
                }
                Ok(n) => buf = &mut buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Read a little-endian `u32`.
    fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut word = [0u8; 4];
        self.read_exact(&mut word)?;
        Ok(u32::from_le_bytes(word))
    }
}

/// Container backed by a native file.
///
/// Duplicating reopens the file by path, so every duplicate has its own
/// OS-level cursor.
#[derive(Debug)]
pub struct FileIo {
    file: File,
    path: PathBuf,
}

impl FileIo {
    /// Open a file for container reads.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self { file, path })
    }

    /// Path this container was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveIo for FileIo {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn length(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn duplicate(&mut self) -> io::Result<Box<dyn ArchiveIo>> {
        let offset = self.tell()?;
        let mut dup = FileIo::open(&self.path)?;
        dup.seek(offset)?;
        Ok(Box::new(dup))
    }
}

/// Container backed by host-provided bytes.
///
/// Duplicates share the buffer and only copy the cursor.
#[derive(Debug, Clone)]
pub struct MemoryIo {
    data: Arc<[u8]>,
    pos: u64,
}

impl MemoryIo {
    /// Wrap a byte buffer.
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl ArchiveIo for MemoryIo {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.data.len() as u64;
        if self.pos >= len {
            return Ok(0);
        }
        let start = self.pos as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        if offset > self.data.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {} past end ({})", offset, self.data.len()),
            ));
        }
        self.pos = offset;
        Ok(())
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    fn length(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn duplicate(&mut self) -> io::Result<Box<dyn ArchiveIo>> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_memory_io_read_and_seek() {
        let mut io = MemoryIo::new(b"RGSSAD\0\x03".to_vec());
        let mut header = [0u8; 6];
        io.read_exact(&mut header).unwrap();
        assert_eq!(&header, b"RGSSAD");
        assert_eq!(io.tell().unwrap(), 6);

        io.seek(7).unwrap();
        let mut version = [0u8; 1];
        io.read_exact(&mut version).unwrap();
        assert_eq!(version[0], 3);
    }

    #[test]
    fn test_memory_io_seek_past_end_fails() {
        let mut io = MemoryIo::new(vec![0u8; 4]);
        assert!(io.seek(4).is_ok());
        assert!(io.seek(5).is_err());
    }

    #[test]
    fn test_memory_io_read_exact_eof() {
        let mut io = MemoryIo::new(vec![1u8, 2]);
        let err = io.read_u32_le().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_memory_io_duplicate_is_independent() {
        let mut io = MemoryIo::new(vec![1u8, 2, 3, 4, 5, 6, 7, 8]);
        io.seek(4).unwrap();

        let mut dup = io.duplicate().unwrap();
        assert_eq!(dup.tell().unwrap(), 4);

        dup.seek(0).unwrap();
        assert_eq!(io.tell().unwrap(), 4);
        assert_eq!(dup.read_u32_le().unwrap(), u32::from_le_bytes([1, 2, 3, 4]));
    }

    #[test]
    fn test_file_io_duplicate_restores_offset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Game.rgssad");
        fs::write(&path, b"0123456789").unwrap();

        let mut io = FileIo::open(&path).unwrap();
        io.seek(6).unwrap();

        let mut dup = io.duplicate().unwrap();
        assert_eq!(dup.tell().unwrap(), 6);

        let mut buf = [0u8; 4];
        dup.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"6789");

        // Original cursor is untouched
        assert_eq!(io.tell().unwrap(), 6);
        assert_eq!(io.length().unwrap(), 10);
    }

    #[test]
    fn test_file_io_open_missing() {
        assert!(FileIo::open("/nonexistent/Game.rgss3a").is_err());
    }
}
