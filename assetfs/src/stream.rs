//! Stream adapter between native entry handles and engine consumers.
//!
//! Every opened asset is handed out as a [`Stream`]: a wrapper around a
//! backend-specific [`NativeFile`] plus a [`BackendTag`] naming the backend
//! that produced it. Consumers (font loader, audio decoder, bitmap decoder)
//! only ever see the stream contract:
//!
//! | Operation        | Success                     | Failure                  |
//! |------------------|-----------------------------|--------------------------|
//! | `size`           | total byte length           | `Err`                    |
//! | `seek`           | new absolute offset         | `Err`, always if closed  |
//! | `read_elements`  | whole elements read         | `0`                      |
//! | `write_elements` | whole elements written      | `0` (archive entries)    |
//! | `close`          | native resource released    | `Err` if already closed  |
//!
//! `Stream` also implements `std::io::{Read, Seek, Write}` so standard
//! adapters (`BufReader`, `read_to_end`) work on it directly.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Native random-access handle for one opened entry.
pub trait NativeFile: Send {
    /// Read up to `buf.len()` bytes at the current offset.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes at the current offset.
    ///
    /// Entries are read-only unless the backend overrides this.
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(read_only_error())
    }

    /// Move to an absolute offset.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Current absolute offset.
    fn tell(&mut self) -> io::Result<u64>;

    /// Total length in bytes.
    fn length(&mut self) -> io::Result<u64>;
}

/// Identifies which backend produced a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendTag {
    /// A loose file inside a mounted directory or the write directory.
    Loose,

    /// An entry inside a mounted archive, named by archiver extension.
    Archive(&'static str),

    /// No backend: an unopened or freed wrapper.
    Detached,
}

impl fmt::Display for BackendTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendTag::Loose => write!(f, "loose"),
            BackendTag::Archive(ext) => write!(f, "archive:{}", ext),
            BackendTag::Detached => write!(f, "detached"),
        }
    }
}

/// Origin for a `Stream::seek` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Offset from the start.
    Set,
    /// Offset from the current position.
    Cur,
    /// Offset from the end.
    End,
}

/// Seekable stream over an opened asset.
///
/// The stream exclusively owns its native handle until [`Stream::close`] or
/// drop. Streams opened with `free_on_close` also drop their bookkeeping on
/// close and become detached; the others keep their path and tag so the
/// wrapper can be inspected or refilled in place.
pub struct Stream {
    handle: Option<Box<dyn NativeFile>>,
    tag: BackendTag,
    path: String,
    free_on_close: bool,
}

impl Stream {
    /// Wrap an opened native handle.
    pub fn new(handle: Box<dyn NativeFile>, tag: BackendTag, path: impl Into<String>) -> Self {
        Self {
            handle: Some(handle),
            tag,
            path: path.into(),
            free_on_close: false,
        }
    }

    /// An unopened wrapper. Every operation fails until it is filled.
    pub fn detached() -> Self {
        Self {
            handle: None,
            tag: BackendTag::Detached,
            path: String::new(),
            free_on_close: false,
        }
    }

    /// Set whether `close` also releases the wrapper's bookkeeping.
    pub fn with_free_on_close(mut self, free_on_close: bool) -> Self {
        self.free_on_close = free_on_close;
        self
    }

    /// Replace this wrapper's contents with another stream, closing any
    /// handle it still holds.
    pub fn refill(&mut self, other: Stream) {
        *self = other;
    }

    /// Whether a native handle is currently held.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Backend that produced this stream.
    pub fn tag(&self) -> BackendTag {
        self.tag
    }

    /// Real path the stream was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether `close` frees the wrapper's bookkeeping.
    pub fn frees_on_close(&self) -> bool {
        self.free_on_close
    }

    fn handle(&mut self) -> io::Result<&mut Box<dyn NativeFile>> {
        self.handle.as_mut().ok_or_else(closed_error)
    }

    /// Total byte length.
    pub fn size(&mut self) -> io::Result<u64> {
        self.handle()?.length()
    }

    /// Current absolute offset.
    pub fn tell(&mut self) -> io::Result<u64> {
        self.handle()?.tell()
    }

    /// Seek relative to `whence`, returning the new absolute offset.
    pub fn seek_to(&mut self, offset: i64, whence: Whence) -> io::Result<u64> {
        let handle = self.handle()?;
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => handle.tell()?,
            Whence::End => handle.length()?,
        };

        let target = i128::from(base) + i128::from(offset);
        let target = u64::try_from(target).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to negative offset {}", target),
            )
        })?;

        NativeFile::seek(&mut **handle, target)?;
        handle.tell()
    }

    /// Read up to `count` elements of `elem_size` bytes into `buf`.
    ///
    /// Returns the number of whole elements read. Any backend failure, a
    /// closed stream, or a zero element size yields `0`; a trailing partial
    /// element is not counted.
    pub fn read_elements(&mut self, buf: &mut [u8], elem_size: usize, count: usize) -> usize {
        let Some(total) = elem_size.checked_mul(count) else {
            return 0;
        };
        if total == 0 || buf.len() < total {
            return 0;
        }
        let Ok(handle) = self.handle() else {
            return 0;
        };

        let mut filled = 0;
        while filled < total {
            match NativeFile::read(&mut **handle, &mut buf[filled..total]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return 0,
            }
        }

        filled / elem_size
    }

    /// Write up to `count` elements of `elem_size` bytes from `buf`.
    ///
    /// Archive-backed streams always return `0`.
    pub fn write_elements(&mut self, buf: &[u8], elem_size: usize, count: usize) -> usize {
        let Some(total) = elem_size.checked_mul(count) else {
            return 0;
        };
        if total == 0 || buf.len() < total {
            return 0;
        }
        let Ok(handle) = self.handle() else {
            return 0;
        };

        let mut written = 0;
        while written < total {
            match NativeFile::write(&mut **handle, &buf[written..total]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return 0,
            }
        }

        written / elem_size
    }

    /// Read a single byte, `None` at end of stream or on failure.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.read_elements(&mut byte, 1, 1) {
            1 => Some(byte[0]),
            _ => None,
        }
    }

    /// Read everything from the current offset to the end.
    pub fn read_to_end_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Release the native resource.
    ///
    /// Fails if the stream was not open.
    pub fn close(&mut self) -> io::Result<()> {
        let handle = self.handle.take().ok_or_else(closed_error)?;
        drop(handle);

        if self.free_on_close {
            self.tag = BackendTag::Detached;
            self.path = String::new();
        }
        Ok(())
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("path", &self.path)
            .field("tag", &self.tag)
            .field("open", &self.is_open())
            .field("free_on_close", &self.free_on_close)
            .finish()
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let handle = self.handle()?;
        NativeFile::read(&mut **handle, buf)
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Start(offset) => {
                let handle = self.handle()?;
                NativeFile::seek(&mut **handle, offset)?;
                handle.tell()
            }
            SeekFrom::Current(offset) => self.seek_to(offset, Whence::Cur),
            SeekFrom::End(offset) => self.seek_to(offset, Whence::End),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let handle = self.handle()?;
        NativeFile::write(&mut **handle, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "stream is closed")
}

pub(crate) fn read_only_error() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "entry is read-only")
}
