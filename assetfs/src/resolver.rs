//! Extension-supplementing lookup.
//!
//! Asset references in game data usually omit the extension: a script asks
//! for `Graphics/Titles/Title` and the engine has to find `Title.png` (or
//! `Title.jpg`, or `Title.bmp`). [`open_read`] lists the requested
//! directory, keeps every candidate whose name is the requested base name
//! followed by nothing or by `.`, and offers them one by one to an
//! [`OpenHandler`] until one is claimed.
//!
//! ```text
//! request "Graphics/Titles/Title"
//!            │
//!            ├─ dir  = "Graphics/Titles"
//!            └─ base = "Title"
//!
//! candidates          prefix match   handler
//! Title.png           yes            try_read(stream, Some("png")) -> false
//! Title2.png          no             -
//! Title.jpg           yes            try_read(stream, Some("jpg")) -> true  ✓
//! ```
//!
//! With a [`PathCache`] the request is lower-cased and candidates come from
//! the cache; without one they come from a live listing of the mount tree.
//! A candidate the listing reported but the owning mount cannot open aborts
//! the whole lookup.

use tracing::{debug, trace, warn};

use crate::cache::PathCache;
use crate::error::{VfsError, VfsResult};
use crate::mount::MountTable;
use crate::path::{find_ext, join, lowercase, sanitize, split_dir_base};
use crate::stream::Stream;

/// Caller-supplied acceptance test for a located candidate.
///
/// The handler takes ownership of the stream. Returning `true` claims the
/// match and ends the lookup; returning `false` moves on to the next
/// candidate.
pub trait OpenHandler {
    /// Inspect a candidate and its extension (`None` when it has none).
    fn try_read(&mut self, stream: Stream, ext: Option<&str>) -> bool;
}

impl<F> OpenHandler for F
where
    F: FnMut(Stream, Option<&str>) -> bool,
{
    fn try_read(&mut self, stream: Stream, ext: Option<&str>) -> bool {
        self(stream, ext)
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Real path of the claimed entry.
    pub path: String,

    /// Extension observed by the handler.
    pub extension: Option<String>,

    /// Number of candidates offered to the handler, including the claimed one.
    pub attempts: usize,
}

/// Check whether `candidate` names `base` with or without an extension.
///
/// ```
/// use assetfs::resolver::prefix_match;
///
/// assert!(prefix_match("Title.png", "Title"));
/// assert!(prefix_match("Title", "Title"));
/// assert!(!prefix_match("Title2.png", "Title"));
/// assert!(!prefix_match("Titl", "Title"));
/// ```
pub fn prefix_match(candidate: &str, base: &str) -> bool {
    let candidate = candidate.as_bytes();
    candidate.starts_with(base.as_bytes())
        && matches!(candidate.get(base.len()), None | Some(b'.'))
}

/// Per-call lookup state.
struct OpenReadContext<'a> {
    request: &'a str,
    dir: &'a str,
    base: &'a str,
    attempts: usize,
}

impl<'a> OpenReadContext<'a> {
    /// Offer one candidate to the handler.
    ///
    /// `Ok(Some(..))` when claimed, `Ok(None)` when rejected or not a
    /// prefix match.
    fn offer<H: OpenHandler + ?Sized>(
        &mut self,
        table: &mut MountTable,
        cache: Option<&PathCache>,
        candidate: &str,
        handler: &mut H,
    ) -> VfsResult<Option<Resolved>> {
        if !prefix_match(candidate, self.base) {
            return Ok(None);
        }

        let listed = join(self.dir, candidate);
        let real = match cache {
            Some(cache) => cache
                .real_path(&listed)
                .map(str::to_string)
                .ok_or_else(|| VfsError::Backend {
                    path: listed.clone(),
                    message: "listed in path cache without a real path".to_string(),
                })?,
            None => listed,
        };

        let stream = table.open(&real).map_err(|e| {
            warn!(request = %self.request, path = %real, error = %e, "Indexed entry could not be opened");
            match e {
                VfsError::NotFound { path } => VfsError::Backend {
                    path,
                    message: "entry listed but missing from every mount".to_string(),
                },
                other => other,
            }
        })?;

        let ext = find_ext(candidate);
        self.attempts += 1;
        trace!(request = %self.request, path = %real, ext = ?ext, attempt = self.attempts, "Offering candidate");

        if handler.try_read(stream, ext) {
            return Ok(Some(Resolved {
                path: real,
                extension: ext.map(str::to_string),
                attempts: self.attempts,
            }));
        }
        Ok(None)
    }
}

/// Open `filename`, discovering its extension.
///
/// Fails with [`VfsError::NoFile`] when no candidate was claimed, and with
/// [`VfsError::Backend`] when a listed candidate cannot be opened.
pub fn open_read<H: OpenHandler + ?Sized>(
    table: &mut MountTable,
    cache: Option<&PathCache>,
    filename: &str,
    handler: &mut H,
) -> VfsResult<Resolved> {
    let sanitized = sanitize(filename)?;
    let request = match cache {
        Some(cache) => lowercase(&cache.normalization().apply(&sanitized)),
        None => sanitized,
    };
    let (dir, base) = split_dir_base(&request);

    let candidates: Vec<String> = match cache {
        Some(cache) => cache.files_in(dir).map(<[String]>::to_vec).unwrap_or_default(),
        None => table
            .read_dir(dir)
            .into_iter()
            .filter(|e| e.kind.is_file())
            .map(|e| e.name)
            .collect(),
    };

    let mut ctx = OpenReadContext {
        request: &request,
        dir,
        base,
        attempts: 0,
    };

    for candidate in &candidates {
        if let Some(resolved) = ctx.offer(table, cache, candidate, handler)? {
            debug!(request = %filename, path = %resolved.path, attempts = resolved.attempts, "Resolved");
            return Ok(resolved);
        }
    }

    debug!(request = %filename, attempts = ctx.attempts, "No candidate claimed");
    Err(VfsError::NoFile {
        name: filename.to_string(),
    })
}
