//! Lazy recursive traversal of the merged mount tree.
//!
//! [`Walk`] is the one traversal the crate has: the path cache builder and
//! the CLI listing both consume it. Entries come out in pre-order, with each
//! directory's children in merged mount order. A walk holds only a stack of
//! pending directory listings, so it is cheap to clone and restart.

use std::vec;

use crate::archive::{ArchiveEntry, EntryKind};
use crate::mount::MountTable;
use crate::path::join;

/// One visited entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full virtual path.
    pub path: String,

    /// Final path component.
    pub name: String,

    /// File or directory.
    pub kind: EntryKind,

    /// Nesting depth; children of the walk root are at depth 0.
    pub depth: usize,
}

#[derive(Clone)]
struct Frame {
    dir: String,
    depth: usize,
    entries: vec::IntoIter<ArchiveEntry>,
}

/// Pre-order iterator over every entry below a directory.
#[derive(Clone)]
pub struct Walk<'a> {
    table: &'a MountTable,
    stack: Vec<Frame>,
    max_depth: Option<usize>,
}

impl<'a> Walk<'a> {
    /// Start a walk at `root` (`""` for the union root).
    pub fn new(table: &'a MountTable, root: &str) -> Self {
        let frame = Frame {
            dir: root.to_string(),
            depth: 0,
            entries: table.read_dir(root).into_iter(),
        };
        Self {
            table,
            stack: vec![frame],
            max_depth: None,
        }
    }

    /// Do not descend into directories deeper than `depth`.
    ///
    /// With `0`, only the direct children of the root are yielded.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Only yield files.
    pub fn files(self) -> impl Iterator<Item = WalkEntry> + 'a {
        self.filter(|e| e.kind.is_file())
    }
}

impl Iterator for Walk<'_> {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };

            let depth = frame.depth;
            let path = join(&frame.dir, &entry.name);

            let descend = entry.kind.is_dir() && self.max_depth.map_or(true, |max| depth < max);
            if descend {
                let children = self.table.read_dir(&path);
                self.stack.push(Frame {
                    dir: path.clone(),
                    depth: depth + 1,
                    entries: children.into_iter(),
                });
            }

            return Some(WalkEntry {
                path,
                name: entry.name,
                kind: entry.kind,
                depth,
            });
        }
    }
}
