// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Local history engine
//!
//! Records what happens to a file tree as a log of reversible changes and
//! can walk that log backwards and forwards:
//!
//! - [`RootEntry`]: in-memory tree of files and directories with stable ids,
//!   supporting multi-segment top-level roots such as `c:/dir/root`
//! - [`Change`]: create, delete, rename, move and content changes, each
//!   carrying the state needed to undo it exactly
//! - [`ChangeList`]: the log, grouped into [`ChangeSet`]s by host commands,
//!   with checkpoints, purge, per-file revisions and persistence
//! - [`diff`](diff()): minimal LCS line diff producing a [`Hunk`] chain
//! - [`SelectionCalculator`]: projects a line range of the latest revision
//!   onto older revisions, caching every step
//! - [`LocalHistory`]: facade owning tree, log and content storage
//!
//! # Examples
//!
//! ```
//! use localhistory_versioning::{diff, Change, ChangeList, EntryId, RootEntry};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut root = RootEntry::new();
//! let mut log = ChangeList::new();
//! log.apply_change(&mut root, Change::create_directory(EntryId(1), "dir1"))?;
//! log.apply_change(&mut root, Change::create_directory(EntryId(2), "dir1/dir2"))?;
//!
//! let checkpoint = log.put_checkpoint();
//! log.apply_change(&mut root, Change::delete("dir1"))?;
//! assert!(!root.has_entry("dir1/dir2"));
//!
//! log.revert_to_that_state(&mut root, checkpoint)?;
//! assert_eq!(root.get_entry("dir1/dir2")?.id(), EntryId(2));
//!
//! let hunks = diff(&["1", "2", "3"], &["a", "2", "b"], 100)?;
//! assert_eq!(hunks.map(|h| h.len()), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! One thread mutates a history at a time; nothing here locks. Callers that
//! share a history wrap it themselves.

mod block;
mod change;
mod change_list;
mod change_set;
mod diff;
mod entry;
mod error;
mod history;
mod path;
mod revision;
mod selection;

pub use block::{tokenize, Block};
pub use change::{
    Change, ContentChange, CreateDirectoryChange, CreateFileChange, DeleteChange, MoveChange,
    RenameChange,
};
pub use change_list::{now_millis, ChangeList, Checkpoint, PurgeReport};
pub use change_set::ChangeSet;
pub use diff::{apply_hunks, diff, Hunk, HunkIter, DEFAULT_MAX_EDIT_COST};
pub use entry::{
    DirectoryEntry, Entry, EntryId, EntrySnapshot, FileEntry, RootEntry, SnapshotKind,
    UNKNOWN_TIMESTAMP,
};
pub use error::{DiffError, DiffResult, HistoryError, HistoryResult};
pub use history::LocalHistory;
pub use revision::Revision;
pub use selection::SelectionCalculator;
