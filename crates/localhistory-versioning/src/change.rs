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
//! Reversible changes over the entry tree
//!
//! Every change is built with its forward parameters only. `apply` performs
//! it and records what `revert` needs to undo it exactly; `revert` consumes
//! that record. Applying twice or reverting an unapplied change fails with
//! [`HistoryError::InvalidState`] and leaves the tree untouched.

use crate::entry::{EntryId, EntrySnapshot, RootEntry};
use crate::error::{HistoryError, HistoryResult};
use localhistory_storage::ContentHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recorded structural or content operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    /// File creation
    CreateFile(CreateFileChange),
    /// Directory creation
    CreateDirectory(CreateDirectoryChange),
    /// New content for an existing file
    ChangeFileContent(ContentChange),
    /// Rename within the same parent
    Rename(RenameChange),
    /// Move to another parent
    Move(MoveChange),
    /// Removal of an entry and its subtree
    Delete(DeleteChange),
}

impl Change {
    /// Create a file with optional content
    pub fn create_file(
        id: EntryId,
        path: impl Into<String>,
        content: Option<ContentHandle>,
        timestamp: i64,
    ) -> Self {
        Change::CreateFile(CreateFileChange {
            id,
            path: path.into(),
            content,
            timestamp,
            applied: false,
        })
    }

    /// Create an empty directory
    pub fn create_directory(id: EntryId, path: impl Into<String>) -> Self {
        Change::CreateDirectory(CreateDirectoryChange {
            id,
            path: path.into(),
            applied: false,
        })
    }

    /// Replace a file's content and timestamp
    pub fn change_content(
        path: impl Into<String>,
        content: Option<ContentHandle>,
        timestamp: i64,
    ) -> Self {
        Change::ChangeFileContent(ContentChange {
            path: path.into(),
            new_content: content,
            new_timestamp: timestamp,
            undo: None,
        })
    }

    /// Rename the entry at `path` to `new_name`
    pub fn rename(path: impl Into<String>, new_name: impl Into<String>) -> Self {
        Change::Rename(RenameChange {
            path: path.into(),
            new_name: new_name.into(),
            undo: None,
        })
    }

    /// Move the entry at `path` under `new_parent`
    pub fn move_to(path: impl Into<String>, new_parent: impl Into<String>) -> Self {
        Change::Move(MoveChange {
            path: path.into(),
            new_parent: new_parent.into(),
            undo: None,
        })
    }

    /// Delete the entry at `path` with everything below it
    pub fn delete(path: impl Into<String>) -> Self {
        Change::Delete(DeleteChange {
            path: path.into(),
            undo: None,
        })
    }

    /// Perform the change, recording its undo state
    pub fn apply(&mut self, root: &mut RootEntry) -> HistoryResult<()> {
        if self.is_applied() {
            return Err(HistoryError::invalid_state(format!("already applied: {self}")));
        }
        match self {
            Change::CreateFile(change) => {
                root.create_file(change.id, &change.path, change.content, change.timestamp)?;
                change.applied = true;
            }
            Change::CreateDirectory(change) => {
                root.create_directory(change.id, &change.path)?;
                change.applied = true;
            }
            Change::ChangeFileContent(change) => {
                let (content, timestamp) =
                    root.set_content(&change.path, change.new_content, change.new_timestamp)?;
                change.undo = Some(ContentUndo { content, timestamp });
            }
            Change::Rename(change) => {
                let moved = root.rename_entry(&change.path, &change.new_name)?;
                change.undo = Some(RelocationUndo::from(moved));
            }
            Change::Move(change) => {
                let moved = root.reparent_entry(&change.path, &change.new_parent)?;
                change.undo = Some(RelocationUndo::from(moved));
            }
            Change::Delete(change) => {
                let (parent, entry) = root.remove_child(&change.path)?;
                change.undo = Some(DeletedEntry {
                    parent,
                    snapshot: EntrySnapshot::capture(&entry),
                });
            }
        }
        Ok(())
    }

    /// Undo the change using the state recorded by `apply`
    pub fn revert(&mut self, root: &mut RootEntry) -> HistoryResult<()> {
        if !self.is_applied() {
            return Err(HistoryError::invalid_state(format!("not applied: {self}")));
        }
        match self {
            Change::CreateFile(CreateFileChange {
                id, path, applied, ..
            })
            | Change::CreateDirectory(CreateDirectoryChange { id, path, applied }) => {
                let found = root.get_entry(path.as_str())?.id();
                if found != *id {
                    return Err(HistoryError::invalid_state(format!(
                        "{path} carries id {found}, expected {id}"
                    )));
                }
                root.remove_child(path.as_str())?;
                *applied = false;
            }
            Change::ChangeFileContent(change) => {
                if let Some(undo) = &change.undo {
                    root.set_content(&change.path, undo.content, undo.timestamp)?;
                }
                change.undo = None;
            }
            Change::Rename(RenameChange { undo, .. }) | Change::Move(MoveChange { undo, .. }) => {
                if let Some(state) = undo.as_ref() {
                    root.relocate(&state.new_path, state.old_parent.as_deref(), &state.old_name)?;
                }
                *undo = None;
            }
            Change::Delete(change) => {
                if let Some(undo) = &change.undo {
                    root.add_child(undo.parent.as_deref(), undo.snapshot.restore())?;
                }
                change.undo = None;
            }
        }
        Ok(())
    }

    /// True between a successful `apply` and the matching `revert`
    pub fn is_applied(&self) -> bool {
        match self {
            Change::CreateFile(change) => change.applied,
            Change::CreateDirectory(change) => change.applied,
            Change::ChangeFileContent(change) => change.undo.is_some(),
            Change::Rename(change) => change.undo.is_some(),
            Change::Move(change) => change.undo.is_some(),
            Change::Delete(change) => change.undo.is_some(),
        }
    }

    /// Path the change addresses when applied
    pub fn path(&self) -> &str {
        match self {
            Change::CreateFile(change) => &change.path,
            Change::CreateDirectory(change) => &change.path,
            Change::ChangeFileContent(change) => &change.path,
            Change::Rename(change) => &change.path,
            Change::Move(change) => &change.path,
            Change::Delete(change) => &change.path,
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Change::CreateFile(_) => "create-file",
            Change::CreateDirectory(_) => "create-directory",
            Change::ChangeFileContent(_) => "change-content",
            Change::Rename(_) => "rename",
            Change::Move(_) => "move",
            Change::Delete(_) => "delete",
        }
    }

    /// Content handles only the undo state refers to
    ///
    /// Once the change can no longer be reverted these payloads are garbage.
    pub fn undo_content(&self) -> Vec<ContentHandle> {
        let mut out = Vec::new();
        match self {
            Change::ChangeFileContent(ContentChange {
                undo: Some(undo), ..
            }) => out.extend(undo.content),
            Change::Delete(DeleteChange {
                undo: Some(undo), ..
            }) => undo.snapshot.content_handles(&mut out),
            _ => {}
        }
        out
    }

    /// Every content handle the change refers to, forward or undo
    pub fn content_handles(&self) -> Vec<ContentHandle> {
        let mut out = self.undo_content();
        match self {
            Change::CreateFile(change) => out.extend(change.content),
            Change::ChangeFileContent(change) => out.extend(change.new_content),
            _ => {}
        }
        out
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Rename(change) => write!(f, "rename {} -> {}", change.path, change.new_name),
            Change::Move(change) => write!(f, "move {} -> {}", change.path, change.new_parent),
            other => write!(f, "{} {}", other.kind(), other.path()),
        }
    }
}

/// Forward parameters of a file creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFileChange {
    /// Id given to the new file
    pub id: EntryId,
    /// Path of the new file
    pub path: String,
    /// Initial content
    pub content: Option<ContentHandle>,
    /// Initial timestamp
    pub timestamp: i64,
    applied: bool,
}

/// Forward parameters of a directory creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDirectoryChange {
    /// Id given to the new directory
    pub id: EntryId,
    /// Path of the new directory
    pub path: String,
    applied: bool,
}

/// Content replacement with the previous content as undo state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    /// File whose content changes
    pub path: String,
    /// Content after the change
    pub new_content: Option<ContentHandle>,
    /// Timestamp after the change
    pub new_timestamp: i64,
    undo: Option<ContentUndo>,
}

impl ContentChange {
    /// Content and timestamp before the change, once applied
    pub fn old_content(&self) -> Option<(Option<ContentHandle>, i64)> {
        self.undo.as_ref().map(|undo| (undo.content, undo.timestamp))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentUndo {
    content: Option<ContentHandle>,
    timestamp: i64,
}

/// Rename with the previous name as undo state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameChange {
    /// Entry to rename
    pub path: String,
    /// New last segment
    pub new_name: String,
    undo: Option<RelocationUndo>,
}

/// Move with the previous parent as undo state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveChange {
    /// Entry to move
    pub path: String,
    /// Directory receiving the entry
    pub new_parent: String,
    undo: Option<RelocationUndo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RelocationUndo {
    old_parent: Option<String>,
    old_name: String,
    new_path: String,
}

impl From<crate::entry::Relocation> for RelocationUndo {
    fn from(moved: crate::entry::Relocation) -> Self {
        RelocationUndo {
            old_parent: moved.old_parent,
            old_name: moved.old_name,
            new_path: moved.new_path,
        }
    }
}

/// Deletion with a snapshot of the removed subtree as undo state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteChange {
    /// Entry to delete
    pub path: String,
    undo: Option<DeletedEntry>,
}

impl DeleteChange {
    /// Snapshot of the removed subtree, once applied
    pub fn snapshot(&self) -> Option<&EntrySnapshot> {
        self.undo.as_ref().map(|undo| &undo.snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DeletedEntry {
    parent: Option<String>,
    snapshot: EntrySnapshot,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn handle(raw: u32) -> Option<ContentHandle> {
        Some(ContentHandle::from_raw(raw))
    }

    fn tree() -> RootEntry {
        let mut root = RootEntry::new();
        root.create_directory(EntryId(1), "dir1").unwrap();
        root.create_directory(EntryId(2), "dir1/dir2").unwrap();
        root.create_file(EntryId(3), "dir1/dir2/file", handle(1), -1)
            .unwrap();
        root
    }

    #[test]
    fn test_apply_twice_rejected() {
        let mut root = RootEntry::new();
        let mut change = Change::create_file(EntryId(1), "file", None, 0);
        change.apply(&mut root).unwrap();
        assert!(matches!(
            change.apply(&mut root),
            Err(HistoryError::InvalidState(_))
        ));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_revert_before_apply_rejected() {
        let mut root = tree();
        let before = root.clone();
        let mut change = Change::delete("dir1");
        assert!(matches!(
            change.revert(&mut root),
            Err(HistoryError::InvalidState(_))
        ));
        assert_eq!(root, before);
    }

    #[test]
    fn test_content_change_roundtrip() {
        let mut root = tree();
        let mut change = Change::change_content("dir1/dir2/file", handle(2), 50);
        change.apply(&mut root).unwrap();

        let file = root.get_entry("dir1/dir2/file").unwrap().as_file().unwrap();
        assert_eq!((file.content, file.timestamp), (handle(2), 50));
        assert_eq!(change.undo_content(), vec![ContentHandle::from_raw(1)]);

        change.revert(&mut root).unwrap();
        assert_eq!(root, tree());
        assert!(change.undo_content().is_empty());
    }

    #[test]
    fn test_move_roundtrip() {
        let mut root = tree();
        root.create_directory(EntryId(4), "other").unwrap();
        let before = root.clone();

        let mut change = Change::move_to("dir1/dir2", "other");
        change.apply(&mut root).unwrap();
        assert_eq!(root.path_of(EntryId(3)).unwrap(), "other/dir2/file");

        change.revert(&mut root).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_move_top_level_root_and_back() {
        let mut root = RootEntry::new();
        root.create_directory(EntryId(1), "c:/dir/root").unwrap();
        root.create_directory(EntryId(2), "d:/target").unwrap();
        let before = root.clone();

        let mut change = Change::move_to("c:/dir/root", "d:/target");
        change.apply(&mut root).unwrap();
        assert_eq!(root.path_of(EntryId(1)).unwrap(), "d:/target/root");

        change.revert(&mut root).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_failed_apply_leaves_change_unapplied() {
        let mut root = tree();
        let mut change = Change::rename("dir1/missing", "x");
        assert!(change.apply(&mut root).unwrap_err().is_not_found());
        assert!(!change.is_applied());
    }

    #[test]
    fn test_revert_create_checks_identity() {
        let mut root = RootEntry::new();
        let mut change = Change::create_directory(EntryId(1), "dir");
        change.apply(&mut root).unwrap();

        let mut other = RootEntry::new();
        other.create_directory(EntryId(7), "dir").unwrap();
        assert!(matches!(
            change.revert(&mut other),
            Err(HistoryError::InvalidState(_))
        ));
        assert!(other.has_entry("dir"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Change::rename("a/b", "c").to_string(), "rename a/b -> c");
        assert_eq!(Change::delete("a").to_string(), "delete a");
    }
}
