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
//! Versioned entry tree
//!
//! A [`RootEntry`] holds one or more top-level entries. Top-level names may
//! span several segments (`c:/dir/root`); every entry below them is keyed by
//! a single segment. Paths resolve against the longest top-level name that
//! prefixes them on a segment boundary.
//!
//! Entries carry a stable [`EntryId`]. Renames and moves detach a node and
//! attach it elsewhere, so ids and whole subtrees survive them untouched.

use crate::error::{HistoryError, HistoryResult};
use crate::path;
use localhistory_storage::ContentHandle;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Timestamp value meaning "unknown"
pub const UNKNOWN_TIMESTAMP: i64 = -1;

/// Stable identity of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// File node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Stable id
    pub id: EntryId,
    /// Path segment, or the full name for a top-level file
    pub name: String,
    /// Stored content, `None` when the file has no recorded content
    pub content: Option<ContentHandle>,
    /// Modification time, [`UNKNOWN_TIMESTAMP`] if unknown
    pub timestamp: i64,
}

/// Directory node owning its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Stable id
    pub id: EntryId,
    /// Path segment, or the full root name for a top-level directory
    pub name: String,
    /// Modification time, [`UNKNOWN_TIMESTAMP`] if unknown
    pub timestamp: i64,
    children: BTreeMap<String, Entry>,
}

impl DirectoryEntry {
    /// Empty directory
    pub fn new(id: EntryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            timestamp: UNKNOWN_TIMESTAMP,
            children: BTreeMap::new(),
        }
    }

    /// Children ordered by name
    pub fn children(&self) -> impl Iterator<Item = &Entry> {
        self.children.values()
    }

    /// Child with the given name
    pub fn child(&self, name: &str) -> Option<&Entry> {
        self.children.get(name)
    }
}

/// Node of the entry tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// File node
    File(FileEntry),
    /// Directory node
    Directory(DirectoryEntry),
}

impl Entry {
    /// Stable id
    pub fn id(&self) -> EntryId {
        match self {
            Entry::File(file) => file.id,
            Entry::Directory(dir) => dir.id,
        }
    }

    /// Name under its parent
    pub fn name(&self) -> &str {
        match self {
            Entry::File(file) => &file.name,
            Entry::Directory(dir) => &dir.name,
        }
    }

    /// Modification time
    pub fn timestamp(&self) -> i64 {
        match self {
            Entry::File(file) => file.timestamp,
            Entry::Directory(dir) => dir.timestamp,
        }
    }

    /// True for directories
    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    /// File view
    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Entry::File(file) => Some(file),
            Entry::Directory(_) => None,
        }
    }

    /// Directory view
    pub fn as_directory(&self) -> Option<&DirectoryEntry> {
        match self {
            Entry::Directory(dir) => Some(dir),
            Entry::File(_) => None,
        }
    }

    /// Content handle of a file, `None` for directories and empty files
    pub fn content(&self) -> Option<ContentHandle> {
        self.as_file().and_then(|file| file.content)
    }

    /// Number of entries in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        match self {
            Entry::File(_) => 1,
            Entry::Directory(dir) => 1 + dir.children().map(Entry::subtree_len).sum::<usize>(),
        }
    }

    fn set_name(&mut self, name: String) {
        match self {
            Entry::File(file) => file.name = name,
            Entry::Directory(dir) => dir.name = name,
        }
    }

    fn collect_ids(&self, out: &mut Vec<EntryId>) {
        out.push(self.id());
        if let Entry::Directory(dir) = self {
            for child in dir.children() {
                child.collect_ids(out);
            }
        }
    }

    pub(crate) fn collect_content(&self, out: &mut Vec<ContentHandle>) {
        match self {
            Entry::File(file) => out.extend(file.content),
            Entry::Directory(dir) => {
                for child in dir.children() {
                    child.collect_content(out);
                }
            }
        }
    }

    fn descend(&self, segments: &[&str]) -> Option<&Entry> {
        let mut current = self;
        for segment in segments {
            current = current.as_directory()?.children.get(*segment)?;
        }
        Some(current)
    }

    fn descend_mut(&mut self, segments: &[&str]) -> Option<&mut Entry> {
        let mut current = self;
        for segment in segments {
            current = match current {
                Entry::Directory(dir) => dir.children.get_mut(*segment)?,
                Entry::File(_) => return None,
            };
        }
        Some(current)
    }

    fn path_of(&self, id: EntryId, path: &str) -> Option<String> {
        if self.id() == id {
            return Some(path.to_string());
        }
        let dir = self.as_directory()?;
        dir.children
            .iter()
            .find_map(|(name, child)| child.path_of(id, &path::join(path, name)))
    }

    fn walk(&self, path: &str, visit: &mut dyn FnMut(&str, &Entry)) {
        visit(path, self);
        if let Entry::Directory(dir) = self {
            for (name, child) in &dir.children {
                child.walk(&path::join(path, name), visit);
            }
        }
    }
}

/// Reconstruction record of a removed subtree
///
/// Captures ids, names, timestamps and content handles so the subtree can be
/// rebuilt exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    /// Id of the captured entry
    pub id: EntryId,
    /// Name of the captured entry
    pub name: String,
    /// Timestamp of the captured entry
    pub timestamp: i64,
    /// File content or directory children
    pub kind: SnapshotKind,
}

/// Payload of an [`EntrySnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// Captured file
    File {
        /// Content handle at capture time
        content: Option<ContentHandle>,
    },
    /// Captured directory
    Directory {
        /// Children in name order
        children: Vec<EntrySnapshot>,
    },
}

impl EntrySnapshot {
    /// Record an entry and everything below it
    pub fn capture(entry: &Entry) -> Self {
        let kind = match entry {
            Entry::File(file) => SnapshotKind::File {
                content: file.content,
            },
            Entry::Directory(dir) => SnapshotKind::Directory {
                children: dir.children().map(EntrySnapshot::capture).collect(),
            },
        };
        EntrySnapshot {
            id: entry.id(),
            name: entry.name().to_string(),
            timestamp: entry.timestamp(),
            kind,
        }
    }

    /// Rebuild the recorded subtree
    pub fn restore(&self) -> Entry {
        match &self.kind {
            SnapshotKind::File { content } => Entry::File(FileEntry {
                id: self.id,
                name: self.name.clone(),
                content: *content,
                timestamp: self.timestamp,
            }),
            SnapshotKind::Directory { children } => Entry::Directory(DirectoryEntry {
                id: self.id,
                name: self.name.clone(),
                timestamp: self.timestamp,
                children: children
                    .iter()
                    .map(|child| (child.name.clone(), child.restore()))
                    .collect(),
            }),
        }
    }

    /// Content handles referenced anywhere in the record
    pub fn content_handles(&self, out: &mut Vec<ContentHandle>) {
        match &self.kind {
            SnapshotKind::File { content } => out.extend(*content),
            SnapshotKind::Directory { children } => {
                for child in children {
                    child.content_handles(out);
                }
            }
        }
    }
}

/// Where a relocated entry came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relocation {
    pub old_parent: Option<String>,
    pub old_name: String,
    pub new_path: String,
}

/// Tree of top-level entries with an id index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootEntry {
    roots: BTreeMap<String, Entry>,
    ids: HashSet<EntryId>,
}

impl RootEntry {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level entries ordered by name
    pub fn roots(&self) -> impl Iterator<Item = &Entry> {
        self.roots.values()
    }

    /// Number of entries in the tree
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the tree holds no entry
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// True when some entry carries `id`
    pub fn contains_id(&self, id: EntryId) -> bool {
        self.ids.contains(&id)
    }

    /// Largest id in the tree
    pub fn max_id(&self) -> Option<EntryId> {
        self.ids.iter().max().copied()
    }

    /// Insert a file
    ///
    /// A single-segment path that falls under no top-level entry creates a
    /// top-level file.
    pub fn create_file(
        &mut self,
        id: EntryId,
        path: &str,
        content: Option<ContentHandle>,
        timestamp: i64,
    ) -> HistoryResult<()> {
        let entry = Entry::File(FileEntry {
            id,
            name: String::new(),
            content,
            timestamp,
        });
        self.create(entry, path)
    }

    /// Insert an empty directory
    ///
    /// A path that falls under no top-level entry becomes a new top-level
    /// directory carrying the full path as its name.
    pub fn create_directory(&mut self, id: EntryId, path: &str) -> HistoryResult<()> {
        self.create(Entry::Directory(DirectoryEntry::new(id, "")), path)
    }

    fn create(&mut self, mut entry: Entry, path: &str) -> HistoryResult<()> {
        let path = path::normalize(path);
        if path.is_empty() {
            return Err(HistoryError::invalid_state("empty path"));
        }
        if self.find_entry(&path).is_some() {
            return Err(HistoryError::exists(path));
        }

        let parent = match self.locate(&path) {
            Some((_, segments)) if !segments.is_empty() => {
                let (parent, name) = path::split_last(&path);
                entry.set_name(name.to_string());
                parent.map(str::to_string)
            }
            _ if entry.is_directory() || !path.contains('/') => {
                entry.set_name(path.clone());
                None
            }
            _ => return Err(HistoryError::ParentNotFound(path)),
        };

        self.add_child(parent.as_deref(), entry).map(|_| ())
    }

    /// True when `path` resolves to an entry
    pub fn has_entry(&self, path: &str) -> bool {
        self.find_entry(path).is_some()
    }

    /// Entry at `path`, failing when absent
    pub fn get_entry(&self, path: &str) -> HistoryResult<&Entry> {
        self.find_entry(path)
            .ok_or_else(|| HistoryError::not_found(path::normalize(path)))
    }

    /// Entry at `path`, `None` when absent
    pub fn find_entry(&self, path: &str) -> Option<&Entry> {
        let path = path::normalize(path);
        let (key, segments) = self.locate(&path)?;
        self.roots.get(key)?.descend(&segments)
    }

    fn find_entry_mut(&mut self, path: &str) -> Option<&mut Entry> {
        let (key, segments) = self.locate(path)?;
        let key = key.to_string();
        self.roots.get_mut(&key)?.descend_mut(&segments)
    }

    /// Current path of the entry carrying `id`
    pub fn path_of(&self, id: EntryId) -> Option<String> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.roots
            .iter()
            .find_map(|(key, entry)| entry.path_of(id, key))
    }

    /// Entry carrying `id`
    pub fn find_by_id(&self, id: EntryId) -> Option<&Entry> {
        self.path_of(id).and_then(|path| self.find_entry(&path))
    }

    /// Visit every entry with its path, parents before children
    pub fn walk(&self, mut visit: impl FnMut(&str, &Entry)) {
        for (key, entry) in &self.roots {
            entry.walk(key, &mut visit);
        }
    }

    /// Content handles referenced by the tree
    pub fn content_handles(&self) -> Vec<ContentHandle> {
        let mut out = Vec::new();
        for entry in self.roots.values() {
            entry.collect_content(&mut out);
        }
        out
    }

    /// Longest top-level name containing `path`, with the remaining segments
    fn locate<'p>(&self, path: &'p str) -> Option<(&str, Vec<&'p str>)> {
        let key = self
            .roots
            .keys()
            .filter(|key| path::is_within(path, key))
            .max_by_key(|key| key.len())?;
        let segments = path::relative_segments(path, key)?;
        Some((key.as_str(), segments))
    }

    fn is_top_level(&self, path: &str) -> bool {
        self.roots.contains_key(path)
    }

    /// Attach `entry` under `parent` (or at top level), returning its path
    pub(crate) fn add_child(&mut self, parent: Option<&str>, entry: Entry) -> HistoryResult<String> {
        self.try_attach(parent, entry).map_err(|(err, _)| err)
    }

    /// Attach, handing the entry back on failure so callers can restore it
    fn try_attach(
        &mut self,
        parent: Option<&str>,
        entry: Entry,
    ) -> Result<String, (HistoryError, Entry)> {
        let name = entry.name().to_string();
        let target = match parent {
            Some(parent) => path::join(parent, &name),
            None => name.clone(),
        };

        if name.is_empty() || (parent.is_some() && !path::is_valid_name(&name)) {
            return Err((
                HistoryError::invalid_state(format!("invalid entry name '{name}'")),
                entry,
            ));
        }

        let mut ids = Vec::with_capacity(entry.subtree_len());
        entry.collect_ids(&mut ids);
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids
            .iter()
            .find(|id| self.ids.contains(*id) || !seen.insert(**id))
        {
            return Err((HistoryError::DuplicateId(*dup), entry));
        }

        match parent {
            Some(parent) => {
                let dir = match self.find_entry_mut(parent) {
                    Some(Entry::Directory(dir)) => dir,
                    Some(Entry::File(_)) => {
                        return Err((HistoryError::NotADirectory(parent.to_string()), entry))
                    }
                    None => return Err((HistoryError::ParentNotFound(target), entry)),
                };
                if dir.children.contains_key(&name) {
                    return Err((HistoryError::exists(target), entry));
                }
                dir.children.insert(name, entry);
            }
            None => {
                if self.roots.contains_key(&name) {
                    return Err((HistoryError::exists(target), entry));
                }
                self.roots.insert(name, entry);
            }
        }

        self.ids.extend(ids);
        Ok(target)
    }

    /// Detach the entry at `path`, returning its parent path and the subtree
    pub(crate) fn remove_child(&mut self, path: &str) -> HistoryResult<(Option<String>, Entry)> {
        let path = path::normalize(path);
        let (parent, entry) = if self.is_top_level(&path) {
            let entry = self
                .roots
                .remove(&path)
                .ok_or_else(|| HistoryError::not_found(path.as_str()))?;
            (None, entry)
        } else {
            if self.find_entry(&path).is_none() {
                return Err(HistoryError::not_found(path));
            }
            let (parent, name) = path::split_last(&path);
            let parent = parent.ok_or_else(|| HistoryError::not_found(path.as_str()))?;
            let entry = match self.find_entry_mut(parent) {
                Some(Entry::Directory(dir)) => dir.children.remove(name),
                _ => None,
            }
            .ok_or_else(|| HistoryError::not_found(path.as_str()))?;
            (Some(parent.to_string()), entry)
        };

        let mut ids = Vec::new();
        entry.collect_ids(&mut ids);
        for id in &ids {
            self.ids.remove(id);
        }
        Ok((parent, entry))
    }

    /// Move the entry at `path` to `parent` under `name`
    ///
    /// Validates the destination first; the tree is unchanged on error.
    pub(crate) fn relocate(
        &mut self,
        path: &str,
        parent: Option<&str>,
        name: &str,
    ) -> HistoryResult<Relocation> {
        let path = path::normalize(path);
        let parent = parent.map(path::normalize);
        let entry = self.get_entry(&path)?;
        let old_name = entry.name().to_string();

        let target = match parent.as_deref() {
            Some(parent) => path::join(parent, name),
            None => name.to_string(),
        };
        let old_parent = if self.is_top_level(&path) {
            None
        } else {
            path::split_last(&path).0.map(str::to_string)
        };
        if target == path {
            return Ok(Relocation {
                old_parent,
                old_name,
                new_path: path,
            });
        }

        if name.is_empty() || (parent.is_some() && !path::is_valid_name(name)) {
            return Err(HistoryError::invalid_state(format!("invalid entry name '{name}'")));
        }
        match parent.as_deref() {
            Some(parent) => {
                if path::is_within(parent, &path) {
                    return Err(HistoryError::invalid_state(format!(
                        "cannot move {path} into itself"
                    )));
                }
                match self.find_entry(parent) {
                    None => return Err(HistoryError::ParentNotFound(target)),
                    Some(Entry::File(_)) => return Err(HistoryError::NotADirectory(parent.into())),
                    Some(Entry::Directory(dir)) if dir.child(name).is_some() => {
                        return Err(HistoryError::exists(target))
                    }
                    Some(Entry::Directory(_)) => {}
                }
            }
            None => {
                if self.roots.contains_key(name) {
                    return Err(HistoryError::exists(target));
                }
            }
        }

        let (detached_from, mut entry) = self.remove_child(&path)?;
        entry.set_name(name.to_string());
        match self.try_attach(parent.as_deref(), entry) {
            Ok(new_path) => Ok(Relocation {
                old_parent,
                old_name,
                new_path,
            }),
            Err((err, mut entry)) => {
                entry.set_name(old_name);
                if let Err((restore_err, _)) = self.try_attach(detached_from.as_deref(), entry) {
                    tracing::error!(path = %path, error = %restore_err, "Failed to restore entry after move");
                }
                Err(err)
            }
        }
    }

    /// Rename in place; a top-level name only changes its last segment
    pub(crate) fn rename_entry(&mut self, path: &str, new_name: &str) -> HistoryResult<Relocation> {
        if !path::is_valid_name(new_name) {
            return Err(HistoryError::invalid_state(format!(
                "invalid entry name '{new_name}'"
            )));
        }
        let path = path::normalize(path);
        self.get_entry(&path)?;
        if self.is_top_level(&path) {
            let renamed = path::replace_last_segment(&path, new_name);
            self.relocate(&path, None, &renamed)
        } else {
            let parent = path::split_last(&path).0.map(str::to_string);
            self.relocate(&path, parent.as_deref(), new_name)
        }
    }

    /// Move under `new_parent`, keeping the last segment of the name
    pub(crate) fn reparent_entry(&mut self, path: &str, new_parent: &str) -> HistoryResult<Relocation> {
        let path = path::normalize(path);
        self.get_entry(&path)?;
        let name = path::last_segment(&path).to_string();
        self.relocate(&path, Some(new_parent), &name)
    }

    /// Replace a file's content and timestamp, returning the previous pair
    pub(crate) fn set_content(
        &mut self,
        path: &str,
        content: Option<ContentHandle>,
        timestamp: i64,
    ) -> HistoryResult<(Option<ContentHandle>, i64)> {
        let path = path::normalize(path);
        match self.find_entry_mut(&path) {
            Some(Entry::File(file)) => {
                let old = (file.content, file.timestamp);
                file.content = content;
                file.timestamp = timestamp;
                Ok(old)
            }
            Some(Entry::Directory(_)) => Err(HistoryError::NotAFile(path)),
            None => Err(HistoryError::not_found(path)),
        }
    }

    fn from_roots(roots: BTreeMap<String, Entry>) -> Result<Self, EntryId> {
        let mut ids = HashSet::new();
        for entry in roots.values() {
            let mut subtree = Vec::new();
            entry.collect_ids(&mut subtree);
            for id in subtree {
                if !ids.insert(id) {
                    return Err(id);
                }
            }
        }
        Ok(RootEntry { roots, ids })
    }
}

impl Serialize for RootEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.roots.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RootEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roots = BTreeMap::<String, Entry>::deserialize(deserializer)?;
        RootEntry::from_roots(roots)
            .map_err(|id| serde::de::Error::custom(format!("duplicate entry id {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn handle(raw: u32) -> Option<ContentHandle> {
        Some(ContentHandle::from_raw(raw))
    }

    fn sample() -> RootEntry {
        let mut root = RootEntry::new();
        root.create_directory(EntryId(1), "dir1").unwrap();
        root.create_directory(EntryId(2), "dir1/dir2").unwrap();
        root.create_file(EntryId(3), "dir1/dir2/file", handle(1), 10)
            .unwrap();
        root
    }

    #[test]
    fn test_create_and_lookup() {
        let root = sample();
        assert!(root.has_entry("dir1/dir2/file"));
        assert_eq!(root.get_entry("dir1/dir2").unwrap().id(), EntryId(2));
        assert_eq!(root.find_entry("dir1/dir2/file").unwrap().content(), handle(1));
        assert!(root.find_entry("dir1/missing").is_none());
        assert!(root.get_entry("dir1/missing").unwrap_err().is_not_found());
        assert_eq!(root.len(), 3);
    }

    #[test]
    fn test_create_rejects_missing_parent_and_siblings() {
        let mut root = sample();
        assert!(matches!(
            root.create_file(EntryId(9), "dir1/nope/file", None, 0),
            Err(HistoryError::ParentNotFound(_))
        ));
        assert!(matches!(
            root.create_file(EntryId(9), "dir1/dir2/file", None, 0),
            Err(HistoryError::EntryExists(_))
        ));
        assert!(matches!(
            root.create_file(EntryId(9), "dir1/dir2/file/inner", None, 0),
            Err(HistoryError::NotADirectory(_))
        ));
        assert!(matches!(
            root.create_file(EntryId(9), "elsewhere/file", None, 0),
            Err(HistoryError::ParentNotFound(_))
        ));
        assert!(matches!(
            root.create_directory(EntryId(3), "dir1/other"),
            Err(HistoryError::DuplicateId(EntryId(3)))
        ));
        assert_eq!(root.len(), 3);
    }

    #[test]
    fn test_multi_segment_roots() {
        let mut root = RootEntry::new();
        root.create_directory(EntryId(1), "c:/dir/root").unwrap();
        root.create_file(EntryId(2), "c:/dir/root/file", None, 1).unwrap();
        root.create_directory(EntryId(3), "d:/other").unwrap();

        assert_eq!(root.roots().count(), 2);
        assert_eq!(root.get_entry("c:/dir/root").unwrap().name(), "c:/dir/root");
        assert_eq!(root.path_of(EntryId(2)).unwrap(), "c:/dir/root/file");
        assert!(!root.has_entry("c:/dir"));
    }

    #[test]
    fn test_top_level_file() {
        let mut root = RootEntry::new();
        root.create_file(EntryId(1), "file", handle(5), 123).unwrap();
        let file = root.get_entry("file").unwrap().as_file().unwrap();
        assert_eq!(file.timestamp, 123);
        assert_eq!(file.content, handle(5));
    }

    #[test]
    fn test_rename_keeps_identity() {
        let mut root = sample();
        let moved = root.rename_entry("dir1/dir2", "new dir").unwrap();
        assert_eq!(moved.new_path, "dir1/new dir");
        assert_eq!(moved.old_name, "dir2");
        assert_eq!(root.get_entry("dir1/new dir/file").unwrap().id(), EntryId(3));
        assert!(!root.has_entry("dir1/dir2"));
    }

    #[test]
    fn test_rename_top_level_rewrites_last_segment() {
        let mut root = RootEntry::new();
        root.create_directory(EntryId(1), "c:/dir/root").unwrap();
        root.create_file(EntryId(2), "c:/dir/root/f", None, 0).unwrap();

        let moved = root.rename_entry("c:/dir/root", "newRoot").unwrap();
        assert_eq!(moved.new_path, "c:/dir/newRoot");
        assert_eq!(root.get_entry("c:/dir/newRoot/f").unwrap().id(), EntryId(2));
    }

    #[test]
    fn test_reparent() {
        let mut root = sample();
        root.create_directory(EntryId(4), "dir1/target").unwrap();
        let moved = root.reparent_entry("dir1/dir2", "dir1/target").unwrap();

        assert_eq!(moved.old_parent.as_deref(), Some("dir1"));
        assert_eq!(moved.new_path, "dir1/target/dir2");
        assert_eq!(root.path_of(EntryId(3)).unwrap(), "dir1/target/dir2/file");
    }

    #[test]
    fn test_move_into_itself_rejected() {
        let mut root = sample();
        let before = root.clone();
        assert!(matches!(
            root.reparent_entry("dir1", "dir1/dir2"),
            Err(HistoryError::InvalidState(_))
        ));
        assert_eq!(root, before);
    }

    #[test]
    fn test_remove_and_restore_snapshot() {
        let mut root = sample();
        let before = root.clone();

        let (parent, entry) = root.remove_child("dir1/dir2").unwrap();
        assert_eq!(parent.as_deref(), Some("dir1"));
        assert_eq!(root.len(), 1);
        assert!(!root.contains_id(EntryId(3)));

        let snapshot = EntrySnapshot::capture(&entry);
        root.add_child(parent.as_deref(), snapshot.restore()).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_set_content() {
        let mut root = sample();
        let old = root.set_content("dir1/dir2/file", handle(2), 20).unwrap();
        assert_eq!(old, (handle(1), 10));
        assert!(matches!(
            root.set_content("dir1", None, 0),
            Err(HistoryError::NotAFile(_))
        ));
    }

    #[test]
    fn test_serde_rebuilds_id_index() {
        let root = sample();
        let bytes = postcard::to_allocvec(&root).unwrap();
        let decoded: RootEntry = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, root);
        assert!(decoded.contains_id(EntryId(2)));
    }
}
