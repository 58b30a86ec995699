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
//! Linear log of change sets
//!
//! The log is the single source of truth for what happened to the tree.
//! Changes recorded between `begin_change_set` and the matching
//! `end_change_set` form one set; a change recorded outside a command becomes
//! a set of its own. Set ids grow strictly and are never reused.
//!
//! A [`Checkpoint`] is the id of the newest closed set at the time it was
//! taken. Rolling back to it reverts every newer set; the reverted sets are
//! handed back so the host can roll forward again with [`ChangeList::replay`].

use crate::change::Change;
use crate::change_set::ChangeSet;
use crate::entry::{EntryId, RootEntry};
use crate::error::{HistoryError, HistoryResult};
use crate::revision::Revision;
use localhistory_storage::{ContentHandle, ContentStorage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const LOG_VERSION: u32 = 1;

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Write through a temporary sibling and rename over the target
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    {
        let mut tmp = File::create(tmp_path)?;
        tmp.write_all(bytes)?;
        tmp.sync_all()?;
    }
    fs::rename(tmp_path, path)
}

/// Opaque log position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Checkpoint(u64);

impl Checkpoint {
    /// Checkpoint at a raw log position
    pub fn from_position(position: u64) -> Self {
        Checkpoint(position)
    }

    /// Id of the newest change set covered by the checkpoint
    pub fn position(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Outcome of [`ChangeList::purge_obsolete`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Change sets dropped from the log
    pub sets_removed: usize,
    /// Changes contained in those sets
    pub changes_removed: usize,
    /// Content records released from storage
    pub handles_released: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileState {
    path: String,
    content: Option<ContentHandle>,
    timestamp: i64,
}

impl FileState {
    fn of(root: &RootEntry, id: EntryId) -> Option<Self> {
        let file = root.find_by_id(id)?.as_file()?;
        Some(FileState {
            path: root.path_of(id)?,
            content: file.content,
            timestamp: file.timestamp,
        })
    }

    fn into_revision(self, set: Option<&ChangeSet>) -> Revision {
        Revision {
            change_set_id: set.map(|set| set.id),
            label: set.and_then(|set| set.name.clone()),
            timestamp: set.map_or(self.timestamp, |set| set.timestamp),
            path: self.path,
            content: self.content,
            file_timestamp: self.timestamp,
        }
    }
}

/// Ordered, appendable history of change sets
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChangeList {
    sets: Vec<ChangeSet>,
    last_allocated: u64,
    purged_through: u64,
    #[serde(skip)]
    open: Option<ChangeSet>,
    #[serde(skip)]
    nesting: u32,
    #[serde(skip)]
    generation: u64,
}

impl ChangeList {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed change sets, oldest first
    pub fn sets(&self) -> &[ChangeSet] {
        &self.sets
    }

    /// Set currently collecting changes, if a command is open
    pub fn open_set(&self) -> Option<&ChangeSet> {
        self.open.as_ref()
    }

    /// Number of closed change sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when no closed change set is recorded
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// True between `begin_change_set` and the outermost `end_change_set`
    pub fn in_command(&self) -> bool {
        self.nesting > 0
    }

    /// Counter bumped on every mutation of the log
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Id of the newest closed set, or of the last purged one when the log is empty
    pub fn last_id(&self) -> u64 {
        self.sets
            .last()
            .map_or(self.purged_through, |set| set.id)
    }

    fn allocate_id(&mut self) -> u64 {
        self.last_allocated += 1;
        self.last_allocated
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    fn ensure_idle(&self, operation: &str) -> HistoryResult<()> {
        if self.in_command() {
            return Err(HistoryError::invalid_state(format!(
                "{operation} while a command is open"
            )));
        }
        Ok(())
    }

    /// Open a command stamped with the current time
    pub fn begin_change_set(&mut self, name: Option<String>) {
        self.begin_change_set_at(name, now_millis());
    }

    /// Open a command with an explicit timestamp
    ///
    /// Nested calls only bump the nesting depth; the outermost name wins.
    pub fn begin_change_set_at(&mut self, name: Option<String>, timestamp: i64) {
        if self.nesting == 0 {
            let id = self.allocate_id();
            debug!(set = id, name = ?name, "Command started");
            self.open = Some(ChangeSet::new(id, name, timestamp));
        }
        self.nesting += 1;
    }

    /// Close the innermost command
    ///
    /// Returns the id of the recorded set when the outermost command closes
    /// with at least one change. Empty commands leave no trace in the log.
    pub fn end_change_set(&mut self) -> HistoryResult<Option<u64>> {
        if self.nesting == 0 {
            return Err(HistoryError::invalid_state("end_change_set without begin"));
        }
        self.nesting -= 1;
        if self.nesting > 0 {
            return Ok(None);
        }
        match self.open.take() {
            Some(set) if !set.is_empty() => {
                let id = set.id;
                debug!(set = id, changes = set.len(), "Command finished");
                self.sets.push(set);
                self.touch();
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }

    /// Apply a change to the tree and record it
    ///
    /// Nothing is recorded when `apply` fails.
    pub fn apply_change(&mut self, root: &mut RootEntry, mut change: Change) -> HistoryResult<()> {
        change.apply(root)?;
        match self.open.as_mut() {
            Some(open) => open.push(change),
            None => {
                let mut set = ChangeSet::new(self.allocate_id(), None, now_millis());
                set.push(change);
                self.sets.push(set);
            }
        }
        self.touch();
        Ok(())
    }

    /// Mark the current position
    ///
    /// Changes of a still open command are not covered.
    pub fn put_checkpoint(&self) -> Checkpoint {
        Checkpoint(self.last_id())
    }

    fn check_checkpoint(&self, checkpoint: Checkpoint) -> HistoryResult<()> {
        if checkpoint.0 > self.last_id() {
            return Err(HistoryError::InvalidCheckpoint(format!(
                "{checkpoint} is ahead of the log ({})",
                self.last_id()
            )));
        }
        if checkpoint.0 < self.purged_through {
            return Err(HistoryError::InvalidCheckpoint(format!(
                "{checkpoint} predates purged history ({})",
                self.purged_through
            )));
        }
        Ok(())
    }

    /// Roll the tree back to the state captured by `checkpoint`
    ///
    /// Reverts and removes every newer set. Atomic: on failure the tree and
    /// the log are unchanged. Returns the removed sets, oldest first.
    pub fn revert_to_that_state(
        &mut self,
        root: &mut RootEntry,
        checkpoint: Checkpoint,
    ) -> HistoryResult<Vec<ChangeSet>> {
        self.ensure_idle("revert")?;
        self.check_checkpoint(checkpoint)?;

        let keep = self.sets.partition_point(|set| set.id <= checkpoint.0);
        let mut undone = self.sets.split_off(keep);
        for index in (0..undone.len()).rev() {
            if let Err(err) = undone[index].revert(root) {
                for set in &mut undone[index + 1..] {
                    if let Err(redo_err) = set.apply(root) {
                        warn!(set = set.id, error = %redo_err, "Failed to restore change set");
                    }
                }
                self.sets.append(&mut undone);
                return Err(err);
            }
        }

        if !undone.is_empty() {
            info!(checkpoint = %checkpoint, sets = undone.len(), "Reverted to checkpoint");
            self.touch();
        }
        Ok(undone)
    }

    /// Roll the tree back to the state before the newest set covered by `checkpoint`
    pub fn revert_to_previous_state(
        &mut self,
        root: &mut RootEntry,
        checkpoint: Checkpoint,
    ) -> HistoryResult<Vec<ChangeSet>> {
        self.ensure_idle("revert")?;
        self.check_checkpoint(checkpoint)?;

        let keep = self.sets.partition_point(|set| set.id <= checkpoint.0);
        let previous = keep
            .checked_sub(1)
            .map(|index| self.sets[index].id)
            .ok_or_else(|| {
                HistoryError::InvalidCheckpoint(format!("no change set at or before {checkpoint}"))
            })?;
        self.revert_to_that_state(root, Checkpoint(previous.saturating_sub(1)))
    }

    /// Re-apply sets previously returned by a revert
    ///
    /// Ids must be strictly increasing and newer than the log head. Atomic.
    pub fn replay(&mut self, root: &mut RootEntry, mut sets: Vec<ChangeSet>) -> HistoryResult<()> {
        self.ensure_idle("replay")?;
        let mut head = self.last_id();
        for set in &sets {
            if set.id <= head {
                return Err(HistoryError::invalid_state(format!(
                    "change set {} does not follow {head}",
                    set.id
                )));
            }
            head = set.id;
        }

        for index in 0..sets.len() {
            if let Err(err) = sets[index].apply(root) {
                for set in sets[..index].iter_mut().rev() {
                    if let Err(undo_err) = set.revert(root) {
                        warn!(set = set.id, error = %undo_err, "Failed to roll back replay");
                    }
                }
                return Err(err);
            }
        }

        if !sets.is_empty() {
            info!(sets = sets.len(), head, "Replayed change sets");
            self.last_allocated = self.last_allocated.max(head);
            self.sets.append(&mut sets);
            self.touch();
        }
        Ok(())
    }

    /// Drop the oldest sets recorded before `older_than` (epoch millis)
    ///
    /// Only a contiguous prefix is dropped. Content only reachable through
    /// the undo state of dropped changes is released from `storage`; handles
    /// still used by the tree or by the remaining log are kept.
    pub fn purge_obsolete(
        &mut self,
        root: &RootEntry,
        storage: &mut dyn ContentStorage,
        older_than: i64,
    ) -> HistoryResult<PurgeReport> {
        let count = self
            .sets
            .iter()
            .take_while(|set| set.timestamp < older_than)
            .count();
        if count == 0 {
            return Ok(PurgeReport::default());
        }

        let purged: Vec<ChangeSet> = self.sets.drain(..count).collect();
        self.purged_through = purged.last().map_or(self.purged_through, |set| set.id);
        self.touch();

        let live = self.live_handles(root);
        let mut report = PurgeReport {
            sets_removed: purged.len(),
            ..PurgeReport::default()
        };
        let mut released = HashSet::new();
        for change in purged.iter().flat_map(ChangeSet::changes) {
            report.changes_removed += 1;
            for handle in change.undo_content() {
                if live.contains(&handle) || !released.insert(handle) || storage.is_removed(handle) {
                    continue;
                }
                storage.remove(handle)?;
                report.handles_released += 1;
            }
        }

        info!(
            sets = report.sets_removed,
            changes = report.changes_removed,
            released = report.handles_released,
            "Purged obsolete history"
        );
        Ok(report)
    }

    /// Release the content of reverted sets that will not be replayed
    ///
    /// Every handle the sets refer to is removed from `storage` unless the
    /// tree or the log still uses it. Sets that are still applied are
    /// refused. Returns the number of released handles.
    pub fn discard(
        &self,
        root: &RootEntry,
        storage: &mut dyn ContentStorage,
        sets: Vec<ChangeSet>,
    ) -> HistoryResult<usize> {
        if let Some(set) = sets
            .iter()
            .find(|set| set.changes().iter().any(Change::is_applied))
        {
            return Err(HistoryError::invalid_state(format!(
                "change set {} is still applied",
                set.id
            )));
        }

        let live = self.live_handles(root);
        let mut released = HashSet::new();
        for change in sets.iter().flat_map(ChangeSet::changes) {
            for handle in change.content_handles() {
                if live.contains(&handle) || released.contains(&handle) || storage.is_removed(handle) {
                    continue;
                }
                storage.remove(handle)?;
                released.insert(handle);
            }
        }
        debug!(sets = sets.len(), released = released.len(), "Discarded reverted sets");
        Ok(released.len())
    }

    fn live_handles(&self, root: &RootEntry) -> HashSet<ContentHandle> {
        let mut live: HashSet<ContentHandle> = root.content_handles().into_iter().collect();
        for set in self.sets.iter().chain(self.open.iter()) {
            for change in set.changes() {
                live.extend(change.content_handles());
            }
        }
        live
    }

    /// Revisions of the file at `path`, oldest first
    ///
    /// Reverts clones of the logged sets on a clone of `root`, following the
    /// file by id across renames and moves. A revision is reported for every
    /// set that changed the file, plus an initial one when the file predates
    /// the log.
    pub fn revisions_for(&self, root: &RootEntry, path: &str) -> HistoryResult<Vec<Revision>> {
        let entry = root.get_entry(path)?;
        let id = entry
            .as_file()
            .map(|file| file.id)
            .ok_or_else(|| HistoryError::NotAFile(path.to_string()))?;

        let mut tree = root.clone();
        let mut sets: Vec<ChangeSet> = self.sets.iter().chain(self.open.iter()).cloned().collect();
        let mut after = FileState::of(&tree, id);
        let mut revisions = Vec::new();

        for set in sets.iter_mut().rev() {
            set.revert(&mut tree)?;
            let before = FileState::of(&tree, id);
            if let Some(state) = after {
                if before.as_ref() != Some(&state) {
                    revisions.push(state.into_revision(Some(set)));
                }
            }
            after = before;
        }
        if let Some(state) = after {
            revisions.push(state.into_revision(None));
        }

        revisions.reverse();
        debug!(path, revisions = revisions.len(), "Collected revisions");
        Ok(revisions)
    }

    /// Persist the closed sets
    pub fn save(&self, path: &Path) -> HistoryResult<()> {
        self.ensure_idle("save")?;
        let bytes = postcard::to_allocvec(&(LOG_VERSION, self))?;
        write_atomic(path, &bytes)?;
        debug!(path = %path.display(), sets = self.sets.len(), bytes = bytes.len(), "Saved change log");
        Ok(())
    }

    /// Read a log written by [`ChangeList::save`]
    pub fn load(path: &Path) -> HistoryResult<Self> {
        let bytes = fs::read(path)?;
        let (version, mut list): (u32, ChangeList) = postcard::from_bytes(&bytes)?;
        if version != LOG_VERSION {
            return Err(HistoryError::Serialization(format!(
                "unsupported change log version {version}"
            )));
        }
        list.touch();
        Ok(list)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use localhistory_storage::MemoryContentStorage;

    fn dir(id: u64, path: &str) -> Change {
        Change::create_directory(EntryId(id), path)
    }

    #[test]
    fn test_changes_outside_command_get_own_set() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, dir(1, "a")).unwrap();
        log.apply_change(&mut root, dir(2, "b")).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.sets()[0].id, 1);
        assert_eq!(log.sets()[1].id, 2);
    }

    #[test]
    fn test_nested_command_is_one_set() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.begin_change_set_at(Some("outer".into()), 10);
        log.apply_change(&mut root, dir(1, "a")).unwrap();
        log.begin_change_set(Some("inner".into()));
        log.apply_change(&mut root, dir(2, "a/b")).unwrap();
        assert_eq!(log.end_change_set().unwrap(), None);
        assert!(log.is_empty());
        assert_eq!(log.end_change_set().unwrap(), Some(1));

        let set = &log.sets()[0];
        assert_eq!(set.name.as_deref(), Some("outer"));
        assert_eq!(set.timestamp, 10);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_empty_command_leaves_no_set() {
        let mut log = ChangeList::new();
        log.begin_change_set(None);
        assert_eq!(log.end_change_set().unwrap(), None);
        assert!(log.is_empty());
        assert!(matches!(
            log.end_change_set(),
            Err(HistoryError::InvalidState(_))
        ));
    }

    #[test]
    fn test_failed_change_not_recorded() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        let generation = log.generation();
        assert!(log.apply_change(&mut root, Change::delete("nope")).is_err());
        assert!(log.is_empty());
        assert_eq!(log.generation(), generation);
    }

    #[test]
    fn test_checkpoint_revert_and_replay() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, dir(1, "a")).unwrap();
        let checkpoint = log.put_checkpoint();
        let at_checkpoint = root.clone();

        log.apply_change(&mut root, dir(2, "a/b")).unwrap();
        log.apply_change(&mut root, Change::rename("a/b", "c")).unwrap();
        let latest = root.clone();

        let undone = log.revert_to_that_state(&mut root, checkpoint).unwrap();
        assert_eq!(undone.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(root, at_checkpoint);
        assert_eq!(log.put_checkpoint(), checkpoint);

        log.replay(&mut root, undone).unwrap();
        assert_eq!(root, latest);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_revert_to_previous_state() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, dir(1, "a")).unwrap();
        log.apply_change(&mut root, dir(2, "b")).unwrap();
        let checkpoint = log.put_checkpoint();

        let undone = log.revert_to_previous_state(&mut root, checkpoint).unwrap();
        assert_eq!(undone.len(), 1);
        assert!(root.has_entry("a"));
        assert!(!root.has_entry("b"));

        log.revert_to_previous_state(&mut root, log.put_checkpoint())
            .unwrap();
        assert!(root.is_empty());
        assert!(matches!(
            log.revert_to_previous_state(&mut root, log.put_checkpoint()),
            Err(HistoryError::InvalidCheckpoint(_))
        ));
    }

    #[test]
    fn test_checkpoint_validation() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        assert!(matches!(
            log.revert_to_that_state(&mut root, Checkpoint::from_position(3)),
            Err(HistoryError::InvalidCheckpoint(_))
        ));

        log.begin_change_set(None);
        assert!(matches!(
            log.revert_to_that_state(&mut root, Checkpoint::from_position(0)),
            Err(HistoryError::InvalidState(_))
        ));
    }

    #[test]
    fn test_replay_rejects_stale_sets() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, dir(1, "a")).unwrap();
        let undone = log
            .revert_to_that_state(&mut root, Checkpoint::from_position(0))
            .unwrap();
        log.apply_change(&mut root, dir(5, "z")).unwrap();
        assert!(matches!(
            log.replay(&mut root, undone),
            Err(HistoryError::InvalidState(_))
        ));
        assert!(!root.has_entry("a"));
    }

    #[test]
    fn test_purge_releases_undo_content() {
        let mut storage = MemoryContentStorage::new();
        let v1 = storage.store(b"v1").unwrap();
        let v2 = storage.store(b"v2").unwrap();
        let v3 = storage.store(b"v3").unwrap();

        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.begin_change_set_at(None, 100);
        log.apply_change(&mut root, Change::create_file(EntryId(1), "f", Some(v1), 1))
            .unwrap();
        log.end_change_set().unwrap();
        log.begin_change_set_at(None, 200);
        log.apply_change(&mut root, Change::change_content("f", Some(v2), 2))
            .unwrap();
        log.end_change_set().unwrap();
        log.begin_change_set_at(None, 300);
        log.apply_change(&mut root, Change::change_content("f", Some(v3), 3))
            .unwrap();
        log.end_change_set().unwrap();

        let report = log.purge_obsolete(&root, &mut storage, 250).unwrap();
        assert_eq!(report.sets_removed, 2);
        assert_eq!(report.changes_removed, 2);
        assert_eq!(report.handles_released, 1);
        assert!(storage.is_removed(v1));
        // v2 is still the undo state of the surviving set.
        assert!(!storage.is_removed(v2));
        assert!(!storage.is_removed(v3));

        assert!(matches!(
            log.revert_to_that_state(&mut root, Checkpoint::from_position(1)),
            Err(HistoryError::InvalidCheckpoint(_))
        ));
        log.revert_to_that_state(&mut root, Checkpoint::from_position(2))
            .unwrap();
        assert_eq!(root.get_entry("f").unwrap().content(), Some(v2));
    }

    #[test]
    fn test_discard_releases_reverted_content() {
        let mut storage = MemoryContentStorage::new();
        let v1 = storage.store(b"v1").unwrap();
        let v2 = storage.store(b"v2").unwrap();

        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, Change::create_file(EntryId(1), "f", Some(v1), 1))
            .unwrap();
        let checkpoint = log.put_checkpoint();
        log.apply_change(&mut root, Change::change_content("f", Some(v2), 2))
            .unwrap();

        let undone = log.revert_to_that_state(&mut root, checkpoint).unwrap();
        assert_eq!(log.discard(&root, &mut storage, undone).unwrap(), 1);
        assert!(storage.is_removed(v2));
        assert!(!storage.is_removed(v1));
    }

    #[test]
    fn test_discard_refuses_applied_sets() {
        let mut storage = MemoryContentStorage::new();
        let v1 = storage.store(b"v1").unwrap();
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, Change::create_file(EntryId(1), "f", Some(v1), 1))
            .unwrap();

        let applied = log.sets().to_vec();
        assert!(matches!(
            log.discard(&root, &mut storage, applied),
            Err(HistoryError::InvalidState(_))
        ));
        assert!(!storage.is_removed(v1));
    }

    #[test]
    fn test_revisions_follow_renames() {
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        let h = |raw| Some(ContentHandle::from_raw(raw));
        log.apply_change(&mut root, dir(1, "d")).unwrap();
        log.apply_change(&mut root, Change::create_file(EntryId(2), "d/f", h(1), 10))
            .unwrap();
        log.apply_change(&mut root, dir(3, "e")).unwrap();
        log.apply_change(&mut root, Change::change_content("d/f", h(2), 20))
            .unwrap();
        log.apply_change(&mut root, Change::move_to("d/f", "e")).unwrap();

        let revisions = log.revisions_for(&root, "e/f").unwrap();
        let summary: Vec<_> = revisions
            .iter()
            .map(|r| (r.change_set_id, r.path.as_str(), r.content))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some(2), "d/f", h(1)),
                (Some(4), "d/f", h(2)),
                (Some(5), "e/f", h(2)),
            ]
        );
        assert!(log.revisions_for(&root, "d").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir_path = tempfile::tempdir().unwrap();
        let file = dir_path.path().join("changes.bin");
        let mut root = RootEntry::new();
        let mut log = ChangeList::new();
        log.apply_change(&mut root, dir(1, "a")).unwrap();
        log.apply_change(&mut root, Change::delete("a")).unwrap();
        log.save(&file).unwrap();

        let mut loaded = ChangeList::load(&file).unwrap();
        assert_eq!(loaded.sets(), log.sets());
        loaded
            .revert_to_that_state(&mut root, Checkpoint::from_position(1))
            .unwrap();
        assert!(root.has_entry("a"));
    }
}
