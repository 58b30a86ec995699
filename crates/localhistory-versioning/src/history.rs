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
//! Local history facade
//!
//! [`LocalHistory`] ties the entry tree, the change log and the content
//! storage together. Every mutation goes through the log, so it can be
//! reverted later; file payloads go to storage first and the tree only keeps
//! their handles.
//!
//! # Examples
//!
//! ```
//! use localhistory_storage::MemoryContentStorage;
//! use localhistory_versioning::LocalHistory;
//!
//! # fn main() -> localhistory_versioning::HistoryResult<()> {
//! let mut history = LocalHistory::new(Box::new(MemoryContentStorage::new()));
//! history.create_directory("project")?;
//! history.create_file("project/notes.txt", Some(b"first".as_slice()), 1)?;
//!
//! let checkpoint = history.put_checkpoint();
//! history.change_file_content("project/notes.txt", Some(b"second".as_slice()), 2)?;
//! assert_eq!(history.content("project/notes.txt")?, b"second");
//!
//! history.revert_to_that_state(checkpoint)?;
//! assert_eq!(history.content("project/notes.txt")?, b"first");
//! # Ok(())
//! # }
//! ```

use crate::change::Change;
use crate::change_list::{now_millis, write_atomic, ChangeList, Checkpoint, PurgeReport};
use crate::change_set::ChangeSet;
use crate::diff::DEFAULT_MAX_EDIT_COST;
use crate::entry::{EntryId, RootEntry};
use crate::error::{HistoryError, HistoryResult};
use crate::revision::Revision;
use crate::selection::SelectionCalculator;
use localhistory_config::Config;
use localhistory_storage::{
    CompressingContentStorage, ContentHandle, ContentStorage, FileContentStorage,
    FileStorageOptions, StorageStats,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const STATE_VERSION: u32 = 1;
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Serialize)]
struct StateRef<'a> {
    version: u32,
    next_id: u64,
    root: &'a RootEntry,
    changes: &'a ChangeList,
}

#[derive(Deserialize)]
struct State {
    version: u32,
    next_id: u64,
    root: RootEntry,
    changes: ChangeList,
}

/// Versioned file tree backed by a change log and a content store
#[derive(Debug)]
pub struct LocalHistory {
    root: RootEntry,
    changes: ChangeList,
    storage: Box<dyn ContentStorage>,
    next_id: u64,
    max_edit_cost: usize,
    max_age_days: u32,
    state_path: Option<PathBuf>,
}

impl LocalHistory {
    /// Empty, unpersisted history over `storage`
    pub fn new(storage: Box<dyn ContentStorage>) -> Self {
        LocalHistory {
            root: RootEntry::new(),
            changes: ChangeList::new(),
            storage,
            next_id: 1,
            max_edit_cost: DEFAULT_MAX_EDIT_COST,
            max_age_days: 5,
            state_path: None,
        }
    }

    /// Override the edit distance bound used by selection tracking
    pub fn with_max_edit_cost(mut self, max_edit_cost: usize) -> Self {
        self.max_edit_cost = max_edit_cost;
        self
    }

    /// Open the history stored under `config.storage.path`
    ///
    /// Creates the directory and an empty history when nothing is stored yet.
    pub fn open(config: &Config) -> HistoryResult<Self> {
        let settings = &config.storage;
        let file = FileContentStorage::open(
            &settings.path,
            &settings.file_stem,
            FileStorageOptions {
                compaction_threshold: settings.compaction_threshold,
            },
        )?;
        let storage: Box<dyn ContentStorage> =
            match settings.compression.compressor(settings.compression_level) {
                Some(compressor) => Box::new(CompressingContentStorage::new(
                    file,
                    compressor,
                    settings.compression_level,
                )),
                None => Box::new(file),
            };

        let state_path = config.change_log_path();
        let mut history = LocalHistory::new(storage).with_max_edit_cost(config.diff.max_edit_cost);
        history.max_age_days = config.history.max_age_days;
        if state_path.exists() {
            let state = read_state(&state_path)?;
            let floor = state.root.max_id().map_or(1, |id| id.0 + 1);
            history.next_id = state.next_id.max(floor);
            history.root = state.root;
            history.changes = state.changes;
        }
        info!(
            path = %state_path.display(),
            entries = history.root.len(),
            change_sets = history.changes.len(),
            compression = %settings.compression,
            "Opened local history"
        );
        history.state_path = Some(state_path);
        Ok(history)
    }

    /// Current tree
    pub fn root(&self) -> &RootEntry {
        &self.root
    }

    /// Change log
    pub fn changes(&self) -> &ChangeList {
        &self.changes
    }

    /// Content storage
    pub fn storage(&self) -> &dyn ContentStorage {
        self.storage.as_ref()
    }

    /// Storage accounting
    pub fn stats(&self) -> StorageStats {
        self.storage.stats()
    }

    /// Where `save` writes the tree and the log, if anywhere
    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    fn store(&mut self, content: Option<&[u8]>) -> HistoryResult<Option<ContentHandle>> {
        Ok(content.map(|bytes| self.storage.store(bytes)).transpose()?)
    }

    fn release(&mut self, handle: Option<ContentHandle>) {
        if let Some(handle) = handle {
            if let Err(err) = self.storage.remove(handle) {
                warn!(handle = %handle, error = %err, "Failed to release content");
            }
        }
    }

    fn record(&mut self, change: Change) -> HistoryResult<()> {
        self.changes.apply_change(&mut self.root, change)
    }

    /// Create a file, storing its content first
    pub fn create_file(
        &mut self,
        path: &str,
        content: Option<&[u8]>,
        timestamp: i64,
    ) -> HistoryResult<EntryId> {
        let handle = self.store(content)?;
        let id = self.allocate_id();
        if let Err(err) = self.record(Change::create_file(id, path, handle, timestamp)) {
            self.release(handle);
            return Err(err);
        }
        Ok(id)
    }

    /// Create an empty directory
    pub fn create_directory(&mut self, path: &str) -> HistoryResult<EntryId> {
        let id = self.allocate_id();
        self.record(Change::create_directory(id, path))?;
        Ok(id)
    }

    /// Replace a file's content and timestamp
    pub fn change_file_content(
        &mut self,
        path: &str,
        content: Option<&[u8]>,
        timestamp: i64,
    ) -> HistoryResult<()> {
        let handle = self.store(content)?;
        if let Err(err) = self.record(Change::change_content(path, handle, timestamp)) {
            self.release(handle);
            return Err(err);
        }
        Ok(())
    }

    /// Rename the entry at `path`
    pub fn rename(&mut self, path: &str, new_name: &str) -> HistoryResult<()> {
        self.record(Change::rename(path, new_name))
    }

    /// Move the entry at `path` under `new_parent`
    pub fn move_entry(&mut self, path: &str, new_parent: &str) -> HistoryResult<()> {
        self.record(Change::move_to(path, new_parent))
    }

    /// Delete the entry at `path` with its subtree
    pub fn delete(&mut self, path: &str) -> HistoryResult<()> {
        self.record(Change::delete(path))
    }

    /// Start grouping changes into one set
    pub fn begin_command(&mut self, name: Option<&str>) {
        self.changes.begin_change_set(name.map(str::to_string));
    }

    /// Finish the innermost command
    pub fn end_command(&mut self) -> HistoryResult<Option<u64>> {
        self.changes.end_change_set()
    }

    /// Mark the current position in the log
    pub fn put_checkpoint(&self) -> Checkpoint {
        self.changes.put_checkpoint()
    }

    /// Roll back to `checkpoint`, returning the undone sets
    pub fn revert_to_that_state(&mut self, checkpoint: Checkpoint) -> HistoryResult<Vec<ChangeSet>> {
        self.changes.revert_to_that_state(&mut self.root, checkpoint)
    }

    /// Roll back to before the newest set covered by `checkpoint`
    pub fn revert_to_previous_state(
        &mut self,
        checkpoint: Checkpoint,
    ) -> HistoryResult<Vec<ChangeSet>> {
        self.changes
            .revert_to_previous_state(&mut self.root, checkpoint)
    }

    /// Roll forward again with sets returned by a revert
    pub fn replay(&mut self, sets: Vec<ChangeSet>) -> HistoryResult<()> {
        self.changes.replay(&mut self.root, sets)
    }

    /// Drop sets returned by a revert for good, releasing their content
    pub fn discard(&mut self, sets: Vec<ChangeSet>) -> HistoryResult<usize> {
        self.changes.discard(&self.root, self.storage.as_mut(), sets)
    }

    /// Revisions of the file at `path`, oldest first
    pub fn revisions(&self, path: &str) -> HistoryResult<Vec<Revision>> {
        self.changes.revisions_for(&self.root, path)
    }

    /// Current content of the file at `path` (empty when it has none)
    pub fn content(&self, path: &str) -> HistoryResult<Vec<u8>> {
        let entry = self.root.get_entry(path)?;
        let file = entry
            .as_file()
            .ok_or_else(|| HistoryError::NotAFile(path.to_string()))?;
        self.load(file.content)
    }

    /// Content of a revision (empty when it has none)
    pub fn load_revision(&self, revision: &Revision) -> HistoryResult<Vec<u8>> {
        self.load(revision.content)
    }

    fn load(&self, handle: Option<ContentHandle>) -> HistoryResult<Vec<u8>> {
        match handle {
            Some(handle) => Ok(self.storage.load(handle)?),
            None => Ok(Vec::new()),
        }
    }

    /// Track lines `[from, to)` of the latest revision of `path` back in time
    pub fn selection_calculator(
        &self,
        path: &str,
        from: usize,
        to: usize,
    ) -> HistoryResult<SelectionCalculator<'_>> {
        let revisions = self.revisions(path)?;
        let target = revisions.len().saturating_sub(1);
        SelectionCalculator::new(
            self.storage.as_ref(),
            revisions,
            target,
            from,
            to,
            self.changes.generation(),
            self.max_edit_cost,
        )
    }

    /// Drop change sets recorded before `older_than` (epoch millis)
    pub fn purge_obsolete(&mut self, older_than: i64) -> HistoryResult<PurgeReport> {
        self.changes
            .purge_obsolete(&self.root, self.storage.as_mut(), older_than)
    }

    /// Drop change sets older than the configured maximum age
    pub fn purge_expired(&mut self) -> HistoryResult<PurgeReport> {
        let horizon = now_millis() - i64::from(self.max_age_days) * MILLIS_PER_DAY;
        self.purge_obsolete(horizon)
    }

    /// Flush storage and, for opened histories, write the tree and the log
    pub fn save(&mut self) -> HistoryResult<()> {
        if self.changes.in_command() {
            return Err(HistoryError::invalid_state("save while a command is open"));
        }
        self.storage.save()?;
        if let Some(path) = &self.state_path {
            let bytes = postcard::to_allocvec(&StateRef {
                version: STATE_VERSION,
                next_id: self.next_id,
                root: &self.root,
                changes: &self.changes,
            })?;
            write_atomic(path, &bytes)?;
            debug!(path = %path.display(), bytes = bytes.len(), "Saved history state");
        }
        Ok(())
    }

    /// Save and release the storage
    pub fn close(mut self) -> HistoryResult<()> {
        self.save()?;
        self.storage.close()?;
        Ok(())
    }
}

fn read_state(path: &Path) -> HistoryResult<State> {
    let bytes = fs::read(path)?;
    let state: State = postcard::from_bytes(&bytes)?;
    if state.version != STATE_VERSION {
        return Err(HistoryError::Serialization(format!(
            "unsupported history state version {}",
            state.version
        )));
    }
    Ok(state)
}
