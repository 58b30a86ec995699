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
//! Selection tracking across a file's revisions
//!
//! A selection is made in one revision (the target). Asking for an older
//! revision walks back one revision at a time, remapping the block through
//! the diff of each adjacent pair. Every visited block is cached, so later
//! queries only diff the revisions not walked yet.
//!
//! The calculator snapshots the revision list. Once the log changes it
//! reports itself stale and should be rebuilt.

use crate::block::{tokenize, Block};
use crate::change_list::ChangeList;
use crate::error::{HistoryError, HistoryResult};
use crate::revision::Revision;
use localhistory_storage::ContentStorage;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Memoizing projector of a line range onto older revisions
#[derive(Debug)]
pub struct SelectionCalculator<'a> {
    storage: &'a dyn ContentStorage,
    revisions: Vec<Revision>,
    target: usize,
    from: usize,
    to: usize,
    cache: HashMap<usize, Block>,
    generation: u64,
    max_edit_cost: usize,
}

impl<'a> SelectionCalculator<'a> {
    /// Calculator for lines `[from, to)` of `revisions[target]`
    ///
    /// `generation` is the change list generation the revisions were read at.
    pub fn new(
        storage: &'a dyn ContentStorage,
        revisions: Vec<Revision>,
        target: usize,
        from: usize,
        to: usize,
        generation: u64,
        max_edit_cost: usize,
    ) -> HistoryResult<Self> {
        if target >= revisions.len() {
            return Err(HistoryError::invalid_state(format!(
                "selection target {target} outside {} revisions",
                revisions.len()
            )));
        }
        Ok(SelectionCalculator {
            storage,
            revisions,
            target,
            from,
            to,
            cache: HashMap::new(),
            generation,
            max_edit_cost,
        })
    }

    /// Revisions the calculator works on, oldest first
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Index of the revision the selection was made in
    pub fn target(&self) -> usize {
        self.target
    }

    /// True once `changes` moved past the generation this calculator was built at
    pub fn is_stale(&self, changes: &ChangeList) -> bool {
        changes.generation() != self.generation
    }

    /// True when every revision between `index` and the target can be read
    pub fn can_calculate_for(&self, index: usize) -> bool {
        index <= self.target
            && self.revisions[index..=self.target]
                .iter()
                .all(|revision| revision.content.is_none_or(|h| !self.storage.is_removed(h)))
    }

    /// The selection projected onto `revisions[index]`
    pub fn selection_for(&mut self, index: usize) -> HistoryResult<&Block> {
        if index > self.target {
            return Err(HistoryError::invalid_state(format!(
                "revision {index} is newer than selection target {}",
                self.target
            )));
        }

        let cached = (index..=self.target).find(|i| self.cache.contains_key(i));
        let mut current = match cached {
            Some(i) => i,
            None => {
                let lines = self.lines_of(self.target)?;
                self.cache.insert(
                    self.target,
                    Block::from_lines(lines, self.from, self.to),
                );
                self.target
            }
        };

        let walked = current - index;
        while current > index {
            let lines = self.lines_of(current - 1)?;
            let previous = match self.cache.get(&current) {
                Some(block) => block.create_previous_block(lines, self.max_edit_cost),
                None => break,
            };
            current -= 1;
            self.cache.insert(current, previous);
        }
        debug!(index, walked, cached = self.cache.len(), "Calculated selection");

        self.cache
            .get(&index)
            .ok_or_else(|| HistoryError::invalid_state(format!("no selection for revision {index}")))
    }

    fn lines_of(&self, index: usize) -> HistoryResult<Arc<[String]>> {
        let bytes = match self.revisions[index].content {
            Some(handle) => self.storage.load(handle)?,
            None => Vec::new(),
        };
        Ok(tokenize(&String::from_utf8_lossy(&bytes)))
    }
}
