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
//! Atomic groups of changes

use crate::change::Change;
use crate::entry::RootEntry;
use crate::error::HistoryResult;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Changes recorded inside one command, applied and reverted as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Position in the log, strictly increasing
    pub id: u64,
    /// Command label supplied by the host
    pub name: Option<String>,
    /// Milliseconds since the Unix epoch when the set was opened
    pub timestamp: i64,
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Empty set
    pub fn new(id: u64, name: Option<String>, timestamp: i64) -> Self {
        ChangeSet {
            id,
            name,
            timestamp,
            changes: Vec::new(),
        }
    }

    /// Members in application order
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Number of member changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// True when no change was recorded
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Append an already applied change
    pub(crate) fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Apply every member in order; on failure the applied prefix is reverted
    pub fn apply(&mut self, root: &mut RootEntry) -> HistoryResult<()> {
        for index in 0..self.changes.len() {
            if let Err(err) = self.changes[index].apply(root) {
                for applied in self.changes[..index].iter_mut().rev() {
                    if let Err(undo_err) = applied.revert(root) {
                        warn!(set = self.id, change = %applied, error = %undo_err, "Rollback failed");
                    }
                }
                return Err(err);
            }
            trace!(set = self.id, change = %self.changes[index], "Applied change");
        }
        Ok(())
    }

    /// Revert every member in reverse order; on failure the reverted suffix is re-applied
    pub fn revert(&mut self, root: &mut RootEntry) -> HistoryResult<()> {
        let len = self.changes.len();
        for index in (0..len).rev() {
            if let Err(err) = self.changes[index].revert(root) {
                for reverted in &mut self.changes[index + 1..] {
                    if let Err(redo_err) = reverted.apply(root) {
                        warn!(set = self.id, change = %reverted, error = %redo_err, "Rollback failed");
                    }
                }
                return Err(err);
            }
            trace!(set = self.id, change = %self.changes[index], "Reverted change");
        }
        Ok(())
    }

    /// True when every member is applied
    pub fn is_applied(&self) -> bool {
        self.changes.iter().all(Change::is_applied)
    }
}
