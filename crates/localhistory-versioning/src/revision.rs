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
//! Per-file revisions derived from the change log

use localhistory_storage::ContentHandle;
use serde::{Deserialize, Serialize};

/// State of one file after a change set touched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Change set that produced this state, `None` for the state predating the log
    pub change_set_id: Option<u64>,
    /// Command label of that change set
    pub label: Option<String>,
    /// When the change set was recorded, or the file timestamp for the initial state
    pub timestamp: i64,
    /// Path of the file in this revision
    pub path: String,
    /// Content handle in this revision
    pub content: Option<ContentHandle>,
    /// File timestamp in this revision
    pub file_timestamp: i64,
}

impl Revision {
    /// True for the synthetic revision describing the file before any logged change
    pub fn is_initial(&self) -> bool {
        self.change_set_id.is_none()
    }
}
