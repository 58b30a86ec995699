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
//! History and diff error types

use crate::entry::EntryId;
use localhistory_storage::StorageError;
use std::io;
use thiserror::Error;

/// Result type alias for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Result type alias for the line diff
pub type DiffResult<T> = Result<T, DiffError>;

/// Errors raised by the entry tree, changes and the change log
///
/// Structural errors leave the tree exactly as it was before the failing call.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// No entry at the given path
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// An entry already occupies the given path
    #[error("entry already exists: {0}")]
    EntryExists(String),

    /// The parent directory of the given path does not exist
    #[error("parent directory not found for: {0}")]
    ParentNotFound(String),

    /// A path segment resolves to a file where a directory is required
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The entry at the given path is a directory where a file is required
    #[error("not a file: {0}")]
    NotAFile(String),

    /// The id is already used by another entry in the tree
    #[error("duplicate entry id: {0}")]
    DuplicateId(EntryId),

    /// Change or command used out of order (apply twice, revert before apply, ...)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Checkpoint does not address a state reachable from the current log
    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    /// Content storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Persisted history could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while persisting the history
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HistoryError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        HistoryError::EntryNotFound(path.into())
    }

    pub(crate) fn exists(path: impl Into<String>) -> Self {
        HistoryError::EntryExists(path.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        HistoryError::InvalidState(msg.into())
    }

    /// Check if this error is a structural precondition failure
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HistoryError::EntryNotFound(_)
                | HistoryError::EntryExists(_)
                | HistoryError::ParentNotFound(_)
                | HistoryError::NotADirectory(_)
                | HistoryError::NotAFile(_)
                | HistoryError::DuplicateId(_)
                | HistoryError::InvalidState(_)
        )
    }

    /// Check if the error means "no such entry"
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::EntryNotFound(_))
    }
}

impl From<postcard::Error> for HistoryError {
    fn from(err: postcard::Error) -> Self {
        HistoryError::Serialization(err.to_string())
    }
}

/// Errors raised by the line diff
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffError {
    /// The edit distance exceeds the configured bound
    #[error("diff too large: edit cost exceeds {cost_limit}")]
    TooLarge {
        /// Bound that was exceeded
        cost_limit: usize,
    },
}
