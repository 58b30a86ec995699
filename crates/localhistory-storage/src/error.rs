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

//! Storage error types and utilities

use crate::ContentHandle;
use localhistory_compression::CompressionError;
use std::io;
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during content storage operations
///
/// A failing call never corrupts records other than the one it addressed.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Handle was stored once but has since been removed
    #[error("record removed: {0}")]
    Removed(ContentHandle),

    /// Handle was never allocated by this storage
    #[error("invalid content handle: {0}")]
    InvalidHandle(ContentHandle),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index or data file does not match the expected layout
    #[error("corrupt storage: {0}")]
    Corrupt(String),

    /// Payload rejected before it reached the store
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Storage used after `close()`
    #[error("storage is closed")]
    Closed,

    /// Payload codec failure in the compressing wrapper
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

impl StorageError {
    /// Create a Corrupt error with context
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        StorageError::Corrupt(msg.into())
    }

    /// Create an InvalidPayload error with context
    pub fn invalid_payload<S: Into<String>>(msg: S) -> Self {
        StorageError::InvalidPayload(msg.into())
    }

    /// Check if the handle does not address a live record
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Removed(_) | StorageError::InvalidHandle(_))
    }

    /// Check if this is an I/O error
    pub fn is_io(&self) -> bool {
        matches!(self, StorageError::Io(_))
    }
}
