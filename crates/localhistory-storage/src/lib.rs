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

//! Content storage for the local history engine
//!
//! File contents captured by the history are kept in a record store: every
//! payload gets an integer [`ContentHandle`], records can be removed, and the
//! slots of removed records are reused by later writes so churn does not grow
//! the store without bound.
//!
//! # Implementations
//!
//! - [`FileContentStorage`]: index file + data file on disk, free-list reuse,
//!   compaction that keeps every live handle stable
//! - [`MemoryContentStorage`]: in-memory store for tests and ephemeral histories
//! - [`CompressingContentStorage`]: transparent wrapper compressing payloads
//!   before they reach any other storage
//!
//! # Examples
//!
//! ```rust
//! use localhistory_storage::{ContentStorage, MemoryContentStorage};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut storage = MemoryContentStorage::new();
//!
//!     let handle = storage.store(b"fn main() {}")?;
//!     assert_eq!(storage.load(handle)?, b"fn main() {}");
//!
//!     storage.remove(handle)?;
//!     assert!(storage.is_removed(handle));
//!     assert!(storage.load(handle).is_err());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! Storage is driven by the single thread that mutates the history. Calls are
//! synchronous and implementations do not lock internally.

pub mod compressing;
pub mod error;
pub mod file;
pub mod memory;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

pub use compressing::CompressingContentStorage;
pub use error::{StorageError, StorageResult};
pub use file::{FileContentStorage, FileStorageOptions};
pub use memory::MemoryContentStorage;

/// Opaque key of a stored payload
///
/// Handles start at 1 and are dense; a removed handle may be returned again
/// by a later [`ContentStorage::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(u32);

impl ContentHandle {
    /// Build a handle from its raw value
    ///
    /// Raw value 0 is never allocated and always reported as invalid.
    pub fn from_raw(raw: u32) -> Self {
        ContentHandle(raw)
    }

    /// Raw handle value
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Zero-based slot index, `None` for the reserved raw value 0
    pub(crate) fn slot(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }

    pub(crate) fn from_slot(slot: usize) -> Self {
        ContentHandle(slot as u32 + 1)
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point-in-time accounting of a storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Records that can be loaded
    pub live_records: usize,
    /// Removed slots waiting for reuse
    pub free_slots: usize,
    /// Bytes of live payloads
    pub live_bytes: u64,
    /// Physical size of the data region
    pub data_bytes: u64,
}

impl StorageStats {
    /// Bytes of the data region not holding live payloads
    pub fn wasted_bytes(&self) -> u64 {
        self.data_bytes.saturating_sub(self.live_bytes)
    }

    /// Share of the data region that is dead (0.0 for an empty store)
    pub fn wasted_ratio(&self) -> f64 {
        if self.data_bytes == 0 {
            0.0
        } else {
            self.wasted_bytes() as f64 / self.data_bytes as f64
        }
    }
}

/// Record-oriented payload store
///
/// # Error Handling
///
/// - `load` fails with [`StorageError::Removed`] or
///   [`StorageError::InvalidHandle`] when the handle is not live
/// - `remove` fails the same way for handles that are not live
/// - I/O failures surface as [`StorageError::Io`] for the failing call only
///
/// # Resource Discipline
///
/// Callers should `close()` a storage when done. Implementations backed by
/// files also flush on drop, so early returns on error paths do not lose the
/// index, but a failure at drop time can only be logged.
pub trait ContentStorage: Send + Debug {
    /// Persist a payload and return its handle
    fn store(&mut self, bytes: &[u8]) -> StorageResult<ContentHandle>;

    /// Read back a payload
    fn load(&self, handle: ContentHandle) -> StorageResult<Vec<u8>>;

    /// Free a record; its handle becomes available for reuse
    fn remove(&mut self, handle: ContentHandle) -> StorageResult<()>;

    /// True when the handle does not address a live record
    fn is_removed(&self, handle: ContentHandle) -> bool;

    /// Flush pending index changes
    fn save(&mut self) -> StorageResult<()>;

    /// Flush and release the underlying resources
    ///
    /// Every later call fails with [`StorageError::Closed`].
    fn close(&mut self) -> StorageResult<()>;

    /// Current accounting
    fn stats(&self) -> StorageStats;
}

impl<S: ContentStorage + ?Sized> ContentStorage for Box<S> {
    fn store(&mut self, bytes: &[u8]) -> StorageResult<ContentHandle> {
        (**self).store(bytes)
    }

    fn load(&self, handle: ContentHandle) -> StorageResult<Vec<u8>> {
        (**self).load(handle)
    }

    fn remove(&mut self, handle: ContentHandle) -> StorageResult<()> {
        (**self).remove(handle)
    }

    fn is_removed(&self, handle: ContentHandle) -> bool {
        (**self).is_removed(handle)
    }

    fn save(&mut self) -> StorageResult<()> {
        (**self).save()
    }

    fn close(&mut self) -> StorageResult<()> {
        (**self).close()
    }

    fn stats(&self) -> StorageStats {
        (**self).stats()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn handle_slots() {
        assert_eq!(ContentHandle::from_raw(0).slot(), None);
        assert_eq!(ContentHandle::from_raw(1).slot(), Some(0));
        assert_eq!(ContentHandle::from_slot(4).raw(), 5);
    }

    #[test]
    fn stats_waste() {
        let stats = StorageStats {
            live_records: 2,
            free_slots: 1,
            live_bytes: 30,
            data_bytes: 40,
        };
        assert_eq!(stats.wasted_bytes(), 10);
        assert_eq!(stats.wasted_ratio(), 0.25);
        assert_eq!(StorageStats::default().wasted_ratio(), 0.0);
    }
}
