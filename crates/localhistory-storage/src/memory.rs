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

//! In-memory record store
//!
//! Used by tests and by histories that do not outlive the process. Removed
//! handles are handed out again lowest first.

use crate::{ContentHandle, ContentStorage, StorageError, StorageResult, StorageStats};
use std::collections::BTreeSet;

/// Record store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryContentStorage {
    records: Vec<Option<Vec<u8>>>,
    free: BTreeSet<usize>,
    live_bytes: u64,
    closed: bool,
}

impl MemoryContentStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    fn live(&self, handle: ContentHandle) -> StorageResult<&Vec<u8>> {
        match handle.slot().and_then(|index| self.records.get(index)) {
            Some(Some(bytes)) => Ok(bytes),
            Some(None) => Err(StorageError::Removed(handle)),
            None => Err(StorageError::InvalidHandle(handle)),
        }
    }
}

impl ContentStorage for MemoryContentStorage {
    fn store(&mut self, bytes: &[u8]) -> StorageResult<ContentHandle> {
        self.ensure_open()?;
        let index = match self.free.pop_first() {
            Some(index) => {
                self.records[index] = Some(bytes.to_vec());
                index
            }
            None => {
                self.records.push(Some(bytes.to_vec()));
                self.records.len() - 1
            }
        };
        self.live_bytes += bytes.len() as u64;
        Ok(ContentHandle::from_slot(index))
    }

    fn load(&self, handle: ContentHandle) -> StorageResult<Vec<u8>> {
        self.ensure_open()?;
        self.live(handle).cloned()
    }

    fn remove(&mut self, handle: ContentHandle) -> StorageResult<()> {
        self.ensure_open()?;
        let length = self.live(handle)?.len() as u64;
        if let Some(index) = handle.slot() {
            self.records[index] = None;
            self.free.insert(index);
        }
        self.live_bytes -= length;
        Ok(())
    }

    fn is_removed(&self, handle: ContentHandle) -> bool {
        self.live(handle).is_err()
    }

    fn save(&mut self) -> StorageResult<()> {
        self.ensure_open()
    }

    fn close(&mut self) -> StorageResult<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        StorageStats {
            live_records: self.records.len() - self.free.len(),
            free_slots: self.free.len(),
            live_bytes: self.live_bytes,
            data_bytes: self.live_bytes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_free_handle_reused_first() {
        let mut storage = MemoryContentStorage::new();
        let handles: Vec<_> = (0..4u8).map(|i| storage.store(&[i]).unwrap()).collect();

        storage.remove(handles[2]).unwrap();
        storage.remove(handles[0]).unwrap();

        assert_eq!(storage.store(b"x").unwrap(), handles[0]);
        assert_eq!(storage.store(b"y").unwrap(), handles[2]);
        assert_eq!(storage.store(b"z").unwrap().raw(), 5);
    }

    #[test]
    fn test_stats_track_live_bytes() {
        let mut storage = MemoryContentStorage::new();
        let a = storage.store(b"hello").unwrap();
        storage.store(b"world!").unwrap();
        storage.remove(a).unwrap();

        let stats = storage.stats();
        assert_eq!(stats.live_records, 1);
        assert_eq!(stats.free_slots, 1);
        assert_eq!(stats.live_bytes, 6);
        assert_eq!(stats.wasted_bytes(), 0);
    }

    #[test]
    fn test_errors() {
        let mut storage = MemoryContentStorage::new();
        let a = storage.store(b"a").unwrap();
        storage.remove(a).unwrap();

        assert!(matches!(storage.remove(a), Err(StorageError::Removed(_))));
        assert!(matches!(
            storage.load(ContentHandle::from_raw(9)),
            Err(StorageError::InvalidHandle(_))
        ));

        storage.close().unwrap();
        assert!(matches!(storage.store(b"b"), Err(StorageError::Closed)));
    }
}
