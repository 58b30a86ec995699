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

//! File-backed record store
//!
//! Two files live side by side in the storage directory:
//!
//! ```text
//! <stem>.idx   index: header + one fixed-size record per handle
//! <stem>.dat   payload bytes, addressed by the index
//! ```
//!
//! Index layout (little endian):
//!
//! ```text
//! magic "LHIX" | version u32 | count u32 | data_len u64
//! count x { offset u64 | capacity u32 | length u32 | flags u8 }
//! ```
//!
//! Payloads are appended to the data file. Removing a record puts its slot on
//! a free-list; the next `store` picks the free slot with the smallest
//! capacity that still fits the payload and overwrites it in place. When no
//! free slot is large enough, the lowest free handle is reused and its payload
//! goes to the end of the data file. Only when the free-list is empty does the
//! handle space grow.
//!
//! Only slots whose removal has reached the index file are overwritten in
//! place. A slot freed since the last save still reads as live on disk, so
//! until then it can only lend its handle to an appended payload. A crash
//! before `save` therefore leaves every record the old index names intact.
//!
//! Space that no live record covers is reclaimed by [`FileContentStorage::compact`],
//! which rewrites the data file densely without changing any live handle.
//! `save` compacts automatically once the dead share of the data file exceeds
//! [`FileStorageOptions::compaction_threshold`].

use crate::{ContentHandle, ContentStorage, StorageError, StorageResult, StorageStats};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const INDEX_MAGIC: &[u8; 4] = b"LHIX";
const INDEX_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
const RECORD_LEN: usize = 8 + 4 + 4 + 1;
const FLAG_LIVE: u8 = 1;

/// Tuning knobs for [`FileContentStorage`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileStorageOptions {
    /// Dead share of the data file above which `save` compacts first
    ///
    /// Values of 1.0 or more disable automatic compaction.
    pub compaction_threshold: f64,
}

impl Default for FileStorageOptions {
    fn default() -> Self {
        Self {
            compaction_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    offset: u64,
    capacity: u32,
    length: u32,
    live: bool,
}

/// Record store persisted as an index file plus a data file
pub struct FileContentStorage {
    index_path: PathBuf,
    data_path: PathBuf,
    data: Option<File>,
    slots: Vec<Slot>,
    /// Free slots ordered by (capacity, slot) for best-fit lookup
    free_by_capacity: BTreeSet<(u32, usize)>,
    /// Free slots ordered by slot for lowest-handle reuse
    free_by_slot: BTreeSet<usize>,
    /// Slots freed since the index was last written
    unsaved_free: BTreeSet<usize>,
    data_end: u64,
    live_bytes: u64,
    dirty: bool,
    options: FileStorageOptions,
}

impl FileContentStorage {
    /// Open or create the storage `<dir>/<stem>.idx` + `<dir>/<stem>.dat`
    ///
    /// # Errors
    ///
    /// * [`StorageError::Corrupt`] if the index does not describe the data file
    /// * [`StorageError::Io`] if the directory or files cannot be opened
    pub fn open<P: AsRef<Path>>(
        dir: P,
        stem: &str,
        options: FileStorageOptions,
    ) -> StorageResult<Self> {
        if stem.is_empty() {
            return Err(StorageError::invalid_payload("file stem cannot be empty"));
        }
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let index_path = dir.join(format!("{stem}.idx"));
        let data_path = dir.join(format!("{stem}.dat"));

        let data = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&data_path)?;
        let physical_len = data.metadata()?.len();

        let (slots, data_end) = if index_path.exists() {
            let bytes = fs::read(&index_path)?;
            decode_index(&bytes)?
        } else {
            (Vec::new(), 0)
        };

        if data_end > physical_len {
            return Err(StorageError::corrupt(format!(
                "index covers {data_end} bytes but {} holds {physical_len}",
                data_path.display()
            )));
        }
        if physical_len > data_end {
            // Bytes appended after the last index save are unreachable.
            data.set_len(data_end)?;
        }

        let mut storage = Self {
            index_path,
            data_path,
            data: Some(data),
            slots: Vec::new(),
            free_by_capacity: BTreeSet::new(),
            free_by_slot: BTreeSet::new(),
            unsaved_free: BTreeSet::new(),
            data_end,
            live_bytes: 0,
            dirty: false,
            options,
        };
        storage.install_slots(slots);

        debug!(
            path = %storage.data_path.display(),
            records = storage.slots.len(),
            live_bytes = storage.live_bytes,
            data_bytes = storage.data_end,
            "Opened content storage"
        );
        Ok(storage)
    }

    /// Statistics of a stored index without opening the store
    ///
    /// Reads `<dir>/<stem>.idx` only, so nothing on disk changes; in
    /// particular an unsaved data tail is left in place. A missing index
    /// reads as an empty store.
    pub fn inspect<P: AsRef<Path>>(dir: P, stem: &str) -> StorageResult<StorageStats> {
        let index_path = dir.as_ref().join(format!("{stem}.idx"));
        if !index_path.exists() {
            return Ok(StorageStats::default());
        }
        let (slots, data_end) = decode_index(&fs::read(&index_path)?)?;
        let live = slots.iter().filter(|slot| slot.live);
        Ok(StorageStats {
            live_records: live.clone().count(),
            free_slots: slots.iter().filter(|slot| !slot.live).count(),
            live_bytes: live.map(|slot| u64::from(slot.length)).sum(),
            data_bytes: data_end,
        })
    }

    /// Open with default options
    pub fn open_default<P: AsRef<Path>>(dir: P, stem: &str) -> StorageResult<Self> {
        Self::open(dir, stem, FileStorageOptions::default())
    }

    /// Path of the index file
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Path of the data file
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Rewrite the data file without dead space
    ///
    /// Every live handle keeps addressing the same payload. Free slots keep
    /// their handles but lose their capacity, so later writes that reuse them
    /// append. Returns the number of bytes reclaimed.
    pub fn compact(&mut self) -> StorageResult<u64> {
        self.file()?;
        let before = self.data_end;
        let tmp_path = self.data_path.with_extension("dat.tmp");

        let mut compacted = self.slots.clone();
        {
            let tmp = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(tmp);
            let mut offset = 0u64;
            let mut buf = Vec::new();
            for slot in compacted.iter_mut() {
                if slot.live {
                    buf.resize(slot.length as usize, 0);
                    self.read_region(slot.offset, &mut buf)?;
                    writer.write_all(&buf)?;
                    *slot = Slot {
                        offset,
                        capacity: slot.length,
                        length: slot.length,
                        live: true,
                    };
                    offset += u64::from(slot.length);
                } else {
                    *slot = Slot::default();
                }
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        // Release the old handle before the replacement takes its name.
        self.data = None;
        fs::rename(&tmp_path, &self.data_path)?;
        self.data = Some(
            OpenOptions::new()
                .read(true)
                .write(true)
                .open(&self.data_path)?,
        );

        self.install_slots(compacted);
        self.data_end = self.live_bytes;
        self.write_index()?;
        self.dirty = false;

        let reclaimed = before - self.data_end;
        info!(
            path = %self.data_path.display(),
            reclaimed_bytes = reclaimed,
            data_bytes = self.data_end,
            "Compacted content storage"
        );
        Ok(reclaimed)
    }

    fn install_slots(&mut self, slots: Vec<Slot>) {
        self.free_by_capacity.clear();
        self.free_by_slot.clear();
        self.live_bytes = 0;
        for (index, slot) in slots.iter().enumerate() {
            if slot.live {
                self.live_bytes += u64::from(slot.length);
            } else {
                self.free_by_capacity.insert((slot.capacity, index));
                self.free_by_slot.insert(index);
            }
        }
        self.slots = slots;
    }

    fn file(&self) -> StorageResult<&File> {
        self.data.as_ref().ok_or(StorageError::Closed)
    }

    fn read_region(&self, offset: u64, buf: &mut [u8]) -> StorageResult<()> {
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_region(&self, offset: u64, bytes: &[u8]) -> StorageResult<()> {
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn live_slot(&self, handle: ContentHandle) -> StorageResult<Slot> {
        let slot = handle
            .slot()
            .and_then(|index| self.slots.get(index))
            .ok_or(StorageError::InvalidHandle(handle))?;
        if slot.live {
            Ok(*slot)
        } else {
            Err(StorageError::Removed(handle))
        }
    }

    fn take_free_slot(&mut self, index: usize) {
        let capacity = self.slots[index].capacity;
        self.free_by_capacity.remove(&(capacity, index));
        self.free_by_slot.remove(&index);
    }

    fn write_index(&mut self) -> StorageResult<()> {
        let tmp_path = self.index_path.with_extension("idx.tmp");
        let bytes = encode_index(&self.slots, self.data_end);
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&bytes)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.index_path)?;
        self.unsaved_free.clear();
        Ok(())
    }
}

impl ContentStorage for FileContentStorage {
    fn store(&mut self, bytes: &[u8]) -> StorageResult<ContentHandle> {
        self.file()?;
        let length = u32::try_from(bytes.len()).map_err(|_| {
            StorageError::invalid_payload(format!("payload of {} bytes is too large", bytes.len()))
        })?;

        let best_fit = self
            .free_by_capacity
            .range((length, 0)..)
            .find(|(_, index)| !self.unsaved_free.contains(index))
            .map(|&(_, index)| index);

        let index = match best_fit {
            Some(index) => {
                let offset = self.slots[index].offset;
                self.write_region(offset, bytes)?;
                self.take_free_slot(index);
                let slot = &mut self.slots[index];
                slot.length = length;
                slot.live = true;
                index
            }
            None => {
                let offset = self.data_end;
                self.write_region(offset, bytes)?;
                self.data_end += u64::from(length);
                let slot = Slot {
                    offset,
                    capacity: length,
                    length,
                    live: true,
                };
                match self.free_by_slot.first().copied() {
                    Some(index) => {
                        self.take_free_slot(index);
                        self.slots[index] = slot;
                        index
                    }
                    None => {
                        self.slots.push(slot);
                        self.slots.len() - 1
                    }
                }
            }
        };

        self.live_bytes += u64::from(length);
        self.dirty = true;
        Ok(ContentHandle::from_slot(index))
    }

    fn load(&self, handle: ContentHandle) -> StorageResult<Vec<u8>> {
        let slot = self.live_slot(handle)?;
        let mut buf = vec![0u8; slot.length as usize];
        self.read_region(slot.offset, &mut buf)?;
        Ok(buf)
    }

    fn remove(&mut self, handle: ContentHandle) -> StorageResult<()> {
        self.file()?;
        let slot = self.live_slot(handle)?;
        let index = handle.slot().ok_or(StorageError::InvalidHandle(handle))?;

        self.slots[index].live = false;
        self.slots[index].length = 0;
        self.free_by_capacity.insert((slot.capacity, index));
        self.free_by_slot.insert(index);
        self.unsaved_free.insert(index);
        self.live_bytes -= u64::from(slot.length);
        self.dirty = true;
        Ok(())
    }

    fn is_removed(&self, handle: ContentHandle) -> bool {
        self.live_slot(handle).is_err()
    }

    fn save(&mut self) -> StorageResult<()> {
        let file = self.file()?;
        file.sync_data()?;

        if self.stats().wasted_ratio() > self.options.compaction_threshold {
            self.compact()?;
            return Ok(());
        }
        if self.dirty {
            self.write_index()?;
            self.dirty = false;
        }
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.save()?;
        self.data = None;
        debug!(path = %self.data_path.display(), "Closed content storage");
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        StorageStats {
            live_records: self.slots.len() - self.free_by_slot.len(),
            free_slots: self.free_by_slot.len(),
            live_bytes: self.live_bytes,
            data_bytes: self.data_end,
        }
    }
}

impl Drop for FileContentStorage {
    fn drop(&mut self) {
        if self.data.is_some() && self.dirty {
            if let Err(err) = self.save() {
                warn!(
                    path = %self.index_path.display(),
                    error = %err,
                    "Failed to save content storage on drop"
                );
            }
        }
    }
}

impl fmt::Debug for FileContentStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileContentStorage")
            .field("data_path", &self.data_path)
            .field("records", &self.slots.len())
            .field("free_slots", &self.free_by_slot.len())
            .field("data_bytes", &self.data_end)
            .field("closed", &self.data.is_none())
            .finish()
    }
}

fn encode_index(slots: &[Slot], data_len: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + slots.len() * RECORD_LEN);
    out.extend_from_slice(INDEX_MAGIC);
    out.extend_from_slice(&INDEX_VERSION.to_le_bytes());
    out.extend_from_slice(&(slots.len() as u32).to_le_bytes());
    out.extend_from_slice(&data_len.to_le_bytes());
    for slot in slots {
        out.extend_from_slice(&slot.offset.to_le_bytes());
        out.extend_from_slice(&slot.capacity.to_le_bytes());
        out.extend_from_slice(&slot.length.to_le_bytes());
        out.push(if slot.live { FLAG_LIVE } else { 0 });
    }
    out
}

fn decode_index(bytes: &[u8]) -> StorageResult<(Vec<Slot>, u64)> {
    if bytes.len() < HEADER_LEN {
        return Err(StorageError::corrupt("index header truncated"));
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err(StorageError::corrupt("bad index magic"));
    }
    let version = read_u32(&bytes[4..8]);
    if version != INDEX_VERSION {
        return Err(StorageError::corrupt(format!(
            "unsupported index version {version}"
        )));
    }
    let count = read_u32(&bytes[8..12]) as usize;
    let data_len = read_u64(&bytes[12..20]);

    let body = &bytes[HEADER_LEN..];
    if body.len() != count * RECORD_LEN {
        return Err(StorageError::corrupt(format!(
            "index declares {count} records but holds {} bytes of records",
            body.len()
        )));
    }

    let mut slots = Vec::with_capacity(count);
    for (index, record) in body.chunks_exact(RECORD_LEN).enumerate() {
        let slot = Slot {
            offset: read_u64(&record[0..8]),
            capacity: read_u32(&record[8..12]),
            length: read_u32(&record[12..16]),
            live: record[16] & FLAG_LIVE != 0,
        };
        let end = slot.offset.checked_add(u64::from(slot.capacity));
        if slot.length > slot.capacity || end.is_none_or(|end| end > data_len) {
            return Err(StorageError::corrupt(format!(
                "record {} lies outside the data file",
                ContentHandle::from_slot(index)
            )));
        }
        slots.push(slot);
    }
    Ok((slots, data_len))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}
