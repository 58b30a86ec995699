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

//! Transparent payload compression over any [`ContentStorage`]
//!
//! Payloads are encoded before they reach the wrapped storage and decoded on
//! load. The codec of a stored payload is recognised by its frame prefix, so a
//! store written with one algorithm stays readable after the configured
//! algorithm changes.

use crate::{ContentHandle, ContentStorage, StorageResult, StorageStats};
use localhistory_compression::{
    CompressionAlgorithm, CompressionLevel, CompressionMetrics, Compressor,
};
use tracing::{debug, trace};

/// Storage wrapper compressing every payload
#[derive(Debug)]
pub struct CompressingContentStorage<S> {
    inner: S,
    compressor: Box<dyn Compressor>,
    level: CompressionLevel,
    metrics: CompressionMetrics,
}

impl<S: ContentStorage> CompressingContentStorage<S> {
    /// Wrap `inner`, encoding payloads with `compressor`
    pub fn new(inner: S, compressor: Box<dyn Compressor>, level: CompressionLevel) -> Self {
        let metrics = CompressionMetrics::empty(compressor.algorithm());
        Self {
            inner,
            compressor,
            level,
            metrics,
        }
    }

    /// Wrap `inner` with the compressor for `algorithm`
    ///
    /// Returns `None` for [`CompressionAlgorithm::None`].
    pub fn with_algorithm(
        inner: S,
        algorithm: CompressionAlgorithm,
        level: CompressionLevel,
    ) -> Option<Self> {
        algorithm
            .compressor(level)
            .map(|compressor| Self::new(inner, compressor, level))
    }

    /// Sizes of every payload stored through this wrapper
    pub fn metrics(&self) -> &CompressionMetrics {
        &self.metrics
    }

    /// The wrapped storage
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Mutable access to the wrapped storage
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap into the inner storage
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ContentStorage> ContentStorage for CompressingContentStorage<S> {
    fn store(&mut self, bytes: &[u8]) -> StorageResult<ContentHandle> {
        let encoded = self.compressor.compress(bytes)?;
        let handle = self.inner.store(&encoded)?;
        self.metrics.record(bytes.len(), encoded.len());
        trace!(
            handle = %handle,
            original = bytes.len(),
            stored = encoded.len(),
            "Stored compressed payload"
        );
        Ok(handle)
    }

    fn load(&self, handle: ContentHandle) -> StorageResult<Vec<u8>> {
        let stored = self.inner.load(handle)?;
        let algorithm = CompressionAlgorithm::detect(&stored);
        if algorithm == self.compressor.algorithm() {
            return Ok(self.compressor.decompress(&stored)?);
        }
        match algorithm.compressor(self.level) {
            Some(codec) => Ok(codec.decompress(&stored)?),
            None => Ok(stored),
        }
    }

    fn remove(&mut self, handle: ContentHandle) -> StorageResult<()> {
        self.inner.remove(handle)
    }

    fn is_removed(&self, handle: ContentHandle) -> bool {
        self.inner.is_removed(handle)
    }

    fn save(&mut self) -> StorageResult<()> {
        debug!(
            algorithm = %self.metrics.algorithm,
            payloads = self.metrics.operations,
            ratio = self.metrics.ratio(),
            saved = self.metrics.space_saved(),
            "Compression totals"
        );
        self.inner.save()
    }

    fn close(&mut self) -> StorageResult<()> {
        self.inner.close()
    }

    fn stats(&self) -> StorageStats {
        self.inner.stats()
    }
}
