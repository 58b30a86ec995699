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

//! Zstd compression implementation
//!
//! Default codec for history records: fast in both directions, which matters
//! when the selection calculator reloads dozens of revisions in a row.

use crate::error::{CompressionError, CompressionResult};
use crate::{CompressionAlgorithm, CompressionLevel, Compressor, ZSTD_MAGIC};
use std::fmt;

/// Zstd compressor implementation
#[derive(Clone)]
pub struct ZstdCompressor {
    level: CompressionLevel,
}

impl ZstdCompressor {
    /// Create a new Zstd compressor with the given compression level
    pub fn new(level: CompressionLevel) -> Self {
        ZstdCompressor { level }
    }

    /// Create a Zstd compressor with fast compression
    pub fn fast() -> Self {
        ZstdCompressor::new(CompressionLevel::Fast)
    }

    /// Create a Zstd compressor with best compression
    pub fn best() -> Self {
        ZstdCompressor::new(CompressionLevel::Best)
    }
}

impl fmt::Debug for ZstdCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdCompressor")
            .field("level", &self.level)
            .finish()
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        // Empty records stay empty so zero-length payloads cost no data bytes
        if data.is_empty() {
            return Ok(Vec::new());
        }

        zstd::encode_all(data, self.level.to_zstd_level()).map_err(|e| {
            CompressionError::compression_failed(format!("zstd compression failed: {}", e))
        })
    }

    fn decompress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        if !data.starts_with(ZSTD_MAGIC) {
            return Ok(data.to_vec());
        }

        zstd::decode_all(data).map_err(|e| {
            CompressionError::decompression_failed(format!("zstd decompression failed: {}", e))
        })
    }

    fn algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::Zstd
    }
}
