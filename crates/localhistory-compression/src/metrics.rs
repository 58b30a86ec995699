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

//! Compression metrics and statistics

use crate::CompressionAlgorithm;
use serde::{Deserialize, Serialize};

/// Size accounting for one or more compressed payloads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionMetrics {
    /// Algorithm the payloads were encoded with
    pub algorithm: CompressionAlgorithm,
    /// Original data size in bytes
    pub original_size: usize,
    /// Compressed data size in bytes
    pub compressed_size: usize,
    /// Number of payloads accounted for
    pub operations: u64,
}

impl CompressionMetrics {
    /// Metrics for a single payload
    pub fn from_sizes(
        algorithm: CompressionAlgorithm,
        original_size: usize,
        compressed_size: usize,
    ) -> Self {
        Self {
            algorithm,
            original_size,
            compressed_size,
            operations: 1,
        }
    }

    /// Empty accumulator for the given algorithm
    pub fn empty(algorithm: CompressionAlgorithm) -> Self {
        Self {
            algorithm,
            original_size: 0,
            compressed_size: 0,
            operations: 0,
        }
    }

    /// Fold another payload's sizes into this accumulator
    pub fn record(&mut self, original_size: usize, compressed_size: usize) {
        self.original_size += original_size;
        self.compressed_size += compressed_size;
        self.operations += 1;
    }

    /// Compression ratio (original / compressed); 1.0 when nothing was stored
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            1.0
        } else {
            self.original_size as f64 / self.compressed_size as f64
        }
    }

    /// Bytes saved by compression (zero if the payloads expanded)
    pub fn space_saved(&self) -> usize {
        self.original_size.saturating_sub(self.compressed_size)
    }
}
