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

//! Payload compression for the local history content store
//!
//! Record payloads (file contents captured by the history) are mostly source
//! text, which compresses well. This crate provides:
//! - **Zstd compression**: fast, good ratios (default)
//! - **Brotli compression**: higher ratios, slower (for archival stores)
//! - **Auto-detection**: frames are recognised by their magic prefix, so data
//!   written without compression still loads
//!
//! # Quick Start
//!
//! ```rust
//! use localhistory_compression::{Compressor, CompressionLevel, ZstdCompressor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let compressor = ZstdCompressor::new(CompressionLevel::Default);
//!
//!     let original = b"fn main() {}\n";
//!     let compressed = compressor.compress(original)?;
//!     let decompressed = compressor.decompress(&compressed)?;
//!
//!     assert_eq!(original, &decompressed[..]);
//!     Ok(())
//! }
//! ```

pub mod brotli_compressor;
pub mod error;
pub mod metrics;
pub mod zstd_compressor;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

pub use brotli_compressor::BrotliCompressor;
pub use error::{CompressionError, CompressionResult};
pub use metrics::CompressionMetrics;
pub use zstd_compressor::ZstdCompressor;

/// Magic prefix of a zstd frame
pub(crate) const ZSTD_MAGIC: &[u8; 4] = b"\x28\xb5\x2f\xfd";

/// Marker prefix written in front of brotli streams
pub(crate) const BROTLI_MAGIC: &[u8; 4] = b"BRT\x01";

/// Compression level configuration
///
/// Balances compression speed vs compression ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Fast compression, larger output (level 1 for zstd, 4 for brotli)
    Fast,
    /// Default balance (level 3 for zstd, 9 for brotli)
    #[default]
    Default,
    /// Best compression, slower (level 19 for zstd, 11 for brotli)
    Best,
}

impl CompressionLevel {
    /// Convert to zstd compression level
    pub fn to_zstd_level(self) -> i32 {
        match self {
            CompressionLevel::Fast => 1,
            CompressionLevel::Default => 3,
            CompressionLevel::Best => 19,
        }
    }

    /// Convert to brotli compression level (0-11)
    pub fn to_brotli_level(self) -> u32 {
        match self {
            CompressionLevel::Fast => 4,
            CompressionLevel::Default => 9,
            CompressionLevel::Best => 11,
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(CompressionLevel::Fast),
            "default" => Ok(CompressionLevel::Default),
            "best" => Ok(CompressionLevel::Best),
            other => Err(CompressionError::invalid_input(format!(
                "unknown compression level '{}', expected fast, default or best",
                other
            ))),
        }
    }
}

/// Compression algorithm identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CompressionAlgorithm {
    /// No compression (raw data)
    None = 0,
    /// Zstd compression
    #[default]
    Zstd = 1,
    /// Brotli compression
    Brotli = 2,
}

impl CompressionAlgorithm {
    /// Get magic bytes that identify this algorithm
    pub fn magic_bytes(self) -> &'static [u8] {
        match self {
            CompressionAlgorithm::None => b"",
            CompressionAlgorithm::Zstd => ZSTD_MAGIC,
            CompressionAlgorithm::Brotli => BROTLI_MAGIC,
        }
    }

    /// Detect compression algorithm from data
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(ZSTD_MAGIC) {
            CompressionAlgorithm::Zstd
        } else if data.starts_with(BROTLI_MAGIC) {
            CompressionAlgorithm::Brotli
        } else {
            CompressionAlgorithm::None
        }
    }

    /// Build the compressor for this algorithm
    ///
    /// Returns `None` for [`CompressionAlgorithm::None`]; callers store
    /// payloads as-is in that case.
    pub fn compressor(self, level: CompressionLevel) -> Option<Box<dyn Compressor>> {
        match self {
            CompressionAlgorithm::None => None,
            CompressionAlgorithm::Zstd => Some(Box::new(ZstdCompressor::new(level))),
            CompressionAlgorithm::Brotli => Some(Box::new(BrotliCompressor::new(level))),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionAlgorithm::None => "none",
            CompressionAlgorithm::Zstd => "zstd",
            CompressionAlgorithm::Brotli => "brotli",
        };
        f.write_str(name)
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "raw" => Ok(CompressionAlgorithm::None),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "brotli" => Ok(CompressionAlgorithm::Brotli),
            other => Err(CompressionError::unsupported_algorithm(other)),
        }
    }
}

/// Compressor trait for pluggable compression implementations
///
/// Implementations must be transparent: `decompress(compress(x)) == x` for
/// every input, including the empty slice.
pub trait Compressor: Send + Sync + Debug {
    /// Compress data
    ///
    /// # Errors
    ///
    /// Returns `CompressionError` if compression fails
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>>;

    /// Decompress data
    ///
    /// Data that does not carry this compressor's frame prefix is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CompressionError` if decompression fails
    fn decompress(&self, data: &[u8]) -> CompressionResult<Vec<u8>>;

    /// Algorithm implemented by this compressor
    fn algorithm(&self) -> CompressionAlgorithm;

    /// Get compression metrics for data
    fn metrics(&self, original: &[u8], compressed: &[u8]) -> CompressionMetrics {
        CompressionMetrics::from_sizes(self.algorithm(), original.len(), compressed.len())
    }
}
