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

//! Brotli compression implementation
//!
//! Higher compression ratios with slower compression speed. Suited to
//! archival history stores that are written once and rarely compacted.

use crate::error::{CompressionError, CompressionResult};
use crate::{CompressionAlgorithm, CompressionLevel, Compressor, BROTLI_MAGIC};
use std::fmt;
use std::io::{Cursor, Write};

/// Window size used for every stream (larger = better ratio, more memory)
const BROTLI_WINDOW: u32 = 22;

/// Internal buffer size of the streaming encoder
const BROTLI_BUFFER: usize = 4096;

/// Brotli compressor implementation
#[derive(Clone)]
pub struct BrotliCompressor {
    level: CompressionLevel,
}

impl BrotliCompressor {
    /// Create a new Brotli compressor with the given compression level
    pub fn new(level: CompressionLevel) -> Self {
        BrotliCompressor { level }
    }
}

impl fmt::Debug for BrotliCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrotliCompressor")
            .field("level", &self.level)
            .finish()
    }
}

impl Compressor for BrotliCompressor {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut output = Vec::with_capacity(data.len() / 2 + BROTLI_MAGIC.len());
        output.extend_from_slice(BROTLI_MAGIC);

        // The writer finishes the stream when dropped at the end of this block
        {
            let mut encoder = brotli::CompressorWriter::new(
                &mut output,
                BROTLI_BUFFER,
                self.level.to_brotli_level(),
                BROTLI_WINDOW,
            );
            encoder.write_all(data).map_err(|e| {
                CompressionError::compression_failed(format!("brotli compression failed: {}", e))
            })?;
            encoder.flush().map_err(|e| {
                CompressionError::compression_failed(format!("brotli flush failed: {}", e))
            })?;
        }

        Ok(output)
    }

    fn decompress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        let Some(stream) = data.strip_prefix(BROTLI_MAGIC.as_slice()) else {
            return Ok(data.to_vec());
        };

        let mut output = Vec::with_capacity(stream.len() * 3);
        brotli::BrotliDecompress(&mut Cursor::new(stream), &mut output).map_err(|e| {
            CompressionError::decompression_failed(format!("brotli decompression failed: {}", e))
        })?;
        Ok(output)
    }

    fn algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::Brotli
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_brotli_roundtrip() {
        let compressor = BrotliCompressor::new(CompressionLevel::Default);
        let original = b"class A {\n  void run() {}\n}\n".repeat(20);

        let compressed = compressor.compress(&original).unwrap();
        assert!(compressed.starts_with(BROTLI_MAGIC));
        assert_eq!(compressor.decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_brotli_empty_is_empty() {
        let compressor = BrotliCompressor::new(CompressionLevel::Fast);
        assert!(compressor.compress(b"").unwrap().is_empty());
        assert!(compressor.decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_brotli_passes_through_raw_data() {
        let compressor = BrotliCompressor::new(CompressionLevel::Fast);
        assert_eq!(compressor.decompress(b"raw bytes").unwrap(), b"raw bytes");
    }

    #[test]
    fn test_brotli_debug_format() {
        let debug_str = format!("{:?}", BrotliCompressor::new(CompressionLevel::Best));
        assert!(debug_str.contains("BrotliCompressor"));
        assert!(debug_str.contains("Best"));
    }
}
