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
#![allow(clippy::unwrap_used)]
//! Property-based tests for the payload codecs
//!
//! - Roundtrip correctness for arbitrary bytes and source-like text
//! - Determinism
//! - Cross-decoding: any compressor passes foreign raw data through

use localhistory_compression::{
    BrotliCompressor, CompressionAlgorithm, CompressionLevel, Compressor, ZstdCompressor,
};
use proptest::prelude::*;

fn arb_binary_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..8000)
}

/// Newline separated lines of lowercase words, the shape of typical records
fn arb_source_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec("[a-z ]{0,40}", 0..200).prop_map(|lines| lines.join("\n").into_bytes())
}

#[test]
fn proptest_zstd_roundtrip() {
    proptest!(|(data in arb_binary_data())| {
        let compressor = ZstdCompressor::new(CompressionLevel::Fast);
        let compressed = compressor.compress(&data).unwrap();
        prop_assert_eq!(compressor.decompress(&compressed).unwrap(), data);
    });
}

#[test]
fn proptest_brotli_roundtrip() {
    proptest!(|(data in arb_source_text())| {
        let compressor = BrotliCompressor::new(CompressionLevel::Fast);
        let compressed = compressor.compress(&data).unwrap();
        prop_assert_eq!(compressor.decompress(&compressed).unwrap(), data);
    });
}

#[test]
fn proptest_zstd_determinism() {
    proptest!(|(data in arb_source_text())| {
        let compressor = ZstdCompressor::new(CompressionLevel::Default);
        prop_assert_eq!(compressor.compress(&data).unwrap(), compressor.compress(&data).unwrap());
    });
}

#[test]
fn proptest_detected_algorithm_matches_encoder() {
    proptest!(|(data in prop::collection::vec(any::<u8>(), 1..2000))| {
        let zstd = ZstdCompressor::fast().compress(&data).unwrap();
        prop_assert_eq!(CompressionAlgorithm::detect(&zstd), CompressionAlgorithm::Zstd);
    });
}
