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

//! Compression error types

use thiserror::Error;

/// Result type alias for compression operations
pub type CompressionResult<T> = Result<T, CompressionError>;

/// Errors that can occur while encoding or decoding record payloads
#[derive(Error, Debug)]
pub enum CompressionError {
    /// Compression operation failed
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Decompression operation failed (truncated or corrupt frame)
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// Invalid input data or option
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported compression algorithm
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl CompressionError {
    /// Create a compression failed error
    pub fn compression_failed<S: Into<String>>(msg: S) -> Self {
        CompressionError::CompressionFailed(msg.into())
    }

    /// Create a decompression failed error
    pub fn decompression_failed<S: Into<String>>(msg: S) -> Self {
        CompressionError::DecompressionFailed(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        CompressionError::InvalidInput(msg.into())
    }

    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm<S: Into<String>>(algorithm: S) -> Self {
        CompressionError::UnsupportedAlgorithm(algorithm.into())
    }

    /// Check if this is a decompression failure
    pub fn is_decompression_failed(&self) -> bool {
        matches!(self, CompressionError::DecompressionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompression_error_creation() {
        let err = CompressionError::decompression_failed("truncated frame");
        assert!(err.is_decompression_failed());
        assert_eq!(err.to_string(), "decompression failed: truncated frame");
    }

    #[test]
    fn test_unsupported_algorithm_error() {
        let err = CompressionError::unsupported_algorithm("lz4");
        assert_eq!(err.to_string(), "unsupported algorithm: lz4");
        assert!(!err.is_decompression_failed());
    }
}
