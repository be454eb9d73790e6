// In: src/error.rs

//! This module defines the single, unified error type for the entire mosaic codec.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MosaicError {
    // =========================================================================
    // === Layout Errors (the chunk bytes or its index are inconsistent)
    // =========================================================================
    #[error("Malformed chunk layout: {0}")]
    MalformedLayout(String),

    #[error("Dictionary orders are not a permutation of [0, {origins}): {detail}")]
    InvalidPermutation { origins: usize, detail: String },

    #[error("Chunk index has no statistic for pixel {pixel_id} ({available} available)")]
    MissingPixelStatistic { pixel_id: usize, available: usize },

    // =========================================================================
    // === Resource Errors (programming errors, always fatal)
    // =========================================================================
    #[error("Resource already closed: {0}")]
    ResourceClosed(&'static str),

    // =========================================================================
    // === Capacity / Argument Errors (rejected eagerly)
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Column vector type mismatch: expected {expected}, got {actual}")]
    VectorTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while (de)serializing chunk metadata.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A string span in the chunk did not hold valid UTF-8.
    #[error("Invalid UTF-8 in string column: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("RLE decoding error: {0}")]
    RleDecodeError(String),

    #[error("LEB128 decoding error: {0}")]
    Leb128DecodeError(String),

    #[error("Bitmap decoding failed: need {needed} bytes from offset {offset}, buffer has {available}")]
    BitpackDecodeError {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Dictionary encoding/decoding failed: {0}")]
    DictionaryError(String),
}

impl MosaicError {
    /// Returns `true` for errors caused by the chunk bytes or chunk index rather
    /// than by the caller.
    pub fn is_malformed_layout(&self) -> bool {
        matches!(
            self,
            Self::MalformedLayout(_)
                | Self::InvalidPermutation { .. }
                | Self::MissingPixelStatistic { .. }
                | Self::RleDecodeError(_)
                | Self::Leb128DecodeError(_)
                | Self::BitpackDecodeError { .. }
                | Self::DictionaryError(_)
                | Self::Utf8(_)
        )
    }
}
