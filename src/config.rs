// In: src/config.rs

//! The single source of truth for column writer configuration.
//!
//! `WriterOptions` is created once at the boundary (e.g., from a JSON table
//! property blob) and handed to every column writer of a row group. Readers
//! need no configuration: everything they need travels in the chunk index and
//! the column encoding.

use serde::{Deserialize, Serialize};

use crate::error::MosaicError;
use crate::types::ByteOrder;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// How aggressively writers encode column content.
///
/// Levels are ordered: each level enables everything the previous one does.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EncodingLevel {
    /// No encoding: fixed-width slots and plain strings only.
    El0,
    /// Run-length encoding for integer columns.
    El1,
    /// **Default:** additionally dictionary-encodes low-cardinality string columns.
    #[default]
    El2,
}

//==================================================================================
// II. The Unified WriterOptions
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct WriterOptions {
    /// Rows per pixel. The last pixel of a chunk may be shorter.
    #[serde(default = "default_pixel_stride")]
    pub pixel_stride: usize,

    #[serde(default)]
    pub encoding_level: EncodingLevel,

    /// Byte order of fixed-width values, footers and null bitmap bits.
    #[serde(default)]
    pub byte_order: ByteOrder,

    /// If true, null rows of fixed-width columns still occupy a zeroed slot.
    #[serde(default)]
    pub nulls_padding: bool,

    /// The isNull section starts on a multiple of this many bytes; 0 disables
    /// alignment.
    #[serde(default = "default_is_null_alignment")]
    pub is_null_alignment: u32,

    /// A string chunk is dictionary encoded only if
    /// `distinct / non_null_rows <= dictionary_threshold`.
    #[serde(default = "default_dictionary_threshold")]
    pub dictionary_threshold: f64,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            pixel_stride: default_pixel_stride(),
            encoding_level: EncodingLevel::default(),
            byte_order: ByteOrder::default(),
            nulls_padding: false,
            is_null_alignment: default_is_null_alignment(),
            dictionary_threshold: default_dictionary_threshold(),
        }
    }
}

impl WriterOptions {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MosaicError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), MosaicError> {
        if self.pixel_stride == 0 {
            return Err(MosaicError::InvalidArgument(
                "pixel_stride must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.dictionary_threshold) {
            return Err(MosaicError::InvalidArgument(format!(
                "dictionary_threshold must be within [0, 1], got {}",
                self.dictionary_threshold
            )));
        }
        Ok(())
    }

    pub fn with_pixel_stride(mut self, pixel_stride: usize) -> Self {
        self.pixel_stride = pixel_stride;
        self
    }

    pub fn with_encoding_level(mut self, level: EncodingLevel) -> Self {
        self.encoding_level = level;
        self
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_nulls_padding(mut self, nulls_padding: bool) -> Self {
        self.nulls_padding = nulls_padding;
        self
    }

    pub fn with_is_null_alignment(mut self, alignment: u32) -> Self {
        self.is_null_alignment = alignment;
        self
    }
}

/// Helper for `serde` to provide a default for `pixel_stride`.
fn default_pixel_stride() -> usize {
    10_000
}

fn default_is_null_alignment() -> u32 {
    8
}

fn default_dictionary_threshold() -> f64 {
    0.75
}
