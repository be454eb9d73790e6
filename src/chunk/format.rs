//! Defines the metadata records that travel next to a chunk's bytes.
//!
//! The writer produces a `ChunkIndex` and a `ColumnEncoding` for every chunk;
//! the reader needs exactly the same two records plus the bytes to decode it.
//! Both are serde-serializable so the surrounding metadata layer can persist
//! them in whatever envelope it uses.

use serde::{Deserialize, Serialize};

use crate::error::MosaicError;
use crate::types::ByteOrder;

//==================================================================================
// 1. Statistics Records
//==================================================================================

/// Min/max (and sum, where meaningful) of the non-null values of a pixel or chunk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatisticRange {
    /// `sum` is `None` once it overflowed.
    Integer { min: i64, max: i64, sum: Option<i64> },
    Double { min: f64, max: f64, sum: f64 },
    String { min: String, max: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ColumnStatistic {
    /// Number of non-null values.
    pub number_of_values: u64,
    pub has_null: bool,
    /// `None` when there is no non-null value.
    #[serde(default)]
    pub range: Option<StatisticRange>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PixelStatistic {
    pub statistic: ColumnStatistic,
}

//==================================================================================
// 2. Chunk Index
//==================================================================================

/// Structural metadata of one column chunk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChunkIndex {
    /// Byte offset where each pixel's content begins.
    pub pixel_positions: Vec<u64>,
    pub pixel_statistics: Vec<PixelStatistic>,
    /// Byte offset of the isNull section, which is also the end of content.
    pub is_null_offset: u64,
    /// 0 means unaligned.
    pub is_null_alignment: u32,
    pub nulls_padding: bool,
    pub little_endian: bool,
    #[serde(default)]
    pub chunk_statistic: ColumnStatistic,
}

impl ChunkIndex {
    pub fn byte_order(&self) -> ByteOrder {
        ByteOrder::from_little_endian(self.little_endian)
    }

    pub fn num_pixels(&self) -> usize {
        self.pixel_statistics.len()
    }

    /// The `has_null` flag of `pixel_id`. A missing statistic means the index
    /// does not describe the chunk being read.
    pub fn pixel_has_null(&self, pixel_id: usize) -> Result<bool, MosaicError> {
        self.pixel_statistics
            .get(pixel_id)
            .map(|p| p.statistic.has_null)
            .ok_or(MosaicError::MissingPixelStatistic {
                pixel_id,
                available: self.pixel_statistics.len(),
            })
    }

    /// `is_null_offset` as a position inside a chunk of `chunk_len` bytes.
    pub fn is_null_position(&self, chunk_len: usize) -> Result<usize, MosaicError> {
        usize::try_from(self.is_null_offset)
            .ok()
            .filter(|&pos| pos <= chunk_len)
            .ok_or_else(|| {
                MosaicError::MalformedLayout(format!(
                    "is_null_offset {} lies outside a chunk of {} bytes",
                    self.is_null_offset, chunk_len
                ))
            })
    }

    pub fn to_json(&self) -> Result<String, MosaicError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MosaicError> {
        Ok(serde_json::from_str(json)?)
    }
}

//==================================================================================
// 3. Column Encoding
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    #[default]
    None,
    RunLength,
    Dictionary,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnEncoding {
    pub kind: EncodingKind,
    /// Number of dictionary entries; 0 unless `kind` is `Dictionary`.
    #[serde(default)]
    pub dictionary_size: u32,
}

impl ColumnEncoding {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn run_length() -> Self {
        Self {
            kind: EncodingKind::RunLength,
            dictionary_size: 0,
        }
    }

    pub fn dictionary(size: u32) -> Self {
        Self {
            kind: EncodingKind::Dictionary,
            dictionary_size: size,
        }
    }

    pub fn is_run_length(&self) -> bool {
        self.kind == EncodingKind::RunLength
    }

    pub fn is_dictionary(&self) -> bool {
        self.kind == EncodingKind::Dictionary
    }
}
