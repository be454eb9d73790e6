// In: src/bridge/format.rs

//! Public records of the Arrow bridge: the self-describing encoded chunk and
//! the analysis summary returned by `analyze_chunk`.

use serde::Serialize;

use crate::chunk::{ChunkBytes, ChunkIndex, ColumnEncoding, EncodingKind};
use crate::types::ColumnType;

/// One encoded column chunk together with everything needed to decode it.
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    pub bytes: ChunkBytes,
    pub index: ChunkIndex,
    pub encoding: ColumnEncoding,
    pub column_type: ColumnType,
    pub num_rows: usize,
    /// The stride the chunk was written with; readers must use the same one.
    pub pixel_stride: usize,
}

/// The public-facing layout summary of an encoded chunk, returned by `analyze_chunk`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChunkStats {
    pub column_type: ColumnType,
    pub encoding: EncodingKind,
    pub dictionary_size: u32,
    pub num_rows: usize,
    pub num_values: u64,
    pub num_pixels: usize,
    /// Pixels that contributed bytes to the isNull section.
    pub null_pixels: usize,
    pub total_size: usize,
    /// Bytes before `is_null_offset`, including alignment padding.
    pub content_size: usize,
    pub is_null_size: usize,
}
