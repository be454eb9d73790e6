//! This module contains the column writers: one per logical type, all sharing
//! the pixel/chunk machinery in `core`.
//!
//! A writer accumulates one chunk (one column of one row group). Rows are
//! grouped into pixels of `pixel_stride` rows; closing a pixel emits its null
//! bitmap and statistics. `flush` finalizes the chunk layout, after which
//! `chunk_content`, `chunk_index` and `chunk_encoding` describe the result.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub(crate) mod core;
pub mod fixed;
pub mod string;

#[cfg(test)]
mod tests;

pub use fixed::FixedWidthColumnWriter;
pub use string::StringColumnWriter;

use crate::chunk::{ChunkBytes, ChunkIndex, ColumnEncoding};
use crate::config::WriterOptions;
use crate::error::MosaicError;
use crate::types::ColumnType;
use crate::vector::ColumnVector;

//==================================================================================
// 2. The Writer Contract
//==================================================================================

/// Lifecycle: `write_vector`* -> `flush` -> (`reset` -> ...)* -> `close`.
pub trait ColumnWriter: Send {
    fn column_type(&self) -> ColumnType;

    /// Writes the first `length` rows of `vector`.
    fn write_vector(&mut self, vector: &ColumnVector, length: usize) -> Result<(), MosaicError>;

    /// Closes the open pixel and lays out the chunk. Flushing twice is a no-op.
    fn flush(&mut self) -> Result<(), MosaicError>;

    fn chunk_content(&self) -> &[u8];

    fn chunk_index(&self) -> &ChunkIndex;

    fn chunk_encoding(&self) -> ColumnEncoding;

    /// Clears the chunk for the next row group, keeping buffer capacity.
    fn reset(&mut self);

    /// Releases all buffers. Idempotent; later writes fail.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Flushes and hands out the chunk as immutable shared bytes.
    fn finish(&mut self) -> Result<(ChunkBytes, ChunkIndex, ColumnEncoding), MosaicError> {
        self.flush()?;
        Ok((
            ChunkBytes::from(self.chunk_content()),
            self.chunk_index().clone(),
            self.chunk_encoding(),
        ))
    }
}

/// Creates the writer for `column_type`.
pub fn new_column_writer(
    column_type: ColumnType,
    options: &WriterOptions,
) -> Result<Box<dyn ColumnWriter>, MosaicError> {
    let options = options.clone();
    Ok(match column_type {
        ColumnType::Int32 => Box::new(FixedWidthColumnWriter::<i32>::new(options)?),
        ColumnType::Int64 => Box::new(FixedWidthColumnWriter::<i64>::new(options)?),
        ColumnType::Float32 => Box::new(FixedWidthColumnWriter::<f32>::new(options)?),
        ColumnType::Float64 => Box::new(FixedWidthColumnWriter::<f64>::new(options)?),
        ColumnType::Utf8 => Box::new(StringColumnWriter::new(options)?),
    })
}
