//! This module contains the column readers, the inverse of `writer`.
//!
//! A reader decodes one chunk, possibly over several calls: a call at offset 0
//! opens the chunk, any later call must continue exactly where the previous
//! one stopped. All cross-call progress lives in a [`DecodeState`] that can be
//! taken out of a reader and restored into another one of the same type.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub(crate) mod core;
pub mod fixed;
pub mod state;
pub mod string;


pub use fixed::FixedWidthColumnReader;
pub use state::DecodeState;
pub use string::StringColumnReader;

use crate::chunk::{ChunkBytes, ChunkIndex, ColumnEncoding};
use crate::error::MosaicError;
use crate::kernels::Selection;
use crate::types::ColumnType;
use crate::vector::ColumnVector;

//==================================================================================
// 2. The Reader Enum
//==================================================================================

/// A column reader for any supported logical type.
pub enum ColumnReader {
    Int32(FixedWidthColumnReader<i32>),
    Int64(FixedWidthColumnReader<i64>),
    Float32(FixedWidthColumnReader<f32>),
    Float64(FixedWidthColumnReader<f64>),
    Utf8(StringColumnReader),
}

macro_rules! dispatch {
    ($self:expr, $reader:ident => $body:expr) => {
        match $self {
            ColumnReader::Int32($reader) => $body,
            ColumnReader::Int64($reader) => $body,
            ColumnReader::Float32($reader) => $body,
            ColumnReader::Float64($reader) => $body,
            ColumnReader::Utf8($reader) => $body,
        }
    };
}

impl ColumnReader {
    pub fn new(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Int32 => Self::Int32(FixedWidthColumnReader::new()),
            ColumnType::Int64 => Self::Int64(FixedWidthColumnReader::new()),
            ColumnType::Float32 => Self::Float32(FixedWidthColumnReader::new()),
            ColumnType::Float64 => Self::Float64(FixedWidthColumnReader::new()),
            ColumnType::Utf8 => Self::Utf8(StringColumnReader::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int32(_) => ColumnType::Int32,
            Self::Int64(_) => ColumnType::Int64,
            Self::Float32(_) => ColumnType::Float32,
            Self::Float64(_) => ColumnType::Float64,
            Self::Utf8(_) => ColumnType::Utf8,
        }
    }

    /// Decodes rows `[offset, offset + size)` of the chunk into
    /// `vector[vector_index..]`.
    #[allow(clippy::too_many_arguments)]
    pub fn read(
        &mut self,
        input: &ChunkBytes,
        encoding: &ColumnEncoding,
        offset: usize,
        size: usize,
        pixel_stride: usize,
        vector_index: usize,
        vector: &mut ColumnVector,
        chunk_index: &ChunkIndex,
    ) -> Result<(), MosaicError> {
        dispatch!(self, r => r.read(
            input,
            encoding,
            offset,
            size,
            pixel_stride,
            vector_index,
            vector,
            chunk_index,
        ))
    }

    /// Decodes the same rows as [`read`](Self::read) but keeps only the rows
    /// whose bit in `selection` is set. Returns the number of rows written.
    #[allow(clippy::too_many_arguments)]
    pub fn read_selected(
        &mut self,
        input: &ChunkBytes,
        encoding: &ColumnEncoding,
        offset: usize,
        size: usize,
        pixel_stride: usize,
        vector_index: usize,
        vector: &mut ColumnVector,
        chunk_index: &ChunkIndex,
        selection: &Selection,
    ) -> Result<usize, MosaicError> {
        dispatch!(self, r => r.read_selected(
            input,
            encoding,
            offset,
            size,
            pixel_stride,
            vector_index,
            vector,
            chunk_index,
            selection,
        ))
    }

    /// Releases the open chunk. Idempotent.
    pub fn close(&mut self) {
        dispatch!(self, r => r.close())
    }

    /// Moves the decode state out, leaving this reader closed.
    pub fn take_state(&mut self) -> DecodeState {
        dispatch!(self, r => std::mem::take(&mut r.state))
    }

    /// Adopts a state taken from another reader of the same type, closing
    /// whatever this reader had open.
    pub fn restore_state(&mut self, state: DecodeState) {
        dispatch!(self, r => {
            r.state.close();
            r.state = state;
        })
    }

    pub fn element_index(&self) -> usize {
        dispatch!(self, r => r.state.element_index())
    }

    pub fn is_open(&self) -> bool {
        dispatch!(self, r => r.state.is_open())
    }
}
