//! The column reader for fixed-width numeric types, generic over the width.

use std::marker::PhantomData;

use crate::chunk::{ChunkBytes, ChunkIndex, ColumnEncoding};
use crate::error::MosaicError;
use crate::kernels::Selection;
use crate::reader::core::{begin_read, decode_rows, teardown_on_error, RowTarget};
use crate::reader::state::{fixed_layout, ContentLayout, DecodeState};
use crate::types::FixedWidth;
use crate::vector::ColumnVector;

pub struct FixedWidthColumnReader<T: FixedWidth> {
    pub(crate) state: DecodeState,
    _marker: PhantomData<T>,
}

impl<T: FixedWidth> Default for FixedWidthColumnReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FixedWidth> FixedWidthColumnReader<T> {
    pub fn new() -> Self {
        Self {
            state: DecodeState::new(),
            _marker: PhantomData,
        }
    }

    /// Reads rows `[offset, offset + size)` of the chunk into
    /// `vector[vector_index..]`. A read at offset 0 starts a fresh chunk; any
    /// other offset must continue the previous read.
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
        let result = self
            .decode(
                input,
                encoding,
                offset,
                size,
                pixel_stride,
                vector_index,
                vector,
                chunk_index,
                None,
            )
            .map(|_| ());
        teardown_on_error(&mut self.state, result)
    }

    /// Like [`read`](Self::read), but only rows whose `selection` bit is set
    /// are written, compacted from `vector_index`. Returns the number written.
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
        let result = self.decode(
            input,
            encoding,
            offset,
            size,
            pixel_stride,
            vector_index,
            vector,
            chunk_index,
            Some(selection),
        );
        teardown_on_error(&mut self.state, result)
    }

    pub fn close(&mut self) {
        self.state.close();
    }

    #[allow(clippy::too_many_arguments)]
    fn decode(
        &mut self,
        input: &ChunkBytes,
        encoding: &ColumnEncoding,
        offset: usize,
        size: usize,
        pixel_stride: usize,
        vector_index: usize,
        vector: &mut ColumnVector,
        chunk_index: &ChunkIndex,
        selection: Option<&Selection>,
    ) -> Result<usize, MosaicError> {
        let out = T::vector_mut(vector)?;
        let layout = fixed_layout(
            encoding,
            chunk_index,
            T::WIDTH,
            T::COLUMN_TYPE.is_integer(),
        )?;
        begin_read(&mut self.state, input, chunk_index, offset, pixel_stride, layout)?;

        let target = RowTarget {
            values: &mut out.values,
            is_null: &mut out.is_null,
            no_nulls: &mut out.no_nulls,
        };
        decode_rows(
            &mut self.state,
            chunk_index,
            size,
            pixel_stride,
            vector_index,
            target,
            selection,
            pull_value::<T>,
        )
    }
}

/// Consumes the content of one row. Returns `None` for null rows; padded
/// null slots are still consumed.
fn pull_value<T: FixedWidth>(state: &mut DecodeState, is_null: bool) -> Result<Option<T>, MosaicError> {
    match state.layout {
        Some(ContentLayout::RunLength) => {
            if is_null {
                return Ok(None);
            }
            let raw = state.next_run_length()?;
            T::from_run_length(raw).map(Some).ok_or_else(|| {
                MosaicError::MalformedLayout(format!(
                    "Run-length value {} does not fit {}",
                    raw,
                    T::COLUMN_TYPE
                ))
            })
        }
        Some(ContentLayout::Padded { .. }) => {
            let value = read_slot::<T>(state)?;
            Ok(if is_null { None } else { Some(value) })
        }
        Some(ContentLayout::Sparse { .. }) => {
            if is_null {
                Ok(None)
            } else {
                read_slot::<T>(state).map(Some)
            }
        }
        Some(other) => Err(MosaicError::UnsupportedType(format!(
            "{:?} content cannot be read as {}",
            other,
            T::COLUMN_TYPE
        ))),
        None => Err(MosaicError::ResourceClosed("decode state")),
    }
}

fn read_slot<T: FixedWidth>(state: &mut DecodeState) -> Result<T, MosaicError> {
    let order = state.byte_order;
    let bytes = state.take_content(T::WIDTH)?;
    T::read(bytes, 0, order).ok_or_else(|| {
        MosaicError::MalformedLayout(format!("Truncated {} slot", T::COLUMN_TYPE))
    })
}
