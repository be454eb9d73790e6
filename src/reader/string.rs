//! The column reader for UTF-8 strings, covering both plain and dictionary
//! encoded chunks.
//!
//! Plain chunks pull one length per non-null row from the lengths stream and
//! slice that many bytes off the content region. Dictionary chunks parse the
//! dictionary once when the chunk is opened and pull one rank per non-null
//! row. Either way the decoder survives across calls.

use crate::chunk::{ChunkBytes, ChunkIndex, ColumnEncoding};
use crate::error::MosaicError;
use crate::kernels::Selection;
use crate::reader::core::{begin_read, decode_rows, teardown_on_error, RowTarget};
use crate::reader::state::{string_layout, ContentLayout, DecodeState};
use crate::vector::ColumnVector;

#[derive(Default)]
pub struct StringColumnReader {
    pub(crate) state: DecodeState,
}

impl StringColumnReader {
    pub fn new() -> Self {
        Self::default()
    }

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
        let out = vector.as_strings_mut()?;
        let layout = string_layout(encoding)?;
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
            pull_string,
        )
    }
}

fn pull_string(state: &mut DecodeState, is_null: bool) -> Result<Option<String>, MosaicError> {
    if is_null {
        return Ok(None);
    }
    match state.layout {
        Some(ContentLayout::PlainString) => {
            let raw = state.next_run_length()?;
            let len = usize::try_from(raw).map_err(|_| {
                MosaicError::MalformedLayout(format!("Negative string length {}", raw))
            })?;
            let bytes = state.take_content(len)?;
            Ok(Some(String::from_utf8(bytes.to_vec())?))
        }
        Some(ContentLayout::DictionaryString) => {
            let rank = state.next_run_length()?;
            let dictionary = state
                .dictionary
                .as_ref()
                .ok_or(MosaicError::ResourceClosed("string dictionary"))?;
            Ok(Some(dictionary.resolve(rank)?.to_string()))
        }
        Some(other) => Err(MosaicError::UnsupportedType(format!(
            "{:?} content cannot be read as Utf8",
            other
        ))),
        None => Err(MosaicError::ResourceClosed("decode state")),
    }
}
