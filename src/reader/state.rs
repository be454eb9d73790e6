//! Cross-call decode state of a column reader.
//!
//! A chunk may be read in several calls; everything a later call needs to
//! continue where the previous one stopped lives in `DecodeState`: how many
//! rows were consumed, where the null cursor and the content cursor are, and
//! the open run-length decoder with its in-flight run. Readers own one and can
//! hand it out (`take_state`) or adopt one (`restore_state`).

use std::io::{Cursor, Read, Take};
use std::sync::Arc;

use crate::chunk::{ChunkBytes, ChunkIndex, ColumnEncoding, EncodingKind};
use crate::error::MosaicError;
use crate::kernels::dictionary::StringDictionary;
use crate::kernels::RunLengthDecoder;
use crate::null_handling::NullCursor;
use crate::types::ByteOrder;

/// A run-length decoder confined to its stream's byte range of the chunk.
pub(crate) type ChunkDecoder = RunLengthDecoder<Take<Cursor<ChunkBytes>>>;

/// How the content section of the chunk being read is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentLayout {
    /// One run-length value per non-null row.
    RunLength,
    /// One fixed-width slot per row.
    Padded { width: usize },
    /// One fixed-width slot per non-null row.
    Sparse { width: usize },
    /// String bytes delimited by a run-length lengths stream.
    PlainString,
    /// Run-length ranks into a dictionary.
    DictionaryString,
}

impl ContentLayout {
    fn decodes_run_length(&self) -> bool {
        matches!(
            self,
            Self::RunLength | Self::PlainString | Self::DictionaryString
        )
    }
}

#[derive(Default)]
pub struct DecodeState {
    pub(crate) chunk: Option<ChunkBytes>,
    pub(crate) layout: Option<ContentLayout>,
    pub(crate) byte_order: ByteOrder,
    /// Rows of the chunk consumed so far, across all calls.
    pub(crate) element_index: usize,
    pub(crate) null_cursor: NullCursor,
    /// Next byte of fixed-width slots or plain string bytes.
    pub(crate) content_pos: usize,
    /// End of the region `content_pos` may read from.
    pub(crate) content_end: usize,
    pub(crate) decoder: Option<ChunkDecoder>,
    /// Run-length values still owed by the chunk: its non-null rows, per the
    /// pixel statistics, minus the values already pulled.
    pub(crate) run_length_values_left: usize,
    pub(crate) dictionary: Option<Arc<StringDictionary>>,
}

impl DecodeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.chunk.is_some()
    }

    /// Rows of the current chunk consumed so far.
    pub fn element_index(&self) -> usize {
        self.element_index
    }

    /// Releases the decoder and the chunk reference. Idempotent.
    pub fn close(&mut self) {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.close();
        }
        *self = Self::default();
    }

    /// Re-initialises the state for a fresh read of `chunk`, closing whatever
    /// was open before.
    pub(crate) fn open(
        &mut self,
        chunk: &ChunkBytes,
        chunk_index: &ChunkIndex,
        layout: ContentLayout,
    ) -> Result<(), MosaicError> {
        self.close();
        let is_null_pos = chunk_index.is_null_position(chunk.len())?;
        let order = chunk_index.byte_order();

        let mut content_end = is_null_pos;
        let mut decoder_start = 0;
        let mut decoder_end = is_null_pos;
        match layout {
            ContentLayout::PlainString => {
                let footer_pos = is_null_pos.checked_sub(4).ok_or_else(|| {
                    MosaicError::MalformedLayout(
                        "String chunk too short for its lengths footer".to_string(),
                    )
                })?;
                let lens_offset = order
                    .read_i32(chunk, footer_pos)
                    .and_then(|v| usize::try_from(v).ok())
                    .filter(|&v| v <= footer_pos)
                    .ok_or_else(|| {
                        MosaicError::MalformedLayout(format!(
                            "Lengths offset out of range (footer at {})",
                            footer_pos
                        ))
                    })?;
                content_end = lens_offset;
                decoder_start = lens_offset;
                decoder_end = footer_pos;
            }
            ContentLayout::DictionaryString => {
                let dictionary = StringDictionary::read(&chunk[..is_null_pos], order)?;
                content_end = dictionary.encoded_values_end();
                decoder_end = content_end;
                self.dictionary = Some(Arc::new(dictionary));
            }
            _ => {}
        }

        if layout.decodes_run_length() {
            let mut cursor = Cursor::new(chunk.clone());
            cursor.set_position(decoder_start as u64);
            let stream = cursor.take((decoder_end - decoder_start) as u64);
            let signed = matches!(layout, ContentLayout::RunLength);
            self.decoder = Some(RunLengthDecoder::new(stream, signed));
        }

        self.chunk = Some(chunk.clone());
        self.layout = Some(layout);
        self.byte_order = order;
        self.element_index = 0;
        self.null_cursor = NullCursor::new(is_null_pos);
        self.content_pos = 0;
        self.content_end = content_end;
        let non_null = chunk_index
            .pixel_statistics
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.statistic.number_of_values));
        self.run_length_values_left = usize::try_from(non_null).unwrap_or(usize::MAX);
        Ok(())
    }

    /// Fails unless a chunk is open and `offset` continues the previous read.
    pub(crate) fn ensure_continuation(&self, offset: usize) -> Result<(), MosaicError> {
        if !self.is_open() {
            return Err(MosaicError::ResourceClosed("decode state"));
        }
        if offset != self.element_index {
            return Err(MosaicError::InvalidArgument(format!(
                "Read at row {} does not continue the previous read, which ended at row {}",
                offset, self.element_index
            )));
        }
        Ok(())
    }

    pub(crate) fn next_run_length(&mut self) -> Result<i64, MosaicError> {
        let decoder = self
            .decoder
            .as_mut()
            .ok_or(MosaicError::ResourceClosed("run-length decoder"))?;
        if self.run_length_values_left == 0 {
            return Err(MosaicError::MalformedLayout(format!(
                "Run-length value requested past the chunk's recorded non-null rows (read at row {})",
                self.element_index
            )));
        }
        let value = decoder.next()?;
        self.run_length_values_left -= 1;
        Ok(value)
    }

    /// Returns the next `len` content bytes and advances past them.
    pub(crate) fn take_content(&mut self, len: usize) -> Result<&[u8], MosaicError> {
        let chunk = self
            .chunk
            .as_ref()
            .ok_or(MosaicError::ResourceClosed("decode state"))?;
        let start = self.content_pos;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.content_end)
            .ok_or_else(|| {
                MosaicError::MalformedLayout(format!(
                    "Content read of {} bytes at {} runs past the content end {}",
                    len, start, self.content_end
                ))
            })?;
        self.content_pos = end;
        Ok(&chunk[start..end])
    }
}

/// Picks the content layout for a fixed-width chunk.
pub(crate) fn fixed_layout(
    encoding: &ColumnEncoding,
    chunk_index: &ChunkIndex,
    width: usize,
    integer: bool,
) -> Result<ContentLayout, MosaicError> {
    match encoding.kind {
        EncodingKind::RunLength if integer => Ok(ContentLayout::RunLength),
        EncodingKind::None if chunk_index.nulls_padding => Ok(ContentLayout::Padded { width }),
        EncodingKind::None => Ok(ContentLayout::Sparse { width }),
        kind => Err(MosaicError::UnsupportedType(format!(
            "Encoding {:?} is not valid for a fixed-width column",
            kind
        ))),
    }
}

/// Picks the content layout for a string chunk.
pub(crate) fn string_layout(encoding: &ColumnEncoding) -> Result<ContentLayout, MosaicError> {
    match encoding.kind {
        EncodingKind::None => Ok(ContentLayout::PlainString),
        EncodingKind::Dictionary => Ok(ContentLayout::DictionaryString),
        kind => Err(MosaicError::UnsupportedType(format!(
            "Encoding {:?} is not valid for a string column",
            kind
        ))),
    }
}
