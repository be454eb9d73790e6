// In: src/writer/core.rs

//! The pixel and chunk bookkeeping shared by every column writer.
//!
//! `ChunkBuilder` owns the two byte streams of a chunk (content and isNull),
//! the current pixel's null flags and statistics, and the chunk index under
//! construction. Type-specific writers decide *what* goes into the content
//! stream; this module decides where pixels start and how the chunk is laid
//! out when it is flushed:
//!
//! ```text
//! [ content ][ zero padding to is_null_alignment ][ isNull bitmap ]
//! ```

use crate::chunk::{ChunkIndex, PixelStatistic, StatsRecorder};
use crate::config::WriterOptions;
use crate::error::MosaicError;
use crate::null_handling::compact_pixel_nulls;
use crate::types::ByteOrder;

#[derive(Debug)]
pub(crate) struct ChunkBuilder {
    pub(crate) options: WriterOptions,
    pub(crate) content: Vec<u8>,
    is_null_stream: Vec<u8>,
    pixel_is_null: Vec<bool>,
    pub(crate) pixel_stats: StatsRecorder,
    chunk_stats: StatsRecorder,
    pub(crate) index: ChunkIndex,
    flushed: bool,
    closed: bool,
}

impl ChunkBuilder {
    pub(crate) fn new(options: WriterOptions) -> Self {
        let pixel_capacity = options.pixel_stride.min(1 << 16);
        let mut builder = Self {
            options,
            content: Vec::new(),
            is_null_stream: Vec::new(),
            pixel_is_null: Vec::with_capacity(pixel_capacity),
            pixel_stats: StatsRecorder::new(),
            chunk_stats: StatsRecorder::new(),
            index: ChunkIndex::default(),
            flushed: false,
            closed: false,
        };
        builder.stamp_index();
        builder
    }

    pub(crate) fn byte_order(&self) -> ByteOrder {
        self.options.byte_order
    }

    /// Fails unless rows may still be appended to the chunk.
    pub(crate) fn ensure_writable(&self) -> Result<(), MosaicError> {
        if self.closed {
            return Err(MosaicError::ResourceClosed("column writer"));
        }
        if self.flushed {
            return Err(MosaicError::InvalidArgument(
                "Chunk already flushed; reset the writer before writing the next row group"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Records the null flag of the next row of the current pixel.
    pub(crate) fn push_row(&mut self, is_null: bool) {
        if is_null {
            self.pixel_stats.set_has_null();
        }
        self.pixel_is_null.push(is_null);
    }

    pub(crate) fn pixel_len(&self) -> usize {
        self.pixel_is_null.len()
    }

    pub(crate) fn pixel_is_full(&self) -> bool {
        self.pixel_is_null.len() >= self.options.pixel_stride
    }

    /// Emits the current pixel's null bitmap (if it has a null row) and folds
    /// its statistics into the chunk. Content and pixel positions are the
    /// caller's business.
    pub(crate) fn finish_pixel(&mut self) {
        let has_null = match compact_pixel_nulls(&self.pixel_is_null, self.byte_order()) {
            Some(bytes) => {
                self.is_null_stream.extend_from_slice(&bytes);
                true
            }
            None => false,
        };
        debug_assert_eq!(has_null, self.pixel_stats.has_null());

        self.index.pixel_statistics.push(PixelStatistic {
            statistic: self.pixel_stats.serialize(),
        });
        self.chunk_stats.merge(&self.pixel_stats);
        self.pixel_stats.reset();
        self.pixel_is_null.clear();
    }

    /// Zero-pads the content so that, once `trailing` more bytes are appended,
    /// it ends on a multiple of `is_null_alignment`.
    pub(crate) fn pad_for_is_null(&mut self, trailing: usize) {
        let alignment = self.options.is_null_alignment as usize;
        if alignment == 0 {
            return;
        }
        let misalignment = (self.content.len() + trailing) % alignment;
        if misalignment != 0 {
            let padded = self.content.len() + alignment - misalignment;
            self.content.resize(padded, 0);
        }
    }

    /// Finalizes the layout: aligns the end of content, records
    /// `is_null_offset` and appends the isNull stream.
    pub(crate) fn finish_chunk(&mut self) {
        self.pad_for_is_null(0);
        self.index.is_null_offset = self.content.len() as u64;
        self.content.extend_from_slice(&self.is_null_stream);
        self.index.chunk_statistic = self.chunk_stats.serialize();
        self.stamp_index();
        self.flushed = true;
    }

    pub(crate) fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn num_pixels(&self) -> usize {
        self.index.pixel_statistics.len()
    }

    /// Clears all chunk state, keeping allocations for the next row group.
    pub(crate) fn reset(&mut self) {
        self.content.clear();
        self.is_null_stream.clear();
        self.pixel_is_null.clear();
        self.pixel_stats.reset();
        self.chunk_stats.reset();
        self.index.pixel_positions.clear();
        self.index.pixel_statistics.clear();
        self.index.is_null_offset = 0;
        self.index.chunk_statistic = Default::default();
        self.flushed = false;
    }

    pub(crate) fn close(&mut self) {
        self.content = Vec::new();
        self.is_null_stream = Vec::new();
        self.pixel_is_null = Vec::new();
        self.index = ChunkIndex::default();
        self.closed = true;
    }

    fn stamp_index(&mut self) {
        self.index.is_null_alignment = self.options.is_null_alignment;
        self.index.nulls_padding = self.options.nulls_padding;
        self.index.little_endian = self.options.byte_order.is_little_endian();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(alignment: u32) -> ChunkBuilder {
        ChunkBuilder::new(
            WriterOptions::default()
                .with_pixel_stride(4)
                .with_is_null_alignment(alignment),
        )
    }

    #[test]
    fn test_alignment_padding_is_zeroed() {
        let mut b = builder(8);
        b.content.extend_from_slice(&[0xFF; 5]);
        b.push_row(true);
        b.finish_pixel();
        b.finish_chunk();
        assert_eq!(b.index.is_null_offset, 8);
        assert_eq!(&b.content[5..8], &[0, 0, 0]);
        assert_eq!(b.content.len(), 9);
    }

    #[test]
    fn test_no_alignment_when_disabled() {
        let mut b = builder(0);
        b.content.extend_from_slice(&[1, 2, 3]);
        b.finish_chunk();
        assert_eq!(b.index.is_null_offset, 3);
    }

    #[test]
    fn test_padding_accounts_for_trailing_footer() {
        let mut b = builder(8);
        b.content.extend_from_slice(&[7; 6]);
        b.pad_for_is_null(4);
        assert_eq!(b.content.len(), 12);
        b.content.extend_from_slice(&[0; 4]);
        b.finish_chunk();
        assert_eq!(b.index.is_null_offset, 16);
    }

    #[test]
    fn test_writes_rejected_after_flush_and_close() {
        let mut b = builder(8);
        b.finish_chunk();
        assert!(matches!(b.ensure_writable(), Err(MosaicError::InvalidArgument(_))));
        b.reset();
        assert!(b.ensure_writable().is_ok());
        b.close();
        assert!(matches!(b.ensure_writable(), Err(MosaicError::ResourceClosed(_))));
    }
}
