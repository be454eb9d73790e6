//! The column writer for UTF-8 strings.
//!
//! Unlike fixed-width columns, the content of a string chunk cannot be emitted
//! pixel by pixel: dictionary ranks are only known once every distinct value
//! of the chunk has been seen. Rows are therefore kept as origin ids of a
//! `DictionaryBuilder` and the content section is produced at flush, where the
//! writer also chooses between plain and dictionary layouts.

use crate::chunk::{ChunkIndex, ColumnEncoding};
use crate::config::{EncodingLevel, WriterOptions};
use crate::error::MosaicError;
use crate::kernels::dictionary::{DictionaryBuilder, FOOTER_LEN};
use crate::kernels::RunLengthEncoder;
use crate::log_metric;
use crate::types::ColumnType;
use crate::vector::ColumnVector;
use crate::writer::core::ChunkBuilder;
use crate::writer::ColumnWriter;

const LENS_FOOTER_LEN: usize = 4;

pub struct StringColumnWriter {
    core: ChunkBuilder,
    encoding: ColumnEncoding,
    dictionary: DictionaryBuilder,
    /// Origin id of every non-null row of the chunk, in row order.
    origin_ids: Vec<u32>,
    /// Number of non-null rows of each closed pixel.
    pixel_value_counts: Vec<usize>,
    current_pixel_values: usize,
}

impl StringColumnWriter {
    pub fn new(options: WriterOptions) -> Result<Self, MosaicError> {
        options.validate()?;
        let mut options = options;
        // String rows never occupy a slot when null.
        options.nulls_padding = false;
        Ok(Self {
            core: ChunkBuilder::new(options),
            encoding: ColumnEncoding::none(),
            dictionary: DictionaryBuilder::new(),
            origin_ids: Vec::new(),
            pixel_value_counts: Vec::new(),
            current_pixel_values: 0,
        })
    }

    pub fn write(&mut self, value: Option<&str>) -> Result<(), MosaicError> {
        self.core.ensure_writable()?;
        match value {
            Some(s) => {
                self.core.push_row(false);
                self.core.pixel_stats.update_string(s);
                self.origin_ids.push(self.dictionary.add(s));
                self.current_pixel_values += 1;
            }
            None => self.core.push_row(true),
        }
        if self.core.pixel_is_full() {
            self.close_pixel();
        }
        Ok(())
    }

    fn close_pixel(&mut self) {
        if self.core.pixel_len() == 0 {
            return;
        }
        self.core.finish_pixel();
        self.pixel_value_counts.push(self.current_pixel_values);
        self.current_pixel_values = 0;
    }

    fn use_dictionary(&self) -> bool {
        let options = &self.core.options;
        if options.encoding_level < EncodingLevel::El2 || self.origin_ids.is_empty() {
            return false;
        }
        let ratio = self.dictionary.len() as f64 / self.origin_ids.len() as f64;
        ratio <= options.dictionary_threshold
    }

    /// `[ranks run-length stream][origins][starts][orders][pad][footer]`
    fn write_dictionary_content(&mut self) -> Result<(), MosaicError> {
        let order = self.core.byte_order();
        let (orders, ranks) = self.dictionary.sort();
        let mut encoder = RunLengthEncoder::new(false);
        let mut next = 0;
        for &count in &self.pixel_value_counts {
            self.core.index.pixel_positions.push(self.core.content.len() as u64);
            for &id in &self.origin_ids[next..next + count] {
                encoder.write(ranks[id as usize] as i64)?;
            }
            encoder.drain_into(&mut self.core.content)?;
            next += count;
        }
        let offsets = self
            .dictionary
            .write_tables(&orders, order, &mut self.core.content)?;
        self.core.pad_for_is_null(FOOTER_LEN);
        offsets.write_footer(order, &mut self.core.content)?;
        self.encoding = ColumnEncoding::dictionary(self.dictionary.len() as u32);
        Ok(())
    }

    /// `[string bytes][lengths run-length stream][pad][lensOffset]`
    fn write_plain_content(&mut self) -> Result<(), MosaicError> {
        let order = self.core.byte_order();
        let origins = self.dictionary.origins();
        let mut lengths = RunLengthEncoder::new(false);
        let mut next = 0;
        for &count in &self.pixel_value_counts {
            self.core.index.pixel_positions.push(self.core.content.len() as u64);
            for &id in &self.origin_ids[next..next + count] {
                let bytes = origins[id as usize].as_bytes();
                self.core.content.extend_from_slice(bytes);
                lengths.write(bytes.len() as i64)?;
            }
            next += count;
        }
        let lens_offset = i32::try_from(self.core.content.len()).map_err(|_| {
            MosaicError::InvalidArgument(format!(
                "String content of {} bytes exceeds the chunk size limit",
                self.core.content.len()
            ))
        })?;
        lengths.drain_into(&mut self.core.content)?;
        self.core.pad_for_is_null(LENS_FOOTER_LEN);
        order.write_i32(lens_offset, &mut self.core.content);
        self.encoding = ColumnEncoding::none();
        Ok(())
    }
}

impl ColumnWriter for StringColumnWriter {
    fn column_type(&self) -> ColumnType {
        ColumnType::Utf8
    }

    fn write_vector(&mut self, vector: &ColumnVector, length: usize) -> Result<(), MosaicError> {
        let strings = vector.as_strings()?;
        if length > strings.len() {
            return Err(MosaicError::InvalidArgument(format!(
                "Cannot write {} rows from a vector of {}",
                length,
                strings.len()
            )));
        }
        for i in 0..length {
            self.write(strings.get(i))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MosaicError> {
        if self.core.is_closed() {
            return Err(MosaicError::ResourceClosed("column writer"));
        }
        if self.core.is_flushed() {
            return Ok(());
        }
        self.close_pixel();
        if self.use_dictionary() {
            self.write_dictionary_content()?;
        } else {
            self.write_plain_content()?;
        }
        self.core.finish_chunk();
        log::debug!(
            "Flushed Utf8 chunk: {} pixels, {} distinct of {} values, encoding {:?}",
            self.core.num_pixels(),
            self.dictionary.len(),
            self.origin_ids.len(),
            self.encoding.kind
        );
        log_metric!(
            "event" = "flush_chunk",
            "column" = ColumnType::Utf8,
            "pixels" = self.core.num_pixels(),
            "dictionary_size" = self.encoding.dictionary_size
        );
        Ok(())
    }

    fn chunk_content(&self) -> &[u8] {
        &self.core.content
    }

    fn chunk_index(&self) -> &ChunkIndex {
        &self.core.index
    }

    fn chunk_encoding(&self) -> ColumnEncoding {
        self.encoding
    }

    fn reset(&mut self) {
        self.core.reset();
        self.dictionary.clear();
        self.origin_ids.clear();
        self.pixel_value_counts.clear();
        self.current_pixel_values = 0;
        self.encoding = ColumnEncoding::none();
    }

    fn close(&mut self) {
        self.core.close();
        self.dictionary = DictionaryBuilder::new();
        self.origin_ids = Vec::new();
        self.pixel_value_counts = Vec::new();
    }

    fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::dictionary::StringDictionary;
    use crate::kernels::rle;
    use crate::types::ByteOrder;

    #[test]
    fn test_plain_layout_example() {
        let mut writer = StringColumnWriter::new(
            WriterOptions::default()
                .with_encoding_level(EncodingLevel::El1)
                .with_is_null_alignment(0),
        )
        .unwrap();
        for s in ["ab", "cde", "f"] {
            writer.write(Some(s)).unwrap();
        }
        writer.flush().unwrap();

        let content = writer.chunk_content();
        assert_eq!(&content[..6], b"abcdef");
        let lens_offset = ByteOrder::BigEndian.read_i32(content, content.len() - 4).unwrap();
        assert_eq!(lens_offset, 6);
        let lengths = rle::decode(&content[6..content.len() - 4], false, 3).unwrap();
        assert_eq!(lengths, vec![2, 3, 1]);
        assert_eq!(writer.chunk_encoding(), ColumnEncoding::none());
    }

    #[test]
    fn test_dictionary_chosen_for_low_cardinality() {
        let mut writer = StringColumnWriter::new(WriterOptions::default().with_pixel_stride(3)).unwrap();
        let rows = [Some("b"), Some("a"), None, Some("b"), Some("b"), Some("a"), Some("a")];
        for r in rows {
            writer.write(r).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.chunk_encoding(), ColumnEncoding::dictionary(2));

        let index = writer.chunk_index();
        assert_eq!(index.pixel_positions.len(), 3);
        assert_eq!(index.is_null_offset % 8, 0);
        let content_end = index.is_null_offset as usize;
        let dict =
            StringDictionary::read(&writer.chunk_content()[..content_end], ByteOrder::BigEndian)
                .unwrap();
        assert_eq!(dict.origins(), &["b", "a"]);
        assert_eq!(dict.orders(), &[1, 0]);
    }

    #[test]
    fn test_high_cardinality_stays_plain() {
        let mut writer = StringColumnWriter::new(WriterOptions::default()).unwrap();
        // 4 distinct of 5 non-null rows is above the 0.75 threshold.
        for s in ["w", "x", "y", "z", "w"] {
            writer.write(Some(s)).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.chunk_encoding(), ColumnEncoding::none());
    }

    #[test]
    fn test_dictionary_chosen_at_threshold() {
        let mut writer = StringColumnWriter::new(WriterOptions::default()).unwrap();
        // 3 distinct of 4 non-null rows sits exactly on the threshold.
        for s in ["x", "y", "z", "x"] {
            writer.write(Some(s)).unwrap();
        }
        writer.write(None).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.chunk_encoding(), ColumnEncoding::dictionary(3));
    }

    #[test]
    fn test_footer_ends_at_is_null_offset() {
        let mut writer = StringColumnWriter::new(WriterOptions::default().with_pixel_stride(2)).unwrap();
        for r in [Some("hello"), None, None, Some("hi")] {
            writer.write(r).unwrap();
        }
        writer.flush().unwrap();
        let index = writer.chunk_index();
        let end = index.is_null_offset as usize;
        assert_eq!(end % 8, 0);
        let lens_offset = ByteOrder::BigEndian
            .read_i32(writer.chunk_content(), end - 4)
            .unwrap();
        assert_eq!(lens_offset, 7);
        // Two pixels with one null each, one bitmap byte per pixel.
        assert_eq!(writer.chunk_content().len(), end + 2);
        assert!(!index.nulls_padding);
    }
}
