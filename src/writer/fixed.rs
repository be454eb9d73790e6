//! The column writer for fixed-width numeric types.
//!
//! A pixel's values are buffered until the pixel closes and are then emitted
//! either as fixed-width slots (`None`) or as a run-length stream flushed at
//! the pixel boundary (`RunLength`), so every pixel position is a real byte
//! offset into the content section.

use crate::chunk::{ChunkIndex, ColumnEncoding};
use crate::config::{EncodingLevel, WriterOptions};
use crate::error::MosaicError;
use crate::kernels::RunLengthEncoder;
use crate::log_metric;
use crate::types::{ColumnType, FixedWidth};
use crate::vector::ColumnVector;
use crate::writer::core::ChunkBuilder;
use crate::writer::ColumnWriter;

pub struct FixedWidthColumnWriter<T: FixedWidth> {
    core: ChunkBuilder,
    encoding: ColumnEncoding,
    pixel_values: Vec<T>,
    encoder: Option<RunLengthEncoder>,
}

impl<T: FixedWidth> FixedWidthColumnWriter<T> {
    pub fn new(options: WriterOptions) -> Result<Self, MosaicError> {
        options.validate()?;
        let run_length =
            T::COLUMN_TYPE.is_integer() && options.encoding_level >= EncodingLevel::El1;
        let (encoding, encoder) = if run_length {
            (ColumnEncoding::run_length(), Some(RunLengthEncoder::new(true)))
        } else {
            (ColumnEncoding::none(), None)
        };
        Ok(Self {
            core: ChunkBuilder::new(options),
            encoding,
            pixel_values: Vec::new(),
            encoder,
        })
    }

    /// Appends one row.
    pub fn write(&mut self, value: Option<T>) -> Result<(), MosaicError> {
        self.core.ensure_writable()?;
        match value {
            Some(v) => {
                self.core.push_row(false);
                v.record(&mut self.core.pixel_stats);
                self.pixel_values.push(v);
            }
            None => {
                self.core.push_row(true);
                // Run-length streams never carry null rows.
                if self.core.options.nulls_padding && self.encoder.is_none() {
                    self.pixel_values.push(T::default());
                }
            }
        }
        if self.core.pixel_is_full() {
            self.close_pixel()?;
        }
        Ok(())
    }

    fn close_pixel(&mut self) -> Result<(), MosaicError> {
        if self.core.pixel_len() == 0 {
            return Ok(());
        }
        let start = self.core.content.len() as u64;
        let order = self.core.byte_order();
        match self.encoder.as_mut() {
            Some(encoder) => {
                for v in &self.pixel_values {
                    let value = v.to_run_length().ok_or_else(|| {
                        MosaicError::UnsupportedType(format!(
                            "{} values cannot be run-length encoded",
                            T::COLUMN_TYPE
                        ))
                    })?;
                    encoder.write(value)?;
                }
                encoder.drain_into(&mut self.core.content)?;
            }
            None => {
                for v in &self.pixel_values {
                    v.write(order, &mut self.core.content);
                }
            }
        }
        self.core.index.pixel_positions.push(start);
        self.core.finish_pixel();
        self.pixel_values.clear();
        Ok(())
    }
}

impl<T: FixedWidth> ColumnWriter for FixedWidthColumnWriter<T> {
    fn column_type(&self) -> ColumnType {
        T::COLUMN_TYPE
    }

    fn write_vector(&mut self, vector: &ColumnVector, length: usize) -> Result<(), MosaicError> {
        let typed = T::vector(vector)?;
        if length > typed.len() {
            return Err(MosaicError::InvalidArgument(format!(
                "Cannot write {} rows from a vector of {}",
                length,
                typed.len()
            )));
        }
        for i in 0..length {
            self.write(typed.get(i))?;
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
        self.close_pixel()?;
        self.core.finish_chunk();
        log::debug!(
            "Flushed {} chunk: {} pixels, {} bytes, encoding {:?}",
            T::COLUMN_TYPE,
            self.core.num_pixels(),
            self.core.content.len(),
            self.encoding.kind
        );
        log_metric!(
            "event" = "flush_chunk",
            "column" = T::COLUMN_TYPE,
            "pixels" = self.core.num_pixels(),
            "is_null_offset" = self.core.index.is_null_offset
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
        self.pixel_values.clear();
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.clear();
        }
    }

    fn close(&mut self) {
        self.core.close();
        self.pixel_values = Vec::new();
        self.encoder = None;
    }

    fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}
