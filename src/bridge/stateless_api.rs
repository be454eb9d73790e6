// In: src/bridge/stateless_api.rs

use arrow::array::{Array, ArrayRef};

use crate::bridge::arrow_impl;
use crate::bridge::format::{ChunkStats, EncodedChunk};
use crate::config::WriterOptions;
use crate::error::MosaicError;
use crate::reader::ColumnReader;
use crate::vector::ColumnVector;
use crate::writer::new_column_writer;

/// Encodes a single Arrow array as one column chunk.
pub fn encode_arrow_column(
    array: &dyn Array,
    options: &WriterOptions,
) -> Result<EncodedChunk, MosaicError> {
    // 1. Marshall the Arrow array into a column vector.
    let vector = arrow_impl::arrow_to_vector(array)?;
    let column_type = vector.column_type();

    // 2. Run it through a fresh writer and hand out the flushed chunk.
    let mut writer = new_column_writer(column_type, options)?;
    writer.write_vector(&vector, array.len())?;
    let (bytes, index, encoding) = writer.finish()?;
    writer.close();

    Ok(EncodedChunk {
        bytes,
        index,
        encoding,
        column_type,
        num_rows: array.len(),
        pixel_stride: options.pixel_stride,
    })
}

/// Decodes a whole chunk back into an Arrow array.
pub fn decode_arrow_column(chunk: &EncodedChunk) -> Result<ArrayRef, MosaicError> {
    let mut vector = ColumnVector::new(chunk.column_type, chunk.num_rows);
    if chunk.num_rows > 0 {
        let mut reader = ColumnReader::new(chunk.column_type);
        reader.read(
            &chunk.bytes,
            &chunk.encoding,
            0,
            chunk.num_rows,
            chunk.pixel_stride,
            0,
            &mut vector,
            &chunk.index,
        )?;
        reader.close();
    }
    arrow_impl::vector_to_arrow(&vector, chunk.num_rows)
}

/// Summarizes the layout of an encoded chunk without decoding any values.
pub fn analyze_chunk(chunk: &EncodedChunk) -> Result<ChunkStats, MosaicError> {
    let total_size = chunk.bytes.len();
    let content_size = chunk.index.is_null_position(total_size)?;
    let null_pixels = chunk
        .index
        .pixel_statistics
        .iter()
        .filter(|p| p.statistic.has_null)
        .count();

    Ok(ChunkStats {
        column_type: chunk.column_type,
        encoding: chunk.encoding.kind,
        dictionary_size: chunk.encoding.dictionary_size,
        num_rows: chunk.num_rows,
        num_values: chunk.index.chunk_statistic.number_of_values,
        num_pixels: chunk.index.num_pixels(),
        null_pixels,
        total_size,
        content_size,
        is_null_size: total_size - content_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;

    #[test]
    fn test_analyze_chunk_after_encoding() {
        // 1. Arrange: Create a sample Arrow array.
        let array = Int32Array::from(vec![Some(10), Some(20), None, Some(30), Some(40)]);

        // 2. Act: Encode it with four-row pixels.
        let options = WriterOptions::default().with_pixel_stride(4);
        let chunk = encode_arrow_column(&array, &options).unwrap();

        // 3. Act: Analyze the result.
        let stats = analyze_chunk(&chunk).unwrap();

        // 4. Assert: One null pixel of four rows contributes one bitmap byte.
        assert_eq!(stats.total_size, chunk.bytes.len());
        assert_eq!(stats.content_size + stats.is_null_size, stats.total_size);
        assert_eq!(stats.is_null_size, 1);
        assert_eq!(stats.num_pixels, 2);
        assert_eq!(stats.null_pixels, 1);
        assert_eq!(stats.num_values, 4);
        assert_eq!(stats.content_size % 8, 0);
    }
}
