use super::*;
use crate::chunk::{EncodingKind, StatisticRange};
use crate::config::EncodingLevel;
use crate::vector::{PrimitiveVector, StringVector};

#[test]
fn test_factory_picks_writer_per_type() {
    let options = WriterOptions::default();
    for column_type in [
        ColumnType::Int32,
        ColumnType::Int64,
        ColumnType::Float32,
        ColumnType::Float64,
        ColumnType::Utf8,
    ] {
        let writer = new_column_writer(column_type, &options).unwrap();
        assert_eq!(writer.column_type(), column_type);
        assert!(!writer.is_closed());
    }
}

#[test]
fn test_factory_rejects_invalid_options() {
    let options = WriterOptions::default().with_pixel_stride(0);
    assert!(matches!(
        new_column_writer(ColumnType::Int64, &options),
        Err(MosaicError::InvalidArgument(_))
    ));
}

#[test]
fn test_write_vector_respects_length() {
    let vector: ColumnVector =
        PrimitiveVector::from_options(&[Some(3i64), None, Some(-5), Some(100)]).into();
    let mut writer = new_column_writer(ColumnType::Int64, &WriterOptions::default()).unwrap();
    writer.write_vector(&vector, 3).unwrap();
    let (_, index, encoding) = writer.finish().unwrap();

    assert_eq!(encoding.kind, EncodingKind::RunLength);
    let stat = &index.chunk_statistic;
    assert_eq!(stat.number_of_values, 2);
    assert!(stat.has_null);
    assert_eq!(
        stat.range,
        Some(StatisticRange::Integer { min: -5, max: 3, sum: Some(-2) })
    );

    assert!(matches!(
        writer.write_vector(&vector, 1),
        Err(MosaicError::InvalidArgument(_))
    ));
    writer.reset();
    assert!(matches!(
        writer.write_vector(&vector, 5),
        Err(MosaicError::InvalidArgument(_))
    ));
}

#[test]
fn test_write_vector_type_mismatch() {
    let vector: ColumnVector = StringVector::from_options(&[Some("a")]).into();
    let mut writer = new_column_writer(ColumnType::Float32, &WriterOptions::default()).unwrap();
    assert!(matches!(
        writer.write_vector(&vector, 1),
        Err(MosaicError::VectorTypeMismatch { expected: "Float32", actual: "Utf8" })
    ));
}

#[test]
fn test_pixel_statistics_per_pixel() {
    let vector: ColumnVector =
        StringVector::from_options(&[Some("m"), Some("c"), None, Some("z"), Some("a")]).into();
    let options = WriterOptions::default()
        .with_pixel_stride(2)
        .with_encoding_level(EncodingLevel::El0);
    let mut writer = new_column_writer(ColumnType::Utf8, &options).unwrap();
    writer.write_vector(&vector, 5).unwrap();
    writer.flush().unwrap();

    let index = writer.chunk_index();
    assert_eq!(index.num_pixels(), 3);
    assert_eq!(index.pixel_positions.len(), 3);
    let ranges: Vec<_> = index
        .pixel_statistics
        .iter()
        .map(|p| p.statistic.range.clone())
        .collect();
    assert_eq!(
        ranges,
        vec![
            Some(StatisticRange::String { min: "c".into(), max: "m".into() }),
            Some(StatisticRange::String { min: "z".into(), max: "z".into() }),
            Some(StatisticRange::String { min: "a".into(), max: "a".into() }),
        ]
    );
    assert_eq!(index.chunk_statistic.number_of_values, 4);
    assert_eq!(writer.chunk_encoding(), ColumnEncoding::none());
}

#[test]
fn test_finish_hands_out_flushed_bytes() {
    let mut writer = new_column_writer(ColumnType::Float64, &WriterOptions::default()).unwrap();
    let vector: ColumnVector = PrimitiveVector::from_options(&[Some(2.5f64)]).into();
    writer.write_vector(&vector, 1).unwrap();
    let (bytes, index, _) = writer.finish().unwrap();
    assert_eq!(&bytes[..], writer.chunk_content());
    assert_eq!(index.is_null_offset, 8);

    writer.close();
    assert!(writer.is_closed());
    assert!(matches!(writer.flush(), Err(MosaicError::ResourceClosed(_))));
}
