//==================================================================================
// Unit Tests
//==================================================================================

use bitvec::prelude::*;

use crate::null_handling::bitmap::*;
use crate::types::ByteOrder;

#[test]
fn test_pixel_without_nulls_emits_nothing() {
    assert_eq!(compact_pixel_nulls(&[false; 10], ByteOrder::BigEndian), None);
    assert_eq!(
        compact_pixel_nulls(&[false, false, true, false], ByteOrder::BigEndian),
        Some(vec![0b0010_0000])
    );
}

#[test]
fn test_cursor_advance_carries_skip_bits() {
    let mut cursor = NullCursor::new(3);
    cursor.advance(5);
    assert_eq!(cursor, NullCursor { offset: 3, skip_bits: 5 });
    cursor.advance(6);
    assert_eq!(cursor, NullCursor { offset: 4, skip_bits: 3 });
    cursor.align_to_byte();
    assert_eq!(cursor, NullCursor { offset: 5, skip_bits: 0 });
    cursor.align_to_byte();
    assert_eq!(cursor.offset, 5);
}

#[test]
fn test_resumed_unpack_matches_single_unpack() {
    let nulls: Vec<bool> = (0..13).map(|i| i % 4 == 1 || i == 12).collect();
    for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
        let packed = compact_pixel_nulls(&nulls, order).unwrap();

        let mut cursor = NullCursor::new(0);
        let mut dst = vec![false; 13];
        cursor.unpack(&packed, &mut dst, 0, 5, order).unwrap();
        cursor.unpack(&packed, &mut dst, 5, 8, order).unwrap();
        assert_eq!(dst, nulls);
        assert_eq!(cursor, NullCursor { offset: 1, skip_bits: 5 });
        cursor.align_to_byte();
        assert_eq!(cursor.offset, packed.len());
    }
}

#[test]
fn test_selected_unpack_advances_over_every_bit() {
    let nulls = [true, false, false, true, true, false];
    let packed = compact_pixel_nulls(&nulls, ByteOrder::BigEndian).unwrap();
    let selection = bitvec![1, 0, 0, 1, 0, 1];

    let mut cursor = NullCursor::new(0);
    let mut dst = vec![false; 6];
    let first = cursor
        .unpack_selected(&packed, &mut dst, 0, 4, ByteOrder::BigEndian, &selection, 0)
        .unwrap();
    let second = cursor
        .unpack_selected(&packed, &mut dst, first, 2, ByteOrder::BigEndian, &selection, 4)
        .unwrap();
    assert_eq!((first, second), (2, 1));
    assert_eq!(&dst[..3], &[true, true, false]);
    assert_eq!(cursor, NullCursor { offset: 0, skip_bits: 6 });
}
