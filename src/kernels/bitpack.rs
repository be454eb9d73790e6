//! This module contains the pure, stateless kernels that convert between a
//! packed bit sequence and a `bool` sequence.
//!
//! It is used for the per-pixel null bitmaps. The bit order inside each byte
//! follows the chunk's `ByteOrder`: big-endian chunks store the first row in
//! the most significant bit (`Msb0`), little-endian chunks in the least
//! significant bit (`Lsb0`). Every packed sequence is padded with zero bits to
//! a whole byte.

use bitvec::prelude::*;

use crate::error::MosaicError;
use crate::types::ByteOrder;

/// A caller-supplied row selection, indexed relative to the requested range.
/// A set bit means the row is written to the output.
pub type Selection = BitSlice;

//==================================================================================
// 1. Generic Core Logic
//==================================================================================

fn compact_with<O: BitOrder>(bits: &[bool]) -> Vec<u8> {
    let mut packed = vec![0u8; bits.len().div_ceil(8)];
    let view = packed.view_bits_mut::<O>();
    for (i, &bit) in bits.iter().enumerate() {
        view.set(i, bit);
    }
    packed
}

/// Returns the `count` bits starting `skip_bits` into `input[byte_offset..]`.
fn bit_window<O: BitOrder>(
    input: &[u8],
    byte_offset: usize,
    skip_bits: usize,
    count: usize,
) -> Result<&BitSlice<u8, O>, MosaicError> {
    let needed = skip_bits.saturating_add(count).div_ceil(8);
    let bytes = byte_offset
        .checked_add(needed)
        .and_then(|end| input.get(byte_offset..end))
        .ok_or(MosaicError::BitpackDecodeError {
            offset: byte_offset,
            needed,
            available: input.len(),
        })?;
    Ok(&bytes.view_bits::<O>()[skip_bits..skip_bits + count])
}

fn de_compact_with<O: BitOrder>(
    dst: &mut [bool],
    dst_offset: usize,
    count: usize,
    input: &[u8],
    byte_offset: usize,
    skip_bits: usize,
) -> Result<(), MosaicError> {
    let window = bit_window::<O>(input, byte_offset, skip_bits, count)?;
    for (slot, bit) in dst[dst_offset..dst_offset + count]
        .iter_mut()
        .zip(window.iter().by_vals())
    {
        *slot = bit;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn de_compact_selected_with<O: BitOrder>(
    dst: &mut [bool],
    dst_offset: usize,
    count: usize,
    input: &[u8],
    byte_offset: usize,
    skip_bits: usize,
    selection: &Selection,
    selection_offset: usize,
) -> Result<usize, MosaicError> {
    let window = bit_window::<O>(input, byte_offset, skip_bits, count)?;
    let mask = &selection[selection_offset..selection_offset + count];
    let capacity = dst.len();
    let mut written = 0;
    for (bit, selected) in window.iter().by_vals().zip(mask.iter().by_vals()) {
        if selected {
            let slot = dst.get_mut(dst_offset + written).ok_or_else(|| {
                MosaicError::InvalidArgument(format!(
                    "Destination of {} slots is too small for selected bits",
                    capacity
                ))
            })?;
            *slot = bit;
            written += 1;
        }
    }
    Ok(written)
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Packs `bits` into bytes, padding the final byte with zero bits.
pub fn compact(bits: &[bool], order: ByteOrder) -> Vec<u8> {
    match order {
        ByteOrder::BigEndian => compact_with::<Msb0>(bits),
        ByteOrder::LittleEndian => compact_with::<Lsb0>(bits),
    }
}

/// Unpacks `count` bits into `dst[dst_offset..]`, starting at bit `skip_bits`
/// of `input[byte_offset]`.
pub fn de_compact(
    dst: &mut [bool],
    dst_offset: usize,
    count: usize,
    input: &[u8],
    byte_offset: usize,
    skip_bits: usize,
    order: ByteOrder,
) -> Result<(), MosaicError> {
    if count == 0 {
        return Ok(());
    }
    if dst_offset.checked_add(count).map_or(true, |end| end > dst.len()) {
        return Err(MosaicError::InvalidArgument(format!(
            "Cannot unpack {} bits at offset {} into {} slots",
            count,
            dst_offset,
            dst.len()
        )));
    }
    match order {
        ByteOrder::BigEndian => {
            de_compact_with::<Msb0>(dst, dst_offset, count, input, byte_offset, skip_bits)
        }
        ByteOrder::LittleEndian => {
            de_compact_with::<Lsb0>(dst, dst_offset, count, input, byte_offset, skip_bits)
        }
    }
}

/// Like [`de_compact`], but only bits whose `selection[selection_offset + i]`
/// is set are written, packed together from `dst_offset`. Every bit is still
/// consumed from `input`. Returns the number of bits written.
#[allow(clippy::too_many_arguments)]
pub fn de_compact_selected(
    dst: &mut [bool],
    dst_offset: usize,
    count: usize,
    input: &[u8],
    byte_offset: usize,
    skip_bits: usize,
    order: ByteOrder,
    selection: &Selection,
    selection_offset: usize,
) -> Result<usize, MosaicError> {
    if count == 0 {
        return Ok(0);
    }
    if selection_offset.checked_add(count).map_or(true, |end| end > selection.len()) {
        return Err(MosaicError::InvalidArgument(format!(
            "Selection of {} bits does not cover {} rows from {}",
            selection.len(),
            count,
            selection_offset
        )));
    }
    match order {
        ByteOrder::BigEndian => de_compact_selected_with::<Msb0>(
            dst, dst_offset, count, input, byte_offset, skip_bits, selection, selection_offset,
        ),
        ByteOrder::LittleEndian => de_compact_selected_with::<Lsb0>(
            dst, dst_offset, count, input, byte_offset, skip_bits, selection, selection_offset,
        ),
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_bit_order() {
        let bits = [false, false, true, false];
        assert_eq!(compact(&bits, ByteOrder::BigEndian), vec![0b0010_0000]);
        assert_eq!(compact(&bits, ByteOrder::LittleEndian), vec![0b0000_0100]);
    }

    #[test]
    fn test_compact_pads_final_byte_with_zeros() {
        let bits = [true; 9];
        assert_eq!(compact(&bits, ByteOrder::BigEndian), vec![0xFF, 0x80]);
        assert_eq!(compact(&bits, ByteOrder::LittleEndian), vec![0xFF, 0x01]);
        assert!(compact(&[], ByteOrder::BigEndian).is_empty());
    }

    #[test]
    fn test_de_compact_with_skip_bits() {
        let bits: Vec<bool> = (0..20).map(|i| i % 3 == 0).collect();
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let packed = compact(&bits, order);
            let mut dst = vec![false; 24];
            // Resume at row 11, which is bit 3 of byte 1.
            de_compact(&mut dst, 2, 9, &packed, 1, 3, order).unwrap();
            assert_eq!(&dst[2..11], &bits[11..20]);
            assert!(!dst[0] && !dst[1]);
        }
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut dst: Vec<bool> = Vec::new();
        de_compact(&mut dst, 0, 0, &[], 5, 0, ByteOrder::BigEndian).unwrap();
        let selection: BitVec = BitVec::new();
        let written =
            de_compact_selected(&mut dst, 0, 0, &[], 0, 0, ByteOrder::BigEndian, &selection, 0)
                .unwrap();
        assert_eq!(written, 0);
    }

    #[test]
    fn test_offset_overflow_is_an_argument_error() {
        let mut dst = vec![false; 4];
        let err = de_compact(&mut dst, usize::MAX, 2, &[0xFF], 0, 0, ByteOrder::BigEndian)
            .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidArgument(_)));
        let selection = bitvec![1; 4];
        let err = de_compact_selected(
            &mut dst,
            0,
            2,
            &[0xFF],
            0,
            0,
            ByteOrder::BigEndian,
            &selection,
            usize::MAX,
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidArgument(_)));
    }

    #[test]
    fn test_out_of_range_input() {
        let mut dst = vec![false; 16];
        let err = de_compact(&mut dst, 0, 10, &[0xFF], 0, 0, ByteOrder::BigEndian).unwrap_err();
        assert!(matches!(
            err,
            MosaicError::BitpackDecodeError { offset: 0, needed: 2, available: 1 }
        ));
        assert!(err.is_malformed_layout());
    }

    #[test]
    fn test_de_compact_selected_compacts_output() {
        let bits = [true, false, true, true, false, false, true, false];
        let packed = compact(&bits, ByteOrder::LittleEndian);
        let mut selection = bitvec![0; 10];
        for i in [2, 3, 5, 8] {
            selection.set(i, true);
        }
        let mut dst = vec![false; 4];
        // Rows 0..8 map to selection bits 2..10.
        let written = de_compact_selected(
            &mut dst,
            0,
            8,
            &packed,
            0,
            0,
            ByteOrder::LittleEndian,
            &selection,
            2,
        )
        .unwrap();
        assert_eq!(written, 4);
        assert_eq!(dst, vec![true, false, true, true]);
    }

    #[test]
    fn test_selection_too_short() {
        let mut dst = vec![false; 8];
        let selection = bitvec![1; 3];
        let err = de_compact_selected(&mut dst, 0, 4, &[0], 0, 0, ByteOrder::BigEndian, &selection, 0)
            .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidArgument(_)));
    }
}
