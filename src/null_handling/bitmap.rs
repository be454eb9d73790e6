// --- IN: src/null_handling/bitmap.rs ---

//! Pixel-level null bitmap helpers built on the `bitpack` kernels.

use crate::error::MosaicError;
use crate::kernels::bitpack::{self, Selection};
use crate::types::ByteOrder;

/// Compacts one pixel's null flags, or returns `None` when the pixel has no
/// null row and therefore contributes no bytes to the isNull section.
pub fn compact_pixel_nulls(is_null: &[bool], order: ByteOrder) -> Option<Vec<u8>> {
    if is_null.iter().any(|&n| n) {
        Some(bitpack::compact(is_null, order))
    } else {
        None
    }
}

/// Read position inside the isNull section: a byte offset plus the number of
/// bits of that byte already consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullCursor {
    pub offset: usize,
    pub skip_bits: usize,
}

impl NullCursor {
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            skip_bits: 0,
        }
    }

    /// Moves the cursor past `bits` bits.
    pub fn advance(&mut self, bits: usize) {
        let total = self.skip_bits + bits;
        self.offset += total / 8;
        self.skip_bits = total % 8;
    }

    /// Moves to the start of the next byte unless already on a boundary.
    /// Called when a pixel's segment is exhausted, since every segment is
    /// padded to a whole byte.
    pub fn align_to_byte(&mut self) {
        if self.skip_bits != 0 {
            self.offset += 1;
            self.skip_bits = 0;
        }
    }

    /// Unpacks `count` null flags into `dst[dst_offset..]` and advances.
    pub fn unpack(
        &mut self,
        input: &[u8],
        dst: &mut [bool],
        dst_offset: usize,
        count: usize,
        order: ByteOrder,
    ) -> Result<(), MosaicError> {
        bitpack::de_compact(dst, dst_offset, count, input, self.offset, self.skip_bits, order)?;
        self.advance(count);
        Ok(())
    }

    /// Unpacks `count` null flags, writing only the selected ones compactly
    /// from `dst_offset`. Advances past all `count` bits regardless of the
    /// selection and returns the number written.
    #[allow(clippy::too_many_arguments)]
    pub fn unpack_selected(
        &mut self,
        input: &[u8],
        dst: &mut [bool],
        dst_offset: usize,
        count: usize,
        order: ByteOrder,
        selection: &Selection,
        selection_offset: usize,
    ) -> Result<usize, MosaicError> {
        let written = bitpack::de_compact_selected(
            dst,
            dst_offset,
            count,
            input,
            self.offset,
            self.skip_bits,
            order,
            selection,
            selection_offset,
        )?;
        self.advance(count);
        Ok(written)
    }
}
