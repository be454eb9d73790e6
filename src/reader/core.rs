// In: src/reader/core.rs

//! The pixel-stepping decode loop shared by every column reader.
//!
//! Requested rows are consumed in segments that never cross a pixel
//! boundary. For each segment the pixel's `has_null` statistic decides
//! whether null bits are read at all; content is then pulled row by row
//! through a reader-specific closure that knows the chunk's content layout.
//! The selective path consumes exactly the same bits and values as the full
//! path and only differs in which rows it writes.

use bitvec::prelude::*;

use crate::chunk::{ChunkBytes, ChunkIndex};
use crate::error::MosaicError;
use crate::kernels::Selection;
use crate::reader::state::{ContentLayout, DecodeState};

/// A pixel-bounded run of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub pixel_id: usize,
    pub len: usize,
    /// True if the segment consumes the last row of its pixel.
    pub ends_pixel: bool,
}

/// Splits `size` rows starting at chunk row `start` into segments.
pub(crate) fn segments(start: usize, size: usize, pixel_stride: usize) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut row = start;
    let end = start + size;
    while row < end {
        let in_pixel = row % pixel_stride;
        let len = (pixel_stride - in_pixel).min(end - row);
        out.push(Segment {
            pixel_id: row / pixel_stride,
            len,
            ends_pixel: in_pixel + len == pixel_stride,
        });
        row += len;
    }
    out
}

/// The output slots of one vector.
pub(crate) struct RowTarget<'a, V> {
    pub values: &'a mut [V],
    pub is_null: &'a mut [bool],
    pub no_nulls: &'a mut bool,
}

/// Validates the call and either opens the state for a fresh chunk
/// (`offset == 0`) or checks that the call continues the previous one.
pub(crate) fn begin_read(
    state: &mut DecodeState,
    input: &ChunkBytes,
    chunk_index: &ChunkIndex,
    offset: usize,
    pixel_stride: usize,
    layout: ContentLayout,
) -> Result<(), MosaicError> {
    if pixel_stride == 0 {
        return Err(MosaicError::InvalidArgument(
            "pixel_stride must be positive".to_string(),
        ));
    }
    if offset == 0 {
        state.open(input, chunk_index, layout)?;
        log::debug!(
            "Opened chunk of {} bytes: {:?}, {} pixels, is_null_offset {}",
            input.len(),
            layout,
            chunk_index.num_pixels(),
            chunk_index.is_null_offset
        );
        Ok(())
    } else {
        state.ensure_continuation(offset)
    }
}

/// Closes the state if `result` is an error, so the next read must restart
/// at offset 0.
pub(crate) fn teardown_on_error<R>(
    state: &mut DecodeState,
    result: Result<R, MosaicError>,
) -> Result<R, MosaicError> {
    if let Err(e) = &result {
        if state.is_open() {
            log::warn!(
                "Read failed at row {}, decode state torn down: {}",
                state.element_index(),
                e
            );
        }
        state.close();
    }
    result
}

/// Decodes `size` rows into `target[vector_index..]` and returns the number of
/// rows written (`size` unless a selection is given).
#[allow(clippy::too_many_arguments)]
pub(crate) fn decode_rows<V, F>(
    state: &mut DecodeState,
    chunk_index: &ChunkIndex,
    size: usize,
    pixel_stride: usize,
    vector_index: usize,
    target: RowTarget<'_, V>,
    selection: Option<&Selection>,
    mut pull: F,
) -> Result<usize, MosaicError>
where
    F: FnMut(&mut DecodeState, bool) -> Result<Option<V>, MosaicError>,
{
    let wanted = match selection {
        Some(selection) => {
            if selection.len() < size {
                return Err(MosaicError::InvalidArgument(format!(
                    "Selection of {} bits is shorter than the {} requested rows",
                    selection.len(),
                    size
                )));
            }
            selection[..size].count_ones()
        }
        None => size,
    };
    let capacity = target.values.len().min(target.is_null.len());
    if vector_index.checked_add(wanted).map_or(true, |end| end > capacity) {
        return Err(MosaicError::InvalidArgument(format!(
            "Vector of {} rows cannot take {} rows at index {}",
            capacity, wanted, vector_index
        )));
    }

    let chunk = state
        .chunk
        .clone()
        .ok_or(MosaicError::ResourceClosed("decode state"))?;
    let order = state.byte_order;
    let direct = matches!(state.layout, Some(ContentLayout::Padded { .. }));
    let RowTarget {
        values,
        is_null,
        no_nulls,
    } = target;

    let mut written = vector_index;
    let mut request_row = 0;
    let mut scratch: Vec<bool> = Vec::new();

    for seg in segments(state.element_index, size, pixel_stride) {
        let has_null = chunk_index.pixel_has_null(seg.pixel_id)?;

        match selection {
            None => {
                let rows = written..written + seg.len;
                if has_null {
                    state
                        .null_cursor
                        .unpack(&chunk, is_null, written, seg.len, order)?;
                    if is_null[rows.clone()].iter().any(|&n| n) {
                        *no_nulls = false;
                    }
                } else {
                    is_null[rows.clone()].fill(false);
                }
                for row in rows {
                    if let Some(v) = pull(&mut *state, is_null[row])? {
                        values[row] = v;
                    }
                }
                written += seg.len;
            }
            Some(selection) if direct => {
                // Padded slots are read for every row, so null flags can go
                // straight into the vector under the selection mask.
                let mask = &selection[request_row..request_row + seg.len];
                let selected = if has_null {
                    state.null_cursor.unpack_selected(
                        &chunk,
                        is_null,
                        written,
                        seg.len,
                        order,
                        selection,
                        request_row,
                    )?
                } else {
                    let n = mask.count_ones();
                    is_null[written..written + n].fill(false);
                    n
                };
                if is_null[written..written + selected].iter().any(|&n| n) {
                    *no_nulls = false;
                }
                for keep in mask.iter().by_vals() {
                    if keep {
                        if let Some(v) = pull(&mut *state, is_null[written])? {
                            values[written] = v;
                        }
                        written += 1;
                    } else {
                        pull(&mut *state, true)?;
                    }
                }
            }
            Some(selection) => {
                scratch.clear();
                scratch.resize(seg.len, false);
                if has_null {
                    state.null_cursor.unpack(&chunk, &mut scratch, 0, seg.len, order)?;
                }
                let mask = &selection[request_row..request_row + seg.len];
                for (&null, keep) in scratch.iter().zip(mask.iter().by_vals()) {
                    let value = pull(&mut *state, null)?;
                    if keep {
                        is_null[written] = null;
                        if null {
                            *no_nulls = false;
                        } else if let Some(v) = value {
                            values[written] = v;
                        }
                        written += 1;
                    }
                }
            }
        }

        request_row += seg.len;
        state.element_index += seg.len;
        if seg.ends_pixel {
            state.null_cursor.align_to_byte();
        }
    }
    Ok(written - vector_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_never_cross_pixels() {
        let segs = segments(6, 9, 4);
        let lens: Vec<usize> = segs.iter().map(|s| s.len).collect();
        let pixels: Vec<usize> = segs.iter().map(|s| s.pixel_id).collect();
        let ends: Vec<bool> = segs.iter().map(|s| s.ends_pixel).collect();
        assert_eq!(lens, vec![2, 4, 3]);
        assert_eq!(pixels, vec![1, 2, 3]);
        assert_eq!(ends, vec![true, true, false]);
    }

    #[test]
    fn test_segments_empty_request() {
        assert!(segments(3, 0, 4).is_empty());
        assert_eq!(
            segments(0, 4, 4),
            vec![Segment { pixel_id: 0, len: 4, ends_pixel: true }]
        );
    }

    #[test]
    fn test_teardown_closes_state() {
        let mut state = DecodeState::new();
        let chunk: ChunkBytes = vec![0u8; 4].into();
        let index = ChunkIndex { is_null_offset: 4, ..Default::default() };
        begin_read(&mut state, &chunk, &index, 0, 4, ContentLayout::Sparse { width: 4 }).unwrap();
        assert!(state.is_open());
        let result: Result<(), MosaicError> =
            teardown_on_error(&mut state, Err(MosaicError::MalformedLayout("x".into())));
        assert!(result.is_err());
        assert!(!state.is_open());
        let err = begin_read(&mut state, &chunk, &index, 4, 4, ContentLayout::Sparse { width: 4 })
            .unwrap_err();
        assert!(matches!(err, MosaicError::ResourceClosed(_)));
    }

    #[test]
    fn test_zero_stride_rejected() {
        let mut state = DecodeState::new();
        let chunk: ChunkBytes = vec![0u8; 4].into();
        let index = ChunkIndex::default();
        let err = begin_read(&mut state, &chunk, &index, 0, 0, ContentLayout::RunLength)
            .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidArgument(_)));
    }

    #[test]
    fn test_short_selection_rejected() {
        let mut state = DecodeState::new();
        let chunk: ChunkBytes = vec![0u8; 8].into();
        let index = ChunkIndex { is_null_offset: 8, ..Default::default() };
        begin_read(&mut state, &chunk, &index, 0, 4, ContentLayout::Sparse { width: 4 }).unwrap();
        let mut values = vec![0i32; 4];
        let mut is_null = vec![false; 4];
        let mut no_nulls = true;
        let selection = bitvec![1; 2];
        let err = decode_rows(
            &mut state,
            &index,
            4,
            4,
            0,
            RowTarget { values: &mut values, is_null: &mut is_null, no_nulls: &mut no_nulls },
            Some(selection.as_bitslice()),
            |_, _| Ok(None),
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidArgument(_)));
    }
}
