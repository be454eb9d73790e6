//! This module contains the kernels for Zig-zag encoding and decoding.
//!
//! Signed run-length streams zig-zag every base and literal value before the
//! LEB128 step so that small negative numbers stay small on disk.

//==================================================================================
// 1. Core Logic
//==================================================================================

/// Encodes a single signed integer using the Zig-zag algorithm.
#[inline]
pub fn encode_val(n: i64) -> u64 {
    // The right shift must be arithmetic.
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a single unsigned integer back to its signed representation.
#[inline]
pub fn decode_val(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

//==================================================================================
// 2. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_core_logic() {
        assert_eq!(encode_val(0), 0);
        assert_eq!(encode_val(-1), 1);
        assert_eq!(encode_val(1), 2);
        assert_eq!(encode_val(-5), 9);
        assert_eq!(encode_val(4), 8);

        assert_eq!(decode_val(0), 0);
        assert_eq!(decode_val(1), -1);
        assert_eq!(decode_val(2), 1);
    }

    #[test]
    fn test_max_min_values() {
        for v in [i64::MAX, i64::MIN, -1, 0, 1] {
            assert_eq!(decode_val(encode_val(v)), v);
        }
    }
}
