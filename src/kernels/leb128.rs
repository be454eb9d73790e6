//! This module contains the kernels for LEB128 (Little-Endian Base 128)
//! variable-length integer encoding and decoding.
//!
//! Every base value and literal inside a run-length stream is stored as a
//! LEB128 varint, so small magnitudes cost a single byte. Decoding pulls from
//! any `std::io::Read` so the run-length decoder can stay streaming.

use num_traits::{PrimInt, Unsigned};
use std::io::{ErrorKind, Read};

use crate::error::MosaicError;

//==================================================================================
// 1. Single-Value Operations
//==================================================================================

/// Encodes a single unsigned integer into a LEB128 byte sequence, appending to `buffer`.
pub fn encode_one<T>(value: T, buffer: &mut Vec<u8>) -> Result<(), MosaicError>
where
    T: PrimInt + Unsigned,
{
    let zero = T::zero();
    let seven_bit_mask = T::from(0x7F).ok_or_else(|| {
        MosaicError::Leb128DecodeError("Failed to create 7-bit mask for type".to_string())
    })?;

    let mut current_value = value;
    loop {
        let payload = (current_value & seven_bit_mask).to_u8().ok_or_else(|| {
            MosaicError::Leb128DecodeError("Failed to convert generic integer to u8".to_string())
        })?;
        current_value = current_value >> 7;
        if current_value == zero {
            buffer.push(payload);
            return Ok(());
        }
        buffer.push(payload | 0x80);
    }
}

/// Decodes a single `u64` from a byte stream.
pub fn decode_one<R: Read>(input: &mut R) -> Result<u64, MosaicError> {
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let byte = read_byte(input)?;
        if shift >= 64 || (shift == 63 && (byte & 0x7F) > 1) {
            return Err(MosaicError::Leb128DecodeError(
                "Integer overflow during decoding".to_string(),
            ));
        }
        result |= u64::from(byte & 0x7F) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

fn read_byte<R: Read>(input: &mut R) -> Result<u8, MosaicError> {
    let mut byte = [0u8; 1];
    input.read_exact(&mut byte).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            MosaicError::Leb128DecodeError("Unexpected end of buffer".to_string())
        }
        _ => MosaicError::Io(e),
    })?;
    Ok(byte[0])
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leb128_roundtrip_u64() {
        let original: Vec<u64> = vec![0, 127, 128, 1000, u32::MAX as u64, u64::MAX];
        let mut encoded_bytes = Vec::new();
        for &value in &original {
            encode_one(value, &mut encoded_bytes).unwrap();
        }
        let mut cursor = encoded_bytes.as_slice();
        let decoded: Vec<u64> = (0..original.len())
            .map(|_| decode_one(&mut cursor).unwrap())
            .collect();
        assert_eq!(decoded, original);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_known_encoding() {
        let mut buf = Vec::new();
        encode_one(624485u64, &mut buf).unwrap();
        assert_eq!(buf, vec![0xE5, 0x8E, 0x26]);
        encode_one(300u32, &mut buf).unwrap();
        assert_eq!(&buf[3..], &[0xAC, 0x02]);
    }

    #[test]
    fn test_decode_truncated_buffer() {
        let err = decode_one(&mut &[0xE5u8, 0x8E][..]).unwrap_err();
        assert!(err.to_string().contains("Unexpected end of buffer"));
    }

    #[test]
    fn test_decode_overflow_error() {
        // This represents a value larger than u64::MAX
        let encoded_bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let result = decode_one(&mut &encoded_bytes[..]);
        if let Err(MosaicError::Leb128DecodeError(msg)) = result {
            assert!(msg.contains("overflow"));
        } else {
            panic!("Expected Leb128DecodeError");
        }
    }

    #[test]
    fn test_decode_stops_after_one_value() {
        let mut cursor = &[0x01u8, 0x02][..];
        assert_eq!(decode_one(&mut cursor).unwrap(), 1);
        assert_eq!(cursor, &[0x02u8][..]);
    }
}
