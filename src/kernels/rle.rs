//! This module contains the stateful Run-Length Encoding (RLE) integer codec.
//!
//! Unlike a one-shot slice kernel, both halves keep state between calls: the
//! encoder is push-based (`write` then `flush`) so a column writer can emit
//! one pixel at a time, and the decoder is pull-based (`next`) so a column
//! reader can stop in the middle of a run and resume on its next call.
//!
//! ### Stream Format
//! A stream is a sequence of groups, each starting with a header byte `h`
//! interpreted as an `i8`:
//! * `h >= 0`: a **repeated run** of `h + 3` values. A delta byte (`i8`) and
//!   a base varint follow; value `i` of the run is `base + i * delta`.
//! * `h < 0`: a **literal group** of `-h` values, each stored as a varint.
//!
//! Varints are LEB128. Signed streams zig-zag each value first.

use std::io::{ErrorKind, Read};

use crate::error::MosaicError;
use super::{leb128, zigzag};

//==================================================================================
// Format Constants
//==================================================================================
const MIN_REPEAT_SIZE: usize = 3;
const MAX_REPEAT_SIZE: usize = 127 + MIN_REPEAT_SIZE;
const MAX_LITERAL_SIZE: usize = 128;
const MIN_DELTA: i128 = -128;
const MAX_DELTA: i128 = 127;

fn write_varint(value: i64, signed: bool, out: &mut Vec<u8>) -> Result<(), MosaicError> {
    if signed {
        leb128::encode_one(zigzag::encode_val(value), out)
    } else {
        leb128::encode_one(value as u64, out)
    }
}

fn read_varint<R: Read>(input: &mut R, signed: bool) -> Result<i64, MosaicError> {
    let raw = leb128::decode_one(input).map_err(|e| match e {
        MosaicError::Leb128DecodeError(msg) => MosaicError::RleDecodeError(msg),
        other => other,
    })?;
    Ok(if signed {
        zigzag::decode_val(raw)
    } else {
        raw as i64
    })
}

/// Returns the delta between two values if it fits into a run's delta byte.
fn small_delta(value: i64, previous: i64) -> Option<i64> {
    let delta = value as i128 - previous as i128;
    (MIN_DELTA..=MAX_DELTA).contains(&delta).then_some(delta as i64)
}

//==================================================================================
// 1. Encoder
//==================================================================================

/// Push-based run-length encoder.
pub struct RunLengthEncoder {
    signed: bool,
    output: Vec<u8>,
    literals: [i64; MAX_LITERAL_SIZE],
    num_literals: usize,
    delta: i64,
    repeat: bool,
    tail_run_length: usize,
}

impl RunLengthEncoder {
    pub fn new(signed: bool) -> Self {
        Self {
            signed,
            output: Vec::new(),
            literals: [0; MAX_LITERAL_SIZE],
            num_literals: 0,
            delta: 0,
            repeat: false,
            tail_run_length: 0,
        }
    }

    /// Appends a value to the in-progress run.
    pub fn write(&mut self, value: i64) -> Result<(), MosaicError> {
        if self.num_literals == 0 {
            self.literals[0] = value;
            self.num_literals = 1;
            self.tail_run_length = 1;
            return Ok(());
        }

        if self.repeat {
            let expected = self.literals[0]
                .wrapping_add(self.delta.wrapping_mul(self.num_literals as i64));
            if value == expected {
                self.num_literals += 1;
                if self.num_literals == MAX_REPEAT_SIZE {
                    self.write_values()?;
                }
            } else {
                self.write_values()?;
                self.literals[0] = value;
                self.num_literals = 1;
                self.tail_run_length = 1;
            }
            return Ok(());
        }

        let last = self.literals[self.num_literals - 1];
        if self.tail_run_length > 1 && value == last.wrapping_add(self.delta) {
            self.tail_run_length += 1;
        } else {
            match small_delta(value, last) {
                Some(delta) => {
                    self.delta = delta;
                    self.tail_run_length = 2;
                }
                None => self.tail_run_length = 1,
            }
        }

        if self.tail_run_length == MIN_REPEAT_SIZE {
            if self.num_literals + 1 == MIN_REPEAT_SIZE {
                self.repeat = true;
                self.num_literals += 1;
            } else {
                // The last two buffered literals start the run.
                self.num_literals -= MIN_REPEAT_SIZE - 1;
                let base = self.literals[self.num_literals];
                self.write_values()?;
                self.literals[0] = base;
                self.repeat = true;
                self.num_literals = MIN_REPEAT_SIZE;
            }
        } else {
            self.literals[self.num_literals] = value;
            self.num_literals += 1;
            if self.num_literals == MAX_LITERAL_SIZE {
                self.write_values()?;
            }
        }
        Ok(())
    }

    /// Forces emission of the pending run or literal group.
    pub fn flush(&mut self) -> Result<(), MosaicError> {
        self.write_values()
    }

    /// Flushes and moves the encoded bytes to the end of `out`.
    pub fn drain_into(&mut self, out: &mut Vec<u8>) -> Result<(), MosaicError> {
        self.flush()?;
        out.append(&mut self.output);
        Ok(())
    }

    /// Flushes and hands over the encoded bytes.
    pub fn take_bytes(&mut self) -> Result<Vec<u8>, MosaicError> {
        self.flush()?;
        Ok(std::mem::take(&mut self.output))
    }

    /// Drops pending values and emitted bytes, keeping the allocation.
    pub fn clear(&mut self) {
        self.output.clear();
        self.num_literals = 0;
        self.repeat = false;
        self.tail_run_length = 0;
        self.delta = 0;
    }

    fn write_values(&mut self) -> Result<(), MosaicError> {
        if self.num_literals == 0 {
            return Ok(());
        }
        if self.repeat {
            self.output.push((self.num_literals - MIN_REPEAT_SIZE) as u8);
            self.output.push(self.delta as i8 as u8);
            write_varint(self.literals[0], self.signed, &mut self.output)?;
        } else {
            self.output.push((-(self.num_literals as i32)) as i8 as u8);
            for i in 0..self.num_literals {
                write_varint(self.literals[i], self.signed, &mut self.output)?;
            }
        }
        self.repeat = false;
        self.num_literals = 0;
        self.tail_run_length = 0;
        Ok(())
    }
}

//==================================================================================
// 2. Decoder
//==================================================================================

/// Pull-based run-length decoder over a byte stream.
///
/// Run state survives between `next` calls, so callers may interleave pulls
/// with other work (e.g. stepping over pixel boundaries) without losing their
/// place. Once closed, the stream is released and further pulls fail.
pub struct RunLengthDecoder<R> {
    input: Option<R>,
    signed: bool,
    literals: [i64; MAX_LITERAL_SIZE],
    num_literals: usize,
    used: usize,
    repeat: bool,
    delta: i64,
}

impl<R: Read> RunLengthDecoder<R> {
    pub fn new(input: R, signed: bool) -> Self {
        Self {
            input: Some(input),
            signed,
            literals: [0; MAX_LITERAL_SIZE],
            num_literals: 0,
            used: 0,
            repeat: false,
            delta: 0,
        }
    }

    /// Returns the next logical value of the stream.
    pub fn next(&mut self) -> Result<i64, MosaicError> {
        if self.input.is_none() {
            return Err(MosaicError::ResourceClosed("run-length decoder"));
        }
        if self.used == self.num_literals {
            self.read_values()?;
        }
        let value = if self.repeat {
            self.literals[0].wrapping_add(self.delta.wrapping_mul(self.used as i64))
        } else {
            self.literals[self.used]
        };
        self.used += 1;
        Ok(value)
    }

    /// Releases the underlying stream. Calling it twice is a no-op.
    pub fn close(&mut self) {
        self.input = None;
        self.num_literals = 0;
        self.used = 0;
    }

    pub fn is_closed(&self) -> bool {
        self.input.is_none()
    }

    fn read_values(&mut self) -> Result<(), MosaicError> {
        let signed = self.signed;
        let input = self
            .input
            .as_mut()
            .ok_or(MosaicError::ResourceClosed("run-length decoder"))?;

        let control = read_header_byte(input)? as i8;
        if control >= 0 {
            self.repeat = true;
            self.num_literals = control as usize + MIN_REPEAT_SIZE;
            self.delta = read_header_byte(input)? as i8 as i64;
            self.literals[0] = read_varint(input, signed)?;
        } else {
            self.repeat = false;
            self.num_literals = (-(control as i32)) as usize;
            for i in 0..self.num_literals {
                self.literals[i] = read_varint(input, signed)?;
            }
        }
        self.used = 0;
        Ok(())
    }
}

fn read_header_byte<R: Read>(input: &mut R) -> Result<u8, MosaicError> {
    let mut byte = [0u8; 1];
    input.read_exact(&mut byte).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            MosaicError::RleDecodeError("Unexpected end of run-length stream".to_string())
        }
        _ => MosaicError::Io(e),
    })?;
    Ok(byte[0])
}

//==================================================================================
// 3. Slice Helpers
//==================================================================================

/// Encodes a whole slice, appending to `output_buf`.
pub fn encode(input_slice: &[i64], signed: bool, output_buf: &mut Vec<u8>) -> Result<(), MosaicError> {
    let mut encoder = RunLengthEncoder::new(signed);
    for &value in input_slice {
        encoder.write(value)?;
    }
    encoder.drain_into(output_buf)
}

/// Decodes exactly `num_values` values from the front of `input_bytes`.
pub fn decode(input_bytes: &[u8], signed: bool, num_values: usize) -> Result<Vec<i64>, MosaicError> {
    let mut decoder = RunLengthDecoder::new(input_bytes, signed);
    let mut decoded = Vec::with_capacity(num_values);
    for _ in 0..num_values {
        decoded.push(decoder.next()?);
    }
    decoder.close();
    Ok(decoded)
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(values: &[i64], signed: bool) -> Vec<u8> {
        let mut encoded = Vec::new();
        encode(values, signed, &mut encoded).unwrap();
        assert_eq!(decode(&encoded, signed, values.len()).unwrap(), values);
        encoded
    }

    #[test]
    fn test_repeated_run_layout() {
        let encoded = roundtrip(&[7, 7, 7, 7, 7], true);
        // header 5 - 3, delta 0, zigzag(7) = 14
        assert_eq!(encoded, vec![2, 0, 14]);
    }

    #[test]
    fn test_literal_group_layout() {
        let encoded = roundtrip(&[1, 100, 3], false);
        assert_eq!(encoded, vec![(-3i8) as u8, 1, 100, 3]);
    }

    #[test]
    fn test_delta_run_after_literals() {
        let encoded = roundtrip(&[9, 500, 1, 2, 3, 4], true);
        // two literals, then a run of four with delta 1 starting at 1
        assert_eq!(encoded[0], (-2i8) as u8);
        assert!(encoded.ends_with(&[1, 1, 2]));
    }

    #[test]
    fn test_long_runs_and_literal_overflow() {
        let mut values: Vec<i64> = vec![42; 1000];
        values.extend((0..300).map(|i| (i * 7919) % 1013 - 500));
        values.extend((0..500).map(|i| 1_000_000 - 3 * i));
        roundtrip(&values, true);
    }

    #[test]
    fn test_extreme_values() {
        roundtrip(&[i64::MIN, i64::MAX, i64::MIN, 0, -1, i64::MAX - 1, i64::MAX], true);
        roundtrip(&[0, u32::MAX as i64, 5, 5, 5], false);
    }

    #[test]
    fn test_empty_slice_roundtrip() {
        let encoded = roundtrip(&[], true);
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_decoder_state_survives_between_calls() {
        let values: Vec<i64> = (0..40).map(|i| if i < 20 { 3 } else { i }).collect();
        let mut encoded = Vec::new();
        encode(&values, true, &mut encoded).unwrap();

        let mut decoder = RunLengthDecoder::new(encoded.as_slice(), true);
        let mut out = Vec::new();
        for _ in 0..7 {
            out.push(decoder.next().unwrap());
        }
        // Stop mid-run, then continue pulling from the same decoder.
        assert_eq!(out, values[..7]);
        for _ in 7..40 {
            out.push(decoder.next().unwrap());
        }
        assert_eq!(out, values);
        assert!(matches!(decoder.next(), Err(MosaicError::RleDecodeError(_))));
    }

    #[test]
    fn test_flushed_segments_concatenate() {
        let mut encoder = RunLengthEncoder::new(false);
        for v in [5, 5, 5, 5] {
            encoder.write(v).unwrap();
        }
        encoder.flush().unwrap();
        for v in [5, 5, 6] {
            encoder.write(v).unwrap();
        }
        let bytes = encoder.take_bytes().unwrap();
        assert_eq!(decode(&bytes, false, 7).unwrap(), vec![5, 5, 5, 5, 5, 5, 6]);
    }

    #[test]
    fn test_truncated_stream_error() {
        let mut encoded = Vec::new();
        encode(&[1, 300, 2], false, &mut encoded).unwrap();
        encoded.pop();
        let err = decode(&encoded, false, 3).unwrap_err();
        assert!(matches!(err, MosaicError::RleDecodeError(_)));
        assert!(err.is_malformed_layout());
    }

    #[test]
    fn test_next_after_close_is_resource_error() {
        let bytes = [2u8, 0, 2];
        let mut decoder = RunLengthDecoder::new(&bytes[..], false);
        assert_eq!(decoder.next().unwrap(), 2);
        decoder.close();
        decoder.close();
        assert!(matches!(decoder.next(), Err(MosaicError::ResourceClosed(_))));
    }
}
