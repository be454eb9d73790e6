//! Byte order of a column chunk.
//!
//! The same flag drives two things: the byte order of fixed-width values and
//! footer integers, and the bit order inside each byte of the null bitmap
//! (big-endian packs the first row into the most significant bit).

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// Maps the `little_endian` flag stored in a chunk index to a byte order.
    pub fn from_little_endian(little_endian: bool) -> Self {
        if little_endian {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    pub fn is_little_endian(&self) -> bool {
        matches!(self, ByteOrder::LittleEndian)
    }

    /// Reads a 4-byte signed integer at `pos`. Used for the string footers and
    /// the dictionary `starts`/`orders` arrays.
    pub fn read_i32(&self, bytes: &[u8], pos: usize) -> Option<i32> {
        let raw: [u8; 4] = bytes.get(pos..pos + 4)?.try_into().ok()?;
        Some(match self {
            ByteOrder::BigEndian => i32::from_be_bytes(raw),
            ByteOrder::LittleEndian => i32::from_le_bytes(raw),
        })
    }

    pub fn write_i32(&self, value: i32, out: &mut Vec<u8>) {
        match self {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
}
