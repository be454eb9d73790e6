//! This module contains the dictionary kernel for string columns.
//!
//! The dictionary keeps distinct strings (`origins`) in first-seen order and
//! a sorted-rank permutation (`orders`) over them. Rows store the *rank* of
//! their value, so a row resolves to `origins[orders[rank]]`.
//!
//! ### On-Disk Format
//! The tables follow the run-length coded ranks inside the content section:
//! 1.  **Origins (`[u8]`)**: the distinct strings, concatenated.
//! 2.  **Starts (`[i32]`)**: byte offset of each origin inside the origins region.
//! 3.  **Orders (`[i32]`)**: origin index of each sorted rank.
//! 4.  **Footer (`[i32; 3]`)**: `originsOffset`, `startsOffset`, `ordersOffset`,
//!     always the last 12 bytes of the content section.
//!
//! All integers use the chunk byte order.

use bitvec::prelude::*;
use hashbrown::HashMap;

use crate::error::MosaicError;
use crate::types::ByteOrder;

pub const FOOTER_LEN: usize = 12;

fn to_i32(value: usize, what: &str) -> Result<i32, MosaicError> {
    i32::try_from(value).map_err(|_| {
        MosaicError::DictionaryError(format!("{} {} does not fit into an i32", what, value))
    })
}

//==================================================================================
// 1. Write Side
//==================================================================================

/// Section offsets recorded in the dictionary footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryOffsets {
    pub origins: usize,
    pub starts: usize,
    pub orders: usize,
}

impl DictionaryOffsets {
    pub fn write_footer(&self, order: ByteOrder, out: &mut Vec<u8>) -> Result<(), MosaicError> {
        order.write_i32(to_i32(self.origins, "origins offset")?, out);
        order.write_i32(to_i32(self.starts, "starts offset")?, out);
        order.write_i32(to_i32(self.orders, "orders offset")?, out);
        Ok(())
    }
}

/// Collects distinct strings in first-seen order.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    ids: HashMap<String, u32>,
    origins: Vec<String>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the origin index of `value`, adding it if unseen.
    pub fn add(&mut self, value: &str) -> u32 {
        if let Some(&id) = self.ids.get(value) {
            return id;
        }
        let id = self.origins.len() as u32;
        self.origins.push(value.to_string());
        self.ids.insert(value.to_string(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Returns `(orders, ranks)`: `orders[rank]` is an origin index and
    /// `ranks[origin]` is its inverse.
    pub fn sort(&self) -> (Vec<u32>, Vec<u32>) {
        let mut orders: Vec<u32> = (0..self.origins.len() as u32).collect();
        orders.sort_by(|&a, &b| self.origins[a as usize].cmp(&self.origins[b as usize]));
        let mut ranks = vec![0u32; orders.len()];
        for (rank, &origin) in orders.iter().enumerate() {
            ranks[origin as usize] = rank as u32;
        }
        (orders, ranks)
    }

    /// Appends origins, starts and orders to `out` and returns their offsets.
    pub fn write_tables(
        &self,
        orders: &[u32],
        order: ByteOrder,
        out: &mut Vec<u8>,
    ) -> Result<DictionaryOffsets, MosaicError> {
        let origins_offset = out.len();
        let mut starts = Vec::with_capacity(self.origins.len());
        for origin in &self.origins {
            starts.push(to_i32(out.len() - origins_offset, "origin start")?);
            out.extend_from_slice(origin.as_bytes());
        }

        let starts_offset = out.len();
        for start in starts {
            order.write_i32(start, out);
        }

        let orders_offset = out.len();
        for &origin in orders {
            order.write_i32(to_i32(origin as usize, "origin index")?, out);
        }

        Ok(DictionaryOffsets {
            origins: origins_offset,
            starts: starts_offset,
            orders: orders_offset,
        })
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.origins.clear();
    }
}

//==================================================================================
// 2. Read Side
//==================================================================================

/// A dictionary parsed from a chunk's content section.
#[derive(Debug, Clone, PartialEq)]
pub struct StringDictionary {
    origins: Vec<String>,
    orders: Vec<u32>,
    encoded_values_end: usize,
}

impl StringDictionary {
    /// Parses the dictionary from `content`, which must end with the footer.
    pub fn read(content: &[u8], order: ByteOrder) -> Result<Self, MosaicError> {
        let footer_pos = content.len().checked_sub(FOOTER_LEN).ok_or_else(|| {
            MosaicError::MalformedLayout(format!(
                "Dictionary content of {} bytes cannot hold its footer",
                content.len()
            ))
        })?;
        let read_offset = |pos: usize| -> Result<usize, MosaicError> {
            let raw = order
                .read_i32(content, pos)
                .ok_or_else(|| MosaicError::MalformedLayout("Truncated dictionary footer".into()))?;
            usize::try_from(raw).map_err(|_| {
                MosaicError::MalformedLayout(format!("Negative dictionary offset {}", raw))
            })
        };
        let origins_offset = read_offset(footer_pos)?;
        let starts_offset = read_offset(footer_pos + 4)?;
        let orders_offset = read_offset(footer_pos + 8)?;

        if !(origins_offset <= starts_offset
            && starts_offset <= orders_offset
            && orders_offset <= footer_pos)
        {
            return Err(MosaicError::MalformedLayout(format!(
                "Dictionary offsets out of range: origins {}, starts {}, orders {}, footer at {}",
                origins_offset, starts_offset, orders_offset, footer_pos
            )));
        }
        let starts_len = orders_offset - starts_offset;
        if starts_len % 4 != 0 {
            return Err(MosaicError::MalformedLayout(format!(
                "Starts region of {} bytes is not a whole number of i32",
                starts_len
            )));
        }
        let num_origins = starts_len / 4;
        if orders_offset + num_origins * 4 > footer_pos {
            return Err(MosaicError::MalformedLayout(format!(
                "Orders region too short for {} origins",
                num_origins
            )));
        }

        let origins_region = &content[origins_offset..starts_offset];
        let mut starts = Vec::with_capacity(num_origins);
        let mut orders = Vec::with_capacity(num_origins);
        for i in 0..num_origins {
            starts.push(read_offset(starts_offset + i * 4)?);
            orders.push(read_offset(orders_offset + i * 4)?);
        }

        let mut origins = Vec::with_capacity(num_origins);
        for i in 0..num_origins {
            let end = if i + 1 < num_origins {
                starts[i + 1]
            } else {
                origins_region.len()
            };
            let span = origins_region.get(starts[i]..end).ok_or_else(|| {
                MosaicError::MalformedLayout(format!(
                    "Origin {} spans [{}, {}) outside a region of {} bytes",
                    i,
                    starts[i],
                    end,
                    origins_region.len()
                ))
            })?;
            origins.push(String::from_utf8(span.to_vec())?);
        }

        let orders = validate_permutation(&orders)?;
        Ok(Self {
            origins,
            orders,
            encoded_values_end: origins_offset,
        })
    }

    /// Length of the run-length coded ranks at the front of the content.
    pub fn encoded_values_end(&self) -> usize {
        self.encoded_values_end
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub fn orders(&self) -> &[u32] {
        &self.orders
    }

    /// Resolves a decoded rank to its string.
    pub fn resolve(&self, rank: i64) -> Result<&str, MosaicError> {
        usize::try_from(rank)
            .ok()
            .and_then(|r| self.orders.get(r))
            .map(|&origin| self.origins[origin as usize].as_str())
            .ok_or_else(|| {
                MosaicError::MalformedLayout(format!(
                    "Dictionary rank {} out of range for {} entries",
                    rank,
                    self.orders.len()
                ))
            })
    }
}

/// Checks that `orders` is a permutation of `[0, orders.len())`.
fn validate_permutation(orders: &[usize]) -> Result<Vec<u32>, MosaicError> {
    let mut seen = bitvec![0; orders.len()];
    for (rank, &origin) in orders.iter().enumerate() {
        if origin >= orders.len() {
            return Err(MosaicError::InvalidPermutation {
                origins: orders.len(),
                detail: format!("rank {} points at origin {}", rank, origin),
            });
        }
        if seen.replace(origin, true) {
            return Err(MosaicError::InvalidPermutation {
                origins: orders.len(),
                detail: format!("origin {} appears twice", origin),
            });
        }
    }
    Ok(orders.iter().map(|&o| o as u32).collect())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn build(values: &[&str], order: ByteOrder) -> (Vec<u8>, Vec<u32>) {
        let mut builder = DictionaryBuilder::new();
        let ids: Vec<u32> = values.iter().map(|v| builder.add(v)).collect();
        let (orders, ranks) = builder.sort();
        let mut content = vec![0xAA, 0xBB]; // stand-in for the encoded ranks
        let offsets = builder.write_tables(&orders, order, &mut content).unwrap();
        offsets.write_footer(order, &mut content).unwrap();
        let row_ranks = ids.iter().map(|&id| ranks[id as usize]).collect();
        (content, row_ranks)
    }

    #[test]
    fn test_builder_first_seen_order_and_ranks() {
        let mut builder = DictionaryBuilder::new();
        for v in ["pear", "apple", "pear", "fig"] {
            builder.add(v);
        }
        assert_eq!(builder.origins(), &["pear", "apple", "fig"]);
        let (orders, ranks) = builder.sort();
        assert_eq!(orders, vec![1, 2, 0]);
        assert_eq!(ranks, vec![2, 0, 1]);
    }

    #[test]
    fn test_tables_roundtrip_both_orders() {
        let values = ["pear", "apple", "pear", "fig", "", "apple"];
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let (content, row_ranks) = build(&values, order);
            let dict = StringDictionary::read(&content, order).unwrap();
            assert_eq!(dict.encoded_values_end(), 2);
            assert_eq!(dict.len(), 4);
            for (value, rank) in values.iter().zip(row_ranks) {
                assert_eq!(dict.resolve(rank as i64).unwrap(), *value);
            }
        }
    }

    #[test]
    fn test_padding_before_footer_is_ignored() {
        let mut builder = DictionaryBuilder::new();
        builder.add("b");
        builder.add("a");
        let (orders, _) = builder.sort();
        let mut content = Vec::new();
        let offsets = builder
            .write_tables(&orders, ByteOrder::BigEndian, &mut content)
            .unwrap();
        content.extend_from_slice(&[0, 0, 0]);
        offsets.write_footer(ByteOrder::BigEndian, &mut content).unwrap();
        let dict = StringDictionary::read(&content, ByteOrder::BigEndian).unwrap();
        assert_eq!(dict.resolve(0).unwrap(), "a");
        assert_eq!(dict.resolve(1).unwrap(), "b");
    }

    #[test]
    fn test_invalid_permutation_rejected() {
        let (mut content, _) = build(&["x", "y"], ByteOrder::BigEndian);
        let footer = content.len() - FOOTER_LEN;
        let orders_offset = ByteOrder::BigEndian.read_i32(&content, footer + 8).unwrap() as usize;
        // Make both ranks point at origin 0.
        content[orders_offset..orders_offset + 8].copy_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let err = StringDictionary::read(&content, ByteOrder::BigEndian).unwrap_err();
        assert!(matches!(err, MosaicError::InvalidPermutation { origins: 2, .. }));
    }

    #[test]
    fn test_offsets_out_of_range_rejected() {
        let mut content = Vec::new();
        for v in [0, 50, 40] {
            ByteOrder::BigEndian.write_i32(v, &mut content);
        }
        let err = StringDictionary::read(&content, ByteOrder::BigEndian).unwrap_err();
        assert!(matches!(err, MosaicError::MalformedLayout(_)));
        assert!(StringDictionary::read(&[1, 2, 3], ByteOrder::BigEndian).is_err());
    }

    #[test]
    fn test_rank_out_of_range() {
        let (content, _) = build(&["only"], ByteOrder::LittleEndian);
        let dict = StringDictionary::read(&content, ByteOrder::LittleEndian).unwrap();
        assert!(dict.resolve(1).is_err());
        assert!(dict.resolve(-1).is_err());
    }
}
