//! This module collects the pure encoding kernels the column writers and
//! readers are built on.
//!
//! Kernels know nothing about pixels, chunk indexes or vectors: they turn
//! values into bytes and back. Pixel stepping and cursor bookkeeping live in
//! `writer`, `reader` and `null_handling`.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Null bitmaps
pub mod bitpack;

/// Integer streams
pub mod leb128;
pub mod rle;
pub mod zigzag;

/// String tables
pub mod dictionary;

pub use bitpack::Selection;
pub use rle::{RunLengthDecoder, RunLengthEncoder};
