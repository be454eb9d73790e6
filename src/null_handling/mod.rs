//! This module serves as the public API for all null-handling logic of the
//! codec.
//!
//! Nulls are kept out of the content section and described by a per-pixel
//! bitmap in the isNull section. The writer side compacts one pixel's null
//! flags at a time; the reader side walks the section with a `NullCursor`
//! that survives across resumable reads.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Per-pixel bitmap construction and the cross-call read cursor.
pub mod bitmap;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use bitmap::{compact_pixel_nulls, NullCursor};

//==================================================================================
// 3. Unit Tests (Module-level integration tests)
//==================================================================================

#[cfg(test)]
mod bitmap_tests;
