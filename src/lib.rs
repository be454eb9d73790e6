//! This file is the root of the `mosaic_codec` Rust crate.
//!
//! The crate encodes and decodes single column chunks of a pixel-structured
//! columnar format: a content section (fixed-width slots, run-length streams
//! or dictionary-encoded strings) followed by a per-pixel null bitmap, with a
//! `ChunkIndex` carrying pixel positions and statistics next to the bytes.
//!
//! Its responsibilities are strictly limited to declaring the top-level
//! modules and re-exporting the types most callers need.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod observability;

pub mod bridge;
pub mod chunk;
pub mod config;
pub mod error;
pub mod kernels;
pub mod null_handling;
pub mod reader;
pub mod types;
pub mod vector;
pub mod writer;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use chunk::{ChunkBytes, ChunkIndex, ColumnEncoding, EncodingKind};
pub use config::{EncodingLevel, WriterOptions};
pub use error::MosaicError;
pub use kernels::Selection;
pub use reader::{ColumnReader, DecodeState};
pub use types::{ByteOrder, ColumnType};
pub use vector::{ColumnVector, PrimitiveVector, StringVector};
pub use writer::{new_column_writer, ColumnWriter};
