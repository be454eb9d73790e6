// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` connects Arrow arrays to the Arrow-agnostic column writers and
// readers. The codec itself only knows `ColumnVector`s, chunk bytes and chunk
// indexes; everything Arrow-specific lives here.
//
// Data Flow (Encoding):
//
//   1. [Stateless API (encode_arrow_column)] -> Receives `&dyn Array` + `WriterOptions`
//         |
//         `-> a. Calls `arrow_impl` to convert `&dyn Array` -> `ColumnVector`
//         |
//         `-> b. Feeds the vector to `writer::new_column_writer(..)` and flushes
//
//   2. [EncodedChunk] -> bytes + `ChunkIndex` + `ColumnEncoding` + row count
//
//
// Data Flow (Decoding):
//
//   1. [Stateless API (decode_arrow_column)] -> Receives `&EncodedChunk`
//         |
//         `-> a. Reads every row with a `reader::ColumnReader`
//         |
//         `-> b. Calls `arrow_impl` to convert `ColumnVector` -> `ArrayRef`
//
// ====================================================================================
pub mod arrow_impl;
pub mod format;
pub mod stateless_api;

pub use arrow_impl::{arrow_to_vector, vector_to_arrow};
pub use format::{ChunkStats, EncodedChunk};
pub use stateless_api::{analyze_chunk, decode_arrow_column, encode_arrow_column};
