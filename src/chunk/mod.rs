//! Chunk-level metadata: the index and encoding records that accompany a
//! chunk's bytes, and the statistics accumulator that fills them.

pub mod format;
pub mod statistics;

pub use format::{
    ChunkIndex, ColumnEncoding, ColumnStatistic, EncodingKind, PixelStatistic, StatisticRange,
};
pub use statistics::StatsRecorder;

/// The immutable bytes of one column chunk.
pub type ChunkBytes = std::sync::Arc<[u8]>;
