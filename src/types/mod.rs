//! This module defines the core, strongly-typed data representations used
//! throughout the codec: the logical column type, the chunk byte order and the
//! fixed-width value contract.

pub mod byte_order;
pub mod column_type;
pub mod fixed_width;

// Re-export the main types for easier access.
pub use byte_order::ByteOrder;
pub use column_type::ColumnType;
pub use fixed_width::FixedWidth;
