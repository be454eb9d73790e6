//! The `FixedWidth` trait ties a Rust primitive to its on-disk slot, its
//! run-length representation, its statistics and its vector variant, so that
//! a single generic writer and reader serve every fixed-width column type.

use std::fmt;

use crate::chunk::statistics::StatsRecorder;
use crate::error::MosaicError;
use crate::types::{ByteOrder, ColumnType};
use crate::vector::{ColumnVector, PrimitiveVector};

pub trait FixedWidth: Copy + Default + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Size of one value slot in bytes.
    const WIDTH: usize;
    const COLUMN_TYPE: ColumnType;

    /// Reads one value starting at `pos`, or `None` if the slot is out of bounds.
    fn read(bytes: &[u8], pos: usize, order: ByteOrder) -> Option<Self>;

    fn write(self, order: ByteOrder, out: &mut Vec<u8>);

    /// The value as fed to the run-length encoder, `None` for types that are
    /// never run-length encoded.
    fn to_run_length(self) -> Option<i64>;

    /// Narrows a run-length decoded value, `None` if it does not fit.
    fn from_run_length(value: i64) -> Option<Self>;

    fn record(self, stats: &mut StatsRecorder);

    fn vector(vector: &ColumnVector) -> Result<&PrimitiveVector<Self>, MosaicError>;

    fn vector_mut(vector: &mut ColumnVector) -> Result<&mut PrimitiveVector<Self>, MosaicError>;
}

macro_rules! impl_fixed_width {
    ($t:ty, $variant:ident, $width:expr, int) => {
        impl FixedWidth for $t {
            const WIDTH: usize = $width;
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            impl_fixed_width!(@io $t, $width);

            fn to_run_length(self) -> Option<i64> {
                Some(self as i64)
            }

            fn from_run_length(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn record(self, stats: &mut StatsRecorder) {
                stats.update_integer(self as i64);
            }

            impl_fixed_width!(@vector $t, $variant);
        }
    };
    ($t:ty, $variant:ident, $width:expr, float) => {
        impl FixedWidth for $t {
            const WIDTH: usize = $width;
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            impl_fixed_width!(@io $t, $width);

            fn to_run_length(self) -> Option<i64> {
                None
            }

            fn from_run_length(_value: i64) -> Option<Self> {
                None
            }

            fn record(self, stats: &mut StatsRecorder) {
                stats.update_double(self as f64);
            }

            impl_fixed_width!(@vector $t, $variant);
        }
    };
    (@io $t:ty, $width:expr) => {
        fn read(bytes: &[u8], pos: usize, order: ByteOrder) -> Option<Self> {
            let raw: [u8; $width] = bytes.get(pos..pos + $width)?.try_into().ok()?;
            Some(match order {
                ByteOrder::BigEndian => <$t>::from_be_bytes(raw),
                ByteOrder::LittleEndian => <$t>::from_le_bytes(raw),
            })
        }

        fn write(self, order: ByteOrder, out: &mut Vec<u8>) {
            match order {
                ByteOrder::BigEndian => out.extend_from_slice(&self.to_be_bytes()),
                ByteOrder::LittleEndian => out.extend_from_slice(&self.to_le_bytes()),
            }
        }
    };
    (@vector $t:ty, $variant:ident) => {
        fn vector(vector: &ColumnVector) -> Result<&PrimitiveVector<Self>, MosaicError> {
            match vector {
                ColumnVector::$variant(v) => Ok(v),
                other => Err(MosaicError::VectorTypeMismatch {
                    expected: stringify!($variant),
                    actual: other.type_name(),
                }),
            }
        }

        fn vector_mut(
            vector: &mut ColumnVector,
        ) -> Result<&mut PrimitiveVector<Self>, MosaicError> {
            match vector {
                ColumnVector::$variant(v) => Ok(v),
                other => Err(MosaicError::VectorTypeMismatch {
                    expected: stringify!($variant),
                    actual: other.type_name(),
                }),
            }
        }
    };
}

impl_fixed_width!(i32, Int32, 4, int);
impl_fixed_width!(i64, Int64, 8, int);
impl_fixed_width!(f32, Float32, 4, float);
impl_fixed_width!(f64, Float64, 8, float);
