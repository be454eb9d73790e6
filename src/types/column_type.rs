//! This module defines the canonical, type-safe representation of the logical
//! column types the codec can write and read.

use crate::error::MosaicError;
use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical type of a column chunk.
///
/// Every variant has exactly one writer, one reader and one vector variant, so
/// dispatch over column kinds is a closed `match` instead of a type hierarchy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
}

impl ColumnType {
    /// Converts an Arrow `DataType` into a `ColumnType`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self, MosaicError> {
        match arrow_type {
            ArrowDataType::Int32 => Ok(Self::Int32),
            ArrowDataType::Int64 => Ok(Self::Int64),
            ArrowDataType::Float32 => Ok(Self::Float32),
            ArrowDataType::Float64 => Ok(Self::Float64),
            ArrowDataType::Utf8 => Ok(Self::Utf8),
            dt => Err(MosaicError::UnsupportedType(format!(
                "Cannot convert Arrow type {:?} to ColumnType",
                dt
            ))),
        }
    }

    /// Converts a `ColumnType` back into an Arrow `DataType`.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::Int32 => ArrowDataType::Int32,
            Self::Int64 => ArrowDataType::Int64,
            Self::Float32 => ArrowDataType::Float32,
            Self::Float64 => ArrowDataType::Float64,
            Self::Utf8 => ArrowDataType::Utf8,
        }
    }

    /// Returns `true` if values of this type can be run-length encoded.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_type_mapping_is_symmetric() {
        for ty in [
            ColumnType::Int32,
            ColumnType::Int64,
            ColumnType::Float32,
            ColumnType::Float64,
            ColumnType::Utf8,
        ] {
            assert_eq!(ColumnType::from_arrow_type(&ty.to_arrow_type()).unwrap(), ty);
        }
    }

    #[test]
    fn test_unsupported_arrow_type() {
        let err = ColumnType::from_arrow_type(&ArrowDataType::Boolean).unwrap_err();
        assert!(matches!(err, MosaicError::UnsupportedType(_)));
    }
}
