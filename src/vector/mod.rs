//! In-memory column vectors: the decode target of every reader and the batch
//! input of every writer.
//!
//! A vector keeps a value slot and a null marker per row. Value slots of null
//! rows are unspecified and must not be interpreted.

use crate::error::MosaicError;
use crate::types::ColumnType;

//==================================================================================
// 1. Typed Vectors
//==================================================================================

/// A vector of fixed-width values.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveVector<T> {
    pub values: Vec<T>,
    pub is_null: Vec<bool>,
    /// `true` until the first null is stored into the vector.
    pub no_nulls: bool,
}

impl<T: Copy + Default> PrimitiveVector<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: vec![T::default(); capacity],
            is_null: vec![false; capacity],
            no_nulls: true,
        }
    }

    /// Builds a vector from optional values, mostly useful in tests and at the
    /// Arrow boundary.
    pub fn from_options(data: &[Option<T>]) -> Self {
        let mut vector = Self::with_capacity(data.len());
        for (i, item) in data.iter().enumerate() {
            match item {
                Some(v) => vector.values[i] = *v,
                None => {
                    vector.is_null[i] = true;
                    vector.no_nulls = false;
                }
            }
        }
        vector
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if *self.is_null.get(index)? {
            None
        } else {
            self.values.get(index).copied()
        }
    }

    /// Returns rows `[0, len)` as optional values.
    pub fn to_options(&self, len: usize) -> Vec<Option<T>> {
        (0..len.min(self.len())).map(|i| self.get(i)).collect()
    }

    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = T::default());
        self.is_null.iter_mut().for_each(|n| *n = false);
        self.no_nulls = true;
    }
}

/// A vector of UTF-8 strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringVector {
    pub values: Vec<String>,
    pub is_null: Vec<bool>,
    pub no_nulls: bool,
}

impl StringVector {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: vec![String::new(); capacity],
            is_null: vec![false; capacity],
            no_nulls: true,
        }
    }

    pub fn from_options<S: AsRef<str>>(data: &[Option<S>]) -> Self {
        let mut vector = Self::with_capacity(data.len());
        for (i, item) in data.iter().enumerate() {
            match item {
                Some(s) => vector.values[i] = s.as_ref().to_string(),
                None => {
                    vector.is_null[i] = true;
                    vector.no_nulls = false;
                }
            }
        }
        vector
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        if *self.is_null.get(index)? {
            None
        } else {
            self.values.get(index).map(String::as_str)
        }
    }

    pub fn to_options(&self, len: usize) -> Vec<Option<String>> {
        (0..len.min(self.len()))
            .map(|i| self.get(i).map(str::to_string))
            .collect()
    }

    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(String::clear);
        self.is_null.iter_mut().for_each(|n| *n = false);
        self.no_nulls = true;
    }
}

//==================================================================================
// 2. The Closed Vector Enum
//==================================================================================

/// A column vector of any supported logical type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnVector {
    Int32(PrimitiveVector<i32>),
    Int64(PrimitiveVector<i64>),
    Float32(PrimitiveVector<f32>),
    Float64(PrimitiveVector<f64>),
    Utf8(StringVector),
}

impl ColumnVector {
    /// Creates an empty (all non-null) vector with `capacity` addressable rows.
    pub fn new(column_type: ColumnType, capacity: usize) -> Self {
        match column_type {
            ColumnType::Int32 => Self::Int32(PrimitiveVector::with_capacity(capacity)),
            ColumnType::Int64 => Self::Int64(PrimitiveVector::with_capacity(capacity)),
            ColumnType::Float32 => Self::Float32(PrimitiveVector::with_capacity(capacity)),
            ColumnType::Float64 => Self::Float64(PrimitiveVector::with_capacity(capacity)),
            ColumnType::Utf8 => Self::Utf8(StringVector::with_capacity(capacity)),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int32(_) => ColumnType::Int32,
            Self::Int64(_) => ColumnType::Int64,
            Self::Float32(_) => ColumnType::Float32,
            Self::Float64(_) => ColumnType::Float64,
            Self::Utf8(_) => ColumnType::Utf8,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::Utf8(_) => "Utf8",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, index: usize) -> bool {
        let nulls = match self {
            Self::Int32(v) => &v.is_null,
            Self::Int64(v) => &v.is_null,
            Self::Float32(v) => &v.is_null,
            Self::Float64(v) => &v.is_null,
            Self::Utf8(v) => &v.is_null,
        };
        nulls.get(index).copied().unwrap_or(false)
    }

    pub fn no_nulls(&self) -> bool {
        match self {
            Self::Int32(v) => v.no_nulls,
            Self::Int64(v) => v.no_nulls,
            Self::Float32(v) => v.no_nulls,
            Self::Float64(v) => v.no_nulls,
            Self::Utf8(v) => v.no_nulls,
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Int32(v) => v.reset(),
            Self::Int64(v) => v.reset(),
            Self::Float32(v) => v.reset(),
            Self::Float64(v) => v.reset(),
            Self::Utf8(v) => v.reset(),
        }
    }

    pub fn as_strings_mut(&mut self) -> Result<&mut StringVector, MosaicError> {
        match self {
            Self::Utf8(v) => Ok(v),
            other => Err(MosaicError::VectorTypeMismatch {
                expected: "Utf8",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_strings(&self) -> Result<&StringVector, MosaicError> {
        match self {
            Self::Utf8(v) => Ok(v),
            other => Err(MosaicError::VectorTypeMismatch {
                expected: "Utf8",
                actual: other.type_name(),
            }),
        }
    }
}

impl From<PrimitiveVector<i32>> for ColumnVector {
    fn from(v: PrimitiveVector<i32>) -> Self {
        Self::Int32(v)
    }
}

impl From<PrimitiveVector<i64>> for ColumnVector {
    fn from(v: PrimitiveVector<i64>) -> Self {
        Self::Int64(v)
    }
}

impl From<PrimitiveVector<f32>> for ColumnVector {
    fn from(v: PrimitiveVector<f32>) -> Self {
        Self::Float32(v)
    }
}

impl From<PrimitiveVector<f64>> for ColumnVector {
    fn from(v: PrimitiveVector<f64>) -> Self {
        Self::Float64(v)
    }
}

impl From<StringVector> for ColumnVector {
    fn from(v: StringVector) -> Self {
        Self::Utf8(v)
    }
}
