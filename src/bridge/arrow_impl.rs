// In: src/bridge/arrow_impl.rs

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, PrimitiveArray, StringArray};
use arrow::buffer::{BooleanBuffer, NullBuffer, ScalarBuffer};
use arrow::datatypes::{Float32Type, Float64Type, Int32Type, Int64Type};

use crate::error::MosaicError;
use crate::types::ColumnType;
use crate::vector::{ColumnVector, PrimitiveVector, StringVector};

/// DATA MARSHALLING
/// Copies an Arrow array into a `ColumnVector`, the batch input of the writers.
///
/// Null slots keep whatever value Arrow stored for them; writers never look at
/// the value of a null row.
pub fn arrow_to_vector(array: &dyn Array) -> Result<ColumnVector, MosaicError> {
    let column_type = ColumnType::from_arrow_type(array.data_type())?;
    let is_null: Vec<bool> = (0..array.len()).map(|i| array.is_null(i)).collect();
    let no_nulls = array.null_count() == 0;

    macro_rules! extract_primitive {
        ($T:ty) => {{
            let typed = array.as_primitive_opt::<$T>().ok_or_else(|| {
                MosaicError::UnsupportedType(format!(
                    "Array of type {} is not a primitive array",
                    array.data_type()
                ))
            })?;
            ColumnVector::from(PrimitiveVector {
                values: typed.values().to_vec(),
                is_null,
                no_nulls,
            })
        }};
    }

    Ok(match column_type {
        ColumnType::Int32 => extract_primitive!(Int32Type),
        ColumnType::Int64 => extract_primitive!(Int64Type),
        ColumnType::Float32 => extract_primitive!(Float32Type),
        ColumnType::Float64 => extract_primitive!(Float64Type),
        ColumnType::Utf8 => {
            let typed = array.as_string_opt::<i32>().ok_or_else(|| {
                MosaicError::UnsupportedType(format!(
                    "Array of type {} is not a string array",
                    array.data_type()
                ))
            })?;
            let values = (0..typed.len())
                .map(|i| {
                    if is_null[i] {
                        String::new()
                    } else {
                        typed.value(i).to_string()
                    }
                })
                .collect();
            ColumnVector::from(StringVector {
                values,
                is_null,
                no_nulls,
            })
        }
    })
}

/// Builds an Arrow array from the first `len` rows of a decoded vector.
pub fn vector_to_arrow(vector: &ColumnVector, len: usize) -> Result<ArrayRef, MosaicError> {
    if len > vector.len() {
        return Err(MosaicError::InvalidArgument(format!(
            "Cannot export {} rows from a vector of {}",
            len,
            vector.len()
        )));
    }

    macro_rules! build_primitive {
        ($T:ty, $v:expr) => {{
            let values = ScalarBuffer::from($v.values[..len].to_vec());
            let nulls = null_buffer(&$v.is_null[..len]);
            Arc::new(PrimitiveArray::<$T>::try_new(values, nulls)?) as ArrayRef
        }};
    }

    Ok(match vector {
        ColumnVector::Int32(v) => build_primitive!(Int32Type, v),
        ColumnVector::Int64(v) => build_primitive!(Int64Type, v),
        ColumnVector::Float32(v) => build_primitive!(Float32Type, v),
        ColumnVector::Float64(v) => build_primitive!(Float64Type, v),
        ColumnVector::Utf8(v) => {
            Arc::new(StringArray::from_iter((0..len).map(|i| v.get(i)))) as ArrayRef
        }
    })
}

/// Arrow validity is the inverse of our null flags; no buffer at all when
/// every row is valid.
fn null_buffer(is_null: &[bool]) -> Option<NullBuffer> {
    if !is_null.iter().any(|&n| n) {
        return None;
    }
    let validity = BooleanBuffer::from_iter(is_null.iter().map(|&n| !n));
    Some(NullBuffer::from(validity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array};

    #[test]
    fn test_arrow_to_vector_with_nulls() {
        let array = Int32Array::from(vec![Some(10), None, Some(30)]);
        let vector = arrow_to_vector(&array).unwrap();
        let ColumnVector::Int32(v) = &vector else { panic!("wrong vector type") };
        assert_eq!(v.to_options(3), vec![Some(10), None, Some(30)]);
        assert!(!v.no_nulls);
    }

    #[test]
    fn test_sliced_array_respects_offset() {
        let array = Int32Array::from(vec![1, 2, 3, 4, 5]);
        let sliced = array.slice(2, 2);
        let vector = arrow_to_vector(&sliced).unwrap();
        let ColumnVector::Int32(v) = &vector else { panic!("wrong vector type") };
        assert_eq!(v.values, vec![3, 4]);
    }

    #[test]
    fn test_vector_to_arrow_truncates_to_len() {
        let vector: ColumnVector =
            PrimitiveVector::from_options(&[Some(1.5f64), None, Some(2.5)]).into();
        let array = vector_to_arrow(&vector, 2).unwrap();
        let typed = array.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(typed, &Float64Array::from(vec![Some(1.5), None]));
        assert!(vector_to_arrow(&vector, 4).is_err());
    }

    #[test]
    fn test_string_vector_to_arrow() {
        let vector: ColumnVector = StringVector::from_options(&[Some("a"), None]).into();
        let array = vector_to_arrow(&vector, 2).unwrap();
        let typed = array.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(typed, &StringArray::from(vec![Some("a"), None]));
    }

    #[test]
    fn test_unsupported_arrow_type() {
        let array = arrow::array::BooleanArray::from(vec![true]);
        assert!(matches!(
            arrow_to_vector(&array),
            Err(MosaicError::UnsupportedType(_))
        ));
    }
}
