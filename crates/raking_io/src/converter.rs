//! Conversion from Arrow arrays to dataset values.

use crate::{IoError, Result};
use arrow_array::array::*;
use arrow_array::RecordBatch;
use arrow_schema::DataType;
use raking_engine::{DataRow, DataValue};

/// Returns true for the Arrow types [`array_value_to_data_value`] can read.
pub fn is_supported_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Null
            | DataType::Boolean
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Utf8
            | DataType::LargeUtf8
    )
}

/// Converts one cell of an Arrow array to a [`DataValue`].
pub fn array_value_to_data_value(array: &ArrayRef, row_idx: usize) -> Result<DataValue> {
    if array.is_null(row_idx) {
        return Ok(DataValue::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(DataValue::Null),
        DataType::Boolean => Ok(DataValue::Bool(downcast::<BooleanArray>(array)?.value(row_idx))),
        DataType::Int32 => Ok(DataValue::Int(
            downcast::<Int32Array>(array)?.value(row_idx) as i64,
        )),
        DataType::Int64 => Ok(DataValue::Int(downcast::<Int64Array>(array)?.value(row_idx))),
        DataType::Float32 => Ok(DataValue::Float(
            downcast::<Float32Array>(array)?.value(row_idx) as f64,
        )),
        DataType::Float64 => Ok(DataValue::Float(
            downcast::<Float64Array>(array)?.value(row_idx),
        )),
        DataType::Utf8 => Ok(DataValue::String(
            downcast::<StringArray>(array)?.value(row_idx).to_string(),
        )),
        DataType::LargeUtf8 => Ok(DataValue::String(
            downcast::<LargeStringArray>(array)?.value(row_idx).to_string(),
        )),
        other => Err(IoError::TypeConversion(format!(
            "Unsupported Arrow type: {other:?}"
        ))),
    }
}

/// Converts every row of a record batch into a [`DataRow`].
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<DataRow>> {
    let schema = batch.schema();
    let mut rows = Vec::with_capacity(batch.num_rows());

    for row_idx in 0..batch.num_rows() {
        let mut row = DataRow::with_capacity(batch.num_columns());
        for (field, column) in schema.fields().iter().zip(batch.columns()) {
            row.insert(
                field.name().clone(),
                array_value_to_data_value(column, row_idx)?,
            );
        }
        rows.push(row);
    }

    Ok(rows)
}

fn downcast<T: Array + 'static>(array: &ArrayRef) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        IoError::TypeConversion(format!(
            "Failed to downcast {:?} to {}",
            array.data_type(),
            std::any::type_name::<T>()
        ))
    })
}
