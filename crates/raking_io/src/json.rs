//! JSON dataset loading.
//!
//! Accepts either a single array of objects or JSON Lines (one object per
//! line). Records must be flat: every value is null, a boolean, a number or
//! a string.

use crate::{IoError, Result};
use raking_engine::{DataRow, DataSet, DataValue};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Loads a dataset from a JSON or JSON Lines file.
pub fn load_json(path: &Path) -> Result<DataSet> {
    let content = std::fs::read_to_string(path)?;
    let dataset = parse_json(&content)?;
    debug!(
        path = %path.display(),
        rows = dataset.len(),
        "Loaded JSON dataset"
    );
    Ok(dataset)
}

/// Parses a dataset from JSON text, detecting array vs. JSON Lines input.
///
/// Columns keep the order in which keys first appear.
pub fn parse_json(content: &str) -> Result<DataSet> {
    let records: Vec<Value> = if content.trim_start().starts_with('[') {
        serde_json::from_str(content)?
    } else {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?
    };

    let mut columns = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(IoError::invalid_record(index, "expected a JSON object"));
        };

        let mut row = DataRow::with_capacity(fields.len());
        for (key, value) in fields {
            let value = json_to_data_value(value)
                .ok_or_else(|| IoError::invalid_record(index, format!("nested value in '{key}'")))?;
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
            row.insert(key, value);
        }
        rows.push(row);
    }

    Ok(DataSet::with_columns(columns, rows))
}

fn json_to_data_value(value: Value) -> Option<DataValue> {
    match value {
        Value::Null => Some(DataValue::Null),
        Value::Bool(b) => Some(DataValue::Bool(b)),
        Value::Number(n) => n
            .as_i64()
            .map(DataValue::Int)
            .or_else(|| n.as_f64().map(DataValue::Float)),
        Value::String(s) => Some(DataValue::String(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}
