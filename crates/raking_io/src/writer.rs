//! Weight export.

use crate::Result;
use arrow_array::{ArrayRef, Float64Array, RecordBatch, UInt64Array};
use arrow_csv::WriterBuilder;
use arrow_schema::{DataType, Field, Schema};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Writes weights as a `row,weight` CSV file, rows numbered from 0.
pub fn write_weights(path: &Path, weights: &[f64]) -> Result<()> {
    let file = File::create(path)?;
    write_weights_to(file, weights)?;
    debug!(path = %path.display(), rows = weights.len(), "Wrote weights");
    Ok(())
}

/// Writes weights as `row,weight` CSV to any writer.
pub fn write_weights_to<W: Write>(writer: W, weights: &[f64]) -> Result<()> {
    let batch = weights_batch(weights)?;
    let mut writer = WriterBuilder::new().with_header(true).build(writer);
    writer.write(&batch)?;
    Ok(())
}

fn weights_batch(weights: &[f64]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("row", DataType::UInt64, false),
        Field::new("weight", DataType::Float64, false),
    ]));
    let rows: ArrayRef = Arc::new(UInt64Array::from_iter_values(0..weights.len() as u64));
    let values: ArrayRef = Arc::new(Float64Array::from(weights.to_vec()));
    Ok(RecordBatch::try_new(schema, vec![rows, values])?)
}
