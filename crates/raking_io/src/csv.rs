//! CSV dataset loading.
//!
//! Column types are inferred by the Arrow CSV reader. Empty cells and the
//! markers `NA`, `NaN` and `null` are read as missing. Columns inferred as
//! dates or timestamps are kept as text; raking only needs their category
//! labels.

use crate::converter::{batch_to_rows, is_supported_type};
use crate::Result;
use arrow_csv::reader::Format;
use arrow_csv::ReaderBuilder;
use arrow_schema::{DataType, Field, Schema};
use raking_engine::DataSet;
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Cells matching this pattern are missing values.
pub const NULL_PATTERN: &str = "^(|NA|NaN|null)$";

const BATCH_SIZE: usize = 8192;

/// Loads a dataset from a CSV file with a header row.
pub fn load_csv(path: &Path) -> Result<DataSet> {
    let file = File::open(path)?;
    let dataset = read_csv(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Loaded CSV dataset"
    );
    Ok(dataset)
}

/// Reads a dataset from any seekable CSV source with a header row.
pub fn read_csv<R: Read + Seek>(mut reader: R) -> Result<DataSet> {
    let format = Format::default()
        .with_header(true)
        .with_null_regex(null_regex()?);

    let (inferred, _) = format.infer_schema(&mut reader, None)?;
    reader.seek(SeekFrom::Start(0))?;

    if inferred.fields().is_empty() {
        return Ok(DataSet::empty());
    }

    let schema = Arc::new(text_for_unsupported(&inferred));
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    let csv_reader = ReaderBuilder::new(schema)
        .with_header(true)
        .with_null_regex(null_regex()?)
        .with_batch_size(BATCH_SIZE)
        .build(reader)?;

    let mut rows = Vec::new();
    for batch in csv_reader {
        rows.extend(batch_to_rows(&batch?)?);
    }

    Ok(DataSet::with_columns(columns, rows))
}

fn null_regex() -> Result<Regex> {
    Ok(Regex::new(NULL_PATTERN)?)
}

fn text_for_unsupported(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| {
            if is_supported_type(field.data_type()) {
                field.as_ref().clone()
            } else {
                Field::new(field.name(), DataType::Utf8, true)
            }
        })
        .collect();
    Schema::new(fields)
}
