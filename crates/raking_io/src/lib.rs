//! # Raking I/O
//!
//! Loads survey datasets from CSV (through the Arrow CSV reader) or JSON, and
//! exports fitted weights as CSV.
//!
//! ## Example
//!
//! ```no_run
//! use raking_io::{load_dataset, write_weights};
//! use std::path::Path;
//!
//! let dataset = load_dataset(Path::new("survey.csv")).unwrap();
//! println!("{} rows, columns {:?}", dataset.len(), dataset.columns());
//!
//! write_weights(Path::new("weights.csv"), &vec![1.0; dataset.len()]).unwrap();
//! ```

pub mod converter;
mod csv;
mod error;
mod json;
mod writer;

pub use csv::{load_csv, read_csv, NULL_PATTERN};
pub use error::{IoError, Result};
pub use json::{load_json, parse_json};
pub use writer::{write_weights, write_weights_to};

use raking_engine::DataSet;
use std::path::Path;

/// Supported dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Comma-separated values with a header row (.csv)
    Csv,
    /// JSON array of objects or JSON Lines (.json, .jsonl, .ndjson)
    Json,
}

/// Detects the dataset format from a path's extension.
pub fn detect_data_format(path: &Path) -> Result<DataFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(IoError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "csv" => Ok(DataFormat::Csv),
        "json" | "jsonl" | "ndjson" => Ok(DataFormat::Json),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

/// Loads a dataset, choosing the reader from the file extension.
pub fn load_dataset(path: &Path) -> Result<DataSet> {
    match detect_data_format(path)? {
        DataFormat::Csv => load_csv(path),
        DataFormat::Json => load_json(path),
    }
}
