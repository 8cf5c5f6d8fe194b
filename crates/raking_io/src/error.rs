//! Error types for dataset loading and weight export.

use thiserror::Error;

/// Errors that can occur while reading datasets or writing weights.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow reader or writer error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid missing-value pattern
    #[error("Invalid missing-value pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A JSON record that is not a flat object of scalars
    #[error("Invalid record {record}: {reason}")]
    InvalidRecord { record: usize, reason: String },

    /// Arrow array could not be read as a dataset value
    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    /// Unsupported file format
    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

impl IoError {
    pub(crate) fn invalid_record(record: usize, reason: impl Into<String>) -> Self {
        IoError::InvalidRecord {
            record,
            reason: reason.into(),
        }
    }
}

/// Result type alias for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;
