//! Error types for raking operations.
//!
//! Construction-time failures (target spec validation), fit-time failures
//! (missing values, degenerate margins, bad configuration) and summary-time
//! failures all live in a single enum so callers can match on the exact
//! condition.

use thiserror::Error;

/// Result type for raking operations.
pub type Result<T> = std::result::Result<T, RakingError>;

/// Main error type for raking operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RakingError {
    /// Target column not present in the dataset
    #[error("Target column '{column}' not found in data")]
    UnknownColumn {
        /// Column named in the target spec
        column: String,
    },

    /// Column spec is not a category -> percentage mapping
    #[error("Malformed target spec for column '{column}': {reason}")]
    MalformedTargetSpec {
        /// Column whose spec is malformed
        column: String,
        /// What is wrong with it
        reason: String,
    },

    /// Target category never observed in the column
    #[error("Category '{category}' not found in column '{column}'")]
    UnknownCategory {
        /// Target column
        column: String,
        /// Category declared in the target spec
        category: String,
    },

    /// Target percentages for a column do not add up to 100
    #[error("Target percentages for '{column}' sum to {sum}, expected 100")]
    PercentageSumMismatch {
        /// Target column
        column: String,
        /// Computed sum of the declared percentages
        sum: f64,
    },

    /// Observed categories with no entry in the target spec
    #[error(
        "The following values exist in data for '{column}' but are not in the target spec: [{}]",
        .categories.join(", ")
    )]
    UncoveredCategory {
        /// Target column
        column: String,
        /// Offending categories, in order of first appearance
        categories: Vec<String>,
    },

    /// Fit refused because target columns contain missing values
    #[error(
        "Missing values found in target columns [{}]; set allow_missings to fit anyway",
        .columns.join(", ")
    )]
    MissingValuesNotAllowed {
        /// Target columns with at least one missing value
        columns: Vec<String>,
    },

    /// A margin cannot be adjusted because its weight mass is zero
    #[error(
        "Degenerate margin in column '{column}'{}: zero weight mass",
        category_suffix(.category)
    )]
    DegenerateMargin {
        /// Target column being adjusted
        column: String,
        /// Category with zero achieved weight, if the failure is category-specific
        category: Option<String>,
    },

    /// Iteration configuration is invalid
    #[error("Invalid iteration config: {0}")]
    InvalidConfig(String),

    /// Summary requested before any weights were computed
    #[error("No weights have been calculated yet")]
    WeightsNotComputed,

    /// Weight vector not aligned with the dataset
    #[error("Weight vector has {actual} entries but the dataset has {expected} rows")]
    WeightLengthMismatch {
        /// Dataset row count
        expected: usize,
        /// Weight vector length
        actual: usize,
    },
}

impl RakingError {
    /// Creates a new unknown column error.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// Creates a new malformed target spec error.
    pub fn malformed(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTargetSpec {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new unknown category error.
    pub fn unknown_category(column: impl Into<String>, category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            column: column.into(),
            category: category.into(),
        }
    }

    /// Creates a new degenerate margin error.
    pub fn degenerate(column: impl Into<String>, category: Option<String>) -> Self {
        Self::DegenerateMargin {
            column: column.into(),
            category,
        }
    }

    /// Creates a new invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

fn category_suffix(category: &Option<String>) -> String {
    category
        .as_ref()
        .map(|c| format!(" (category '{c}')"))
        .unwrap_or_default()
}
