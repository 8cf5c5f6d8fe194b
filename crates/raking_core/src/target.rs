//! Target specification types.
//!
//! A target spec says, for each target column, which share (in percent) of the
//! weighted sample each category should end up with. It arrives in a loosely
//! typed form ([`RawTargetSpec`], e.g. parsed from YAML) and is checked once
//! against the data, producing the strongly typed [`TargetSpec`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unvalidated target spec: ordered `(column, spec value)` pairs.
///
/// Each spec value is expected to be a JSON object mapping category to
/// percentage, but nothing is enforced until validation.
///
/// # Example
///
/// ```rust
/// use raking_core::RawTargetSpec;
///
/// let raw = RawTargetSpec::new()
///     .categories("Gender", [("M", 49.0), ("F", 51.0)])
///     .categories("Region", [("North", 30.0), ("South", 70.0)]);
///
/// assert_eq!(raw.len(), 2);
/// assert_eq!(raw.columns().collect::<Vec<_>>(), vec!["Gender", "Region"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTargetSpec {
    entries: Vec<(String, Value)>,
}

impl RawTargetSpec {
    /// Creates an empty raw spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column with an arbitrary spec value.
    pub fn column(mut self, name: impl Into<String>, spec: Value) -> Self {
        self.entries.push((name.into(), spec));
        self
    }

    /// Adds a column from `(category, percentage)` pairs, in order.
    pub fn categories<I, K>(self, name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut map = Map::new();
        for (category, percentage) in categories {
            map.insert(category.into(), Value::from(percentage));
        }
        self.column(name, Value::Object(map))
    }

    /// Builds a raw spec from a JSON object, keeping key order.
    ///
    /// Returns `None` if `value` is not an object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                entries: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    /// Returns the number of declared columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(column, spec value)` pairs in declared order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates over declared column names.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// Desired share for one category of a target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTarget {
    /// Category key, as it appears in the data
    pub category: String,

    /// Desired percentage (0-100)
    pub percentage: f64,
}

/// Targets for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetVariable {
    /// Column name in the dataset
    pub column: String,

    /// Category targets in declared order
    pub categories: Vec<CategoryTarget>,
}

/// Validated target spec.
///
/// Every category occurs in the data, every observed category is covered, and
/// each column's percentages sum to 100. Only the schema validator builds
/// these from data; [`TargetSpec::from_variables`] exists for callers that
/// already hold validated targets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetSpec {
    variables: Vec<TargetVariable>,
}

impl TargetSpec {
    /// Wraps already-validated variables.
    pub fn from_variables(variables: Vec<TargetVariable>) -> Self {
        Self { variables }
    }

    /// Target variables in declared order.
    pub fn variables(&self) -> &[TargetVariable] {
        &self.variables
    }

    /// Target column names in declared order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.column.as_str())
    }

    /// Looks up the targets for `column`.
    pub fn variable(&self, column: &str) -> Option<&TargetVariable> {
        self.variables.iter().find(|v| v.column == column)
    }

    /// Number of target columns.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if there are no target columns.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Total number of `(column, category)` pairs.
    pub fn cell_count(&self) -> usize {
        self.variables.iter().map(|v| v.categories.len()).sum()
    }
}
