//! Dataset representation for raking.
//!
//! This module provides the row-oriented types the validator, auditor and
//! engine read from. Only target columns are interpreted; every other column
//! is carried along untouched.

use std::collections::{BTreeSet, HashMap, HashSet};

/// A value in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl DataValue {
    /// Returns true if this value counts as missing (null or NaN).
    pub fn is_missing(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns the category key this value falls into, or `None` if missing.
    ///
    /// Integral floats render like integers, so `Float(2.0)` and `Int(2)`
    /// share the key `"2"`.
    pub fn category_key(&self) -> Option<String> {
        match self {
            DataValue::Null => None,
            DataValue::Float(f) if f.is_nan() => None,
            DataValue::String(s) => Some(s.clone()),
            DataValue::Int(i) => Some(i.to_string()),
            DataValue::Float(f) => Some(f.to_string()),
            DataValue::Bool(b) => Some(b.to_string()),
        }
    }

    /// Attempts to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

/// A single row of data.
pub type DataRow = HashMap<String, DataValue>;

/// A dataset containing multiple rows.
///
/// The column list is the union of all row keys unless the caller supplies it
/// (loaders do, to keep header order and to know about columns that are
/// empty in every row).
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

impl DataSet {
    /// Creates a new empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a dataset from rows; columns are the sorted union of row keys.
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        let columns: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
        let columns = columns.into_iter().cloned().collect();
        Self { columns, rows }
    }

    /// Creates a dataset with an explicit column list.
    ///
    /// Row keys missing from `columns` are appended to it.
    pub fn with_columns(columns: Vec<String>, rows: Vec<DataRow>) -> Self {
        let mut columns = columns;
        let mut known: HashSet<String> = columns.iter().cloned().collect();
        let mut extra: BTreeSet<&String> = BTreeSet::new();
        for key in rows.iter().flat_map(|row| row.keys()) {
            if !known.contains(key) {
                extra.insert(key);
            }
        }
        for key in extra {
            known.insert(key.clone());
            columns.push(key.clone());
        }
        Self { columns, rows }
    }

    /// Builds a single-column dataset, one row per value.
    pub fn from_column<I, V>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DataValue>,
    {
        let rows = values
            .into_iter()
            .map(|value| {
                let mut row = DataRow::new();
                row.insert(name.to_string(), value.into());
                row
            })
            .collect();
        Self::with_columns(vec![name.to_string()], rows)
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if `column` is part of the dataset.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter()
    }

    /// Returns the value of `column` in row `index`; absent cells are `None`.
    pub fn value(&self, index: usize, column: &str) -> Option<&DataValue> {
        self.rows.get(index).and_then(|row| row.get(column))
    }

    /// Category key of every row in `column`, `None` where missing.
    pub fn category_keys(&self, column: &str) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.get(column).and_then(DataValue::category_key))
            .collect()
    }

    /// Distinct non-missing categories of `column`, in order of first appearance.
    pub fn distinct_categories(&self, column: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for key in self.category_keys(column).into_iter().flatten() {
            if seen.insert(key.clone()) {
                distinct.push(key);
            }
        }
        distinct
    }

    /// Number of rows where `column` is missing.
    pub fn missing_count(&self, column: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(column).is_none_or(DataValue::is_missing))
            .count()
    }

    /// Maps each row to the position of its category in `categories`.
    ///
    /// Missing values, and values not listed, map to `None`.
    pub fn category_codes(&self, column: &str, categories: &[&str]) -> Vec<Option<usize>> {
        let index: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i))
            .collect();

        self.category_keys(column)
            .into_iter()
            .map(|key| key.and_then(|k| index.get(k.as_str()).copied()))
            .collect()
    }
}
