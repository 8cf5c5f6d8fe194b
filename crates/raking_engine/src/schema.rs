//! Target spec validation.
//!
//! This module checks a raw target spec against the dataset and turns it into
//! a validated [`TargetSpec`]. Columns are checked in declared order and the
//! first failure wins.

use crate::DataSet;
use raking_core::{
    CategoryTarget, RakingError, RawTargetSpec, Result, TargetSpec, TargetVariable,
};
use serde_json::Value;
use std::collections::HashSet;

/// Largest accepted deviation of a column's percentage sum from 100.
pub const PERCENTAGE_SUM_EPSILON: f64 = 1e-9;

/// Validates target specs against a dataset.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Creates a new schema validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates `raw` against `dataset`.
    ///
    /// For each column, in order: the column must exist, its spec must be a
    /// category -> percentage mapping, every category must be observed, the
    /// percentages must sum to 100 and every observed category must be covered.
    pub fn validate(&self, dataset: &DataSet, raw: &RawTargetSpec) -> Result<TargetSpec> {
        let mut seen = HashSet::new();
        let mut variables = Vec::with_capacity(raw.len());

        for (column, spec) in raw.entries() {
            if !seen.insert(column) {
                return Err(RakingError::malformed(
                    column,
                    "column declared more than once",
                ));
            }
            variables.push(self.validate_column(dataset, column, spec)?);
        }

        Ok(TargetSpec::from_variables(variables))
    }

    /// Validates the targets of a single column.
    fn validate_column(
        &self,
        dataset: &DataSet,
        column: &str,
        spec: &Value,
    ) -> Result<TargetVariable> {
        if !dataset.has_column(column) {
            return Err(RakingError::unknown_column(column));
        }

        let mapping = spec.as_object().ok_or_else(|| {
            RakingError::malformed(
                column,
                format!(
                    "expected a mapping of category to percentage, got {}",
                    json_kind(spec)
                ),
            )
        })?;

        let observed = dataset.distinct_categories(column);
        let mut categories = Vec::with_capacity(mapping.len());
        let mut total = 0.0;
        let mut covered = HashSet::with_capacity(mapping.len());

        for (category, value) in mapping {
            let percentage = parse_percentage(column, category, value)?;
            let key = resolve_category(&observed, category)
                .ok_or_else(|| RakingError::unknown_category(column, category))?;
            if !covered.insert(key) {
                return Err(RakingError::malformed(
                    column,
                    format!("category '{category}' declared more than once"),
                ));
            }
            total += percentage;
            categories.push(CategoryTarget {
                category: key.to_string(),
                percentage,
            });
        }

        if (total - 100.0).abs() > PERCENTAGE_SUM_EPSILON {
            return Err(RakingError::PercentageSumMismatch {
                column: column.to_string(),
                sum: total,
            });
        }

        let uncovered: Vec<String> = observed
            .iter()
            .filter(|o| !covered.contains(o.as_str()))
            .cloned()
            .collect();
        if !uncovered.is_empty() {
            return Err(RakingError::UncoveredCategory {
                column: column.to_string(),
                categories: uncovered,
            });
        }

        Ok(TargetVariable {
            column: column.to_string(),
            categories,
        })
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches a declared category against the observed keys.
///
/// Keys are compared as written first. Failing that, a numeric key is
/// rendered the way float cells are (`"1.0"` becomes `"1"`), since JSON and
/// TOML keys are always strings.
fn resolve_category<'a>(observed: &'a [String], category: &str) -> Option<&'a str> {
    if let Some(found) = observed.iter().find(|o| *o == category) {
        return Some(found.as_str());
    }
    let canonical = category
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())?
        .to_string();
    observed
        .iter()
        .find(|o| **o == canonical)
        .map(String::as_str)
}

/// Reads a percentage, rejecting non-numbers, negatives and non-finite values.
fn parse_percentage(column: &str, category: &str, value: &Value) -> Result<f64> {
    let percentage = value.as_f64().ok_or_else(|| {
        RakingError::malformed(
            column,
            format!(
                "percentage for category '{category}' must be a number, got {}",
                json_kind(value)
            ),
        )
    })?;

    if !percentage.is_finite() || percentage < 0.0 {
        return Err(RakingError::malformed(
            column,
            format!(
                "percentage for category '{category}' must be non-negative, got {percentage}"
            ),
        ));
    }

    Ok(percentage)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn gender_dataset() -> DataSet {
        let values = std::iter::repeat_n("M", 6).chain(std::iter::repeat_n("F", 4));
        DataSet::from_column("Gender", values)
    }

    #[test]
    fn test_valid_spec() {
        let raw = RawTargetSpec::new().column("Gender", json!({"M": 50, "F": 50}));
        let spec = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap();

        assert_eq!(spec.len(), 1);
        let gender = spec.variable("Gender").unwrap();
        assert_eq!(gender.categories[0].category, "M");
        assert_eq!(gender.categories[1].percentage, 50.0);
    }

    #[test]
    fn test_unknown_column() {
        let raw = RawTargetSpec::new().column("Age", json!({"young": 100}));
        let err = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap_err();
        assert_eq!(err, RakingError::unknown_column("Age"));
    }

    #[test]
    fn test_malformed_spec_value() {
        let raw = RawTargetSpec::new().column("Gender", json!([50, 50]));
        let err = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap_err();
        assert!(matches!(
            err,
            RakingError::MalformedTargetSpec { ref column, .. } if column == "Gender"
        ));
    }

    #[test]
    fn test_malformed_percentage() {
        let raw = RawTargetSpec::new().column("Gender", json!({"M": "half", "F": 50}));
        let err = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap_err();
        assert!(matches!(err, RakingError::MalformedTargetSpec { .. }));

        let raw = RawTargetSpec::new().column("Gender", json!({"M": -10, "F": 110}));
        let err = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap_err();
        assert!(matches!(err, RakingError::MalformedTargetSpec { .. }));
    }

    #[test]
    fn test_duplicate_column() {
        let raw = RawTargetSpec::new()
            .column("Gender", json!({"M": 50, "F": 50}))
            .column("Gender", json!({"M": 40, "F": 60}));
        let err = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap_err();
        assert!(matches!(err, RakingError::MalformedTargetSpec { .. }));
    }

    #[test]
    fn test_unknown_category() {
        let raw = RawTargetSpec::new().column("Gender", json!({"M": 50, "X": 50}));
        let err = SchemaValidator::new()
            .validate(&gender_dataset(), &raw)
            .unwrap_err();
        assert_eq!(err, RakingError::unknown_category("Gender", "X"));
    }

    #[test]
    fn test_percentage_sum_mismatch() {
        let dataset = DataSet::from_column("c", vec!["A", "B", "A"]);
        let raw = RawTargetSpec::new().column("c", json!({"A": 40, "B": 50}));
        let err = SchemaValidator::new().validate(&dataset, &raw).unwrap_err();
        assert_eq!(
            err,
            RakingError::PercentageSumMismatch {
                column: "c".to_string(),
                sum: 90.0
            }
        );
    }

    #[test]
    fn test_float_percentages_within_epsilon() {
        let dataset = DataSet::from_column("c", vec!["A", "B", "C"]);
        let raw =
            RawTargetSpec::new().column("c", json!({"A": 33.3, "B": 33.3, "C": 33.4}));
        assert!(SchemaValidator::new().validate(&dataset, &raw).is_ok());
    }

    #[test]
    fn test_uncovered_category() {
        let dataset = DataSet::from_column("c", vec!["A", "B", "C", "A"]);
        let raw = RawTargetSpec::new().column("c", json!({"A": 50, "B": 50}));
        let err = SchemaValidator::new().validate(&dataset, &raw).unwrap_err();
        assert_eq!(
            err,
            RakingError::UncoveredCategory {
                column: "c".to_string(),
                categories: vec!["C".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_values_are_not_uncovered() {
        let dataset = DataSet::from_column("c", vec![Some("A"), None, Some("B")]);
        let raw = RawTargetSpec::new().column("c", json!({"A": 50, "B": 50}));
        assert!(SchemaValidator::new().validate(&dataset, &raw).is_ok());
    }

    #[test]
    fn test_numeric_categories_match_by_key() {
        let dataset =
            DataSet::from_column("wave", vec![DataValue::Int(1), DataValue::Float(2.0)]);
        let raw = RawTargetSpec::new().column("wave", json!({"1": 50, "2": 50}));
        assert!(SchemaValidator::new().validate(&dataset, &raw).is_ok());
    }

    #[test]
    fn test_float_style_keys_match_float_cells() {
        let dataset = DataSet::from_column(
            "score",
            vec![DataValue::Float(1.0), DataValue::Float(2.0), DataValue::Float(1.0)],
        );
        let raw = RawTargetSpec::new().column("score", json!({"1.0": 50, "2.0": 50}));

        let spec = SchemaValidator::new().validate(&dataset, &raw).unwrap();
        let score = spec.variable("score").unwrap();
        assert_eq!(score.categories[0].category, "1");
        assert_eq!(score.categories[1].category, "2");
    }

    #[test]
    fn test_text_keys_are_matched_as_written() {
        let dataset = DataSet::from_column("code", vec!["1.0", "2.0"]);
        let raw = RawTargetSpec::new().column("code", json!({"1.0": 50, "2.0": 50}));

        let spec = SchemaValidator::new().validate(&dataset, &raw).unwrap();
        assert_eq!(spec.variable("code").unwrap().categories[0].category, "1.0");
    }

    #[test]
    fn test_keys_naming_the_same_category_twice() {
        let dataset =
            DataSet::from_column("score", vec![DataValue::Float(1.0), DataValue::Int(2)]);
        let raw =
            RawTargetSpec::new().column("score", json!({"1": 50, "1.0": 25, "2": 25}));

        let err = SchemaValidator::new().validate(&dataset, &raw).unwrap_err();
        assert!(matches!(
            err,
            RakingError::MalformedTargetSpec { ref column, .. } if column == "score"
        ));
    }

    #[test]
    fn test_first_failing_column_wins() {
        let dataset = DataSet::from_column("c", vec!["A", "B"]);
        let raw = RawTargetSpec::new()
            .column("missing", json!({"A": 100}))
            .column("c", json!({"A": 10}));
        let err = SchemaValidator::new().validate(&dataset, &raw).unwrap_err();
        assert!(matches!(err, RakingError::UnknownColumn { .. }));
    }

    #[test]
    fn test_empty_spec_is_valid() {
        let spec = SchemaValidator::new()
            .validate(&gender_dataset(), &RawTargetSpec::new())
            .unwrap();
        assert!(spec.is_empty());
    }
}
