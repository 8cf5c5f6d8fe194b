//! Iterative proportional fitting.
//!
//! This module provides the [`RakingEngine`], which adjusts a weight vector one
//! target column at a time until every weighted margin is within tolerance of
//! its target, or the iteration limit is reached.

use crate::DataSet;
use raking_core::{
    DiagnosticEvent, DiagnosticSink, FitResult, IterationConfig, MissingAudit, RakingError,
    Result, TargetSpec, TargetVariable,
};
use tracing::debug;

/// A target column with every row mapped to a category index.
struct EncodedTarget<'a> {
    variable: &'a TargetVariable,
    /// `None` where the row is missing this column
    codes: Vec<Option<usize>>,
}

impl<'a> EncodedTarget<'a> {
    fn new(dataset: &DataSet, variable: &'a TargetVariable) -> Self {
        let categories: Vec<&str> = variable
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        Self {
            variable,
            codes: dataset.category_codes(&variable.column, &categories),
        }
    }

    /// Sum of weights per category.
    fn category_totals(&self, weights: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; self.variable.categories.len()];
        for (code, weight) in self.codes.iter().zip(weights) {
            if let Some(code) = code {
                totals[*code] += weight;
            }
        }
        totals
    }
}

/// Runs raking passes over a dataset.
///
/// # Example
///
/// ```rust
/// use raking_engine::{DataSet, MissingValueAuditor, RakingEngine, SchemaValidator};
/// use raking_core::{IterationConfig, RawTargetSpec, TracingSink};
///
/// let dataset = DataSet::from_column("Gender", ["M", "M", "M", "F"]);
/// let raw = RawTargetSpec::new().categories("Gender", [("M", 50.0), ("F", 50.0)]);
///
/// let targets = SchemaValidator::new().validate(&dataset, &raw).unwrap();
/// let audit = MissingValueAuditor::new().audit(&dataset, targets.columns(), &TracingSink);
///
/// let engine = RakingEngine::new(IterationConfig::default()).unwrap();
/// let fit = engine.fit(&dataset, &targets, &audit, &TracingSink).unwrap();
///
/// assert!(fit.converged);
/// assert!((fit.weights[3] - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct RakingEngine {
    config: IterationConfig,
}

impl RakingEngine {
    /// Creates an engine, validating the configuration.
    pub fn new(config: IterationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Computes weights for `dataset` so its margins match `targets`.
    ///
    /// Fails with `MissingValuesNotAllowed` when the audit found missing values
    /// and the configuration does not allow them, and with `DegenerateMargin`
    /// when a margin has no weight left to scale. Running out of iterations is
    /// not an error: the best-effort weights are returned with
    /// `converged == false` and a warning is emitted.
    pub fn fit(
        &self,
        dataset: &DataSet,
        targets: &TargetSpec,
        audit: &MissingAudit,
        sink: &dyn DiagnosticSink,
    ) -> Result<FitResult> {
        if audit.has_missing() && !self.config.allow_missings {
            return Err(RakingError::MissingValuesNotAllowed {
                columns: audit.columns_with_missing(),
            });
        }

        let mut weights = vec![1.0; dataset.len()];

        if targets.is_empty() {
            return Ok(FitResult {
                weights,
                iterations: 0,
                converged: true,
                max_difference: 0.0,
            });
        }

        let encoded: Vec<EncodedTarget<'_>> = targets
            .variables()
            .iter()
            .map(|variable| EncodedTarget::new(dataset, variable))
            .collect();

        let mut max_difference = f64::INFINITY;

        for iteration in 1..=self.config.max_iter {
            for target in &encoded {
                self.adjust(target, &mut weights)?;
            }

            max_difference = max_margin_difference(&encoded, &weights);
            debug!(iteration, max_difference, "Raking pass complete");

            if max_difference < self.config.tol {
                sink.emit(&DiagnosticEvent::converged(iteration));
                return Ok(FitResult {
                    weights,
                    iterations: iteration,
                    converged: true,
                    max_difference,
                });
            }
        }

        sink.emit(&DiagnosticEvent::not_converged(
            self.config.max_iter,
            max_difference,
        ));

        Ok(FitResult {
            weights,
            iterations: self.config.max_iter,
            converged: false,
            max_difference,
        })
    }

    /// One sub-pass: rescale weights so `target`'s margins match, trim,
    /// renormalize, then clamp back into the bounds.
    fn adjust(&self, target: &EncodedTarget<'_>, weights: &mut [f64]) -> Result<()> {
        let column = &target.variable.column;

        let active_total: f64 = target
            .codes
            .iter()
            .zip(weights.iter())
            .filter(|(code, _)| code.is_some())
            .map(|(_, weight)| weight)
            .sum();
        if active_total <= 0.0 || !active_total.is_finite() {
            return Err(RakingError::degenerate(column, None));
        }

        let totals = target.category_totals(weights);
        let mut factors = Vec::with_capacity(totals.len());
        for (category, total) in target.variable.categories.iter().zip(&totals) {
            let desired = category.percentage / 100.0;
            if desired == 0.0 {
                factors.push(0.0);
                continue;
            }
            let achieved = total / active_total;
            if achieved <= 0.0 {
                return Err(RakingError::degenerate(
                    column,
                    Some(category.category.clone()),
                ));
            }
            factors.push(desired / achieved);
        }

        // Rows missing this column keep their weight.
        for (weight, code) in weights.iter_mut().zip(&target.codes) {
            if let Some(code) = code {
                *weight *= factors[*code];
            }
        }

        if let Some(max) = self.config.max_weight {
            normalize(weights, column)?;
            for weight in weights.iter_mut() {
                if *weight > max {
                    *weight = max;
                }
            }
        }

        if let Some(min) = self.config.min_weight {
            normalize(weights, column)?;
            for weight in weights.iter_mut() {
                if *weight < min {
                    *weight = min;
                }
            }
        }

        normalize(weights, column)?;

        // Normalizing can push trimmed weights back past a bound.
        self.clamp_to_bounds(weights);
        Ok(())
    }

    fn clamp_to_bounds(&self, weights: &mut [f64]) {
        let (min, max) = (self.config.min_weight, self.config.max_weight);
        if min.is_none() && max.is_none() {
            return;
        }
        for weight in weights.iter_mut() {
            if let Some(max) = max {
                *weight = weight.min(max);
            }
            if let Some(min) = min {
                *weight = weight.max(min);
            }
        }
    }
}

/// Scales `weights` to mean 1.
fn normalize(weights: &mut [f64], column: &str) -> Result<()> {
    if weights.is_empty() {
        return Ok(());
    }
    let mean = weights.iter().sum::<f64>() / weights.len() as f64;
    if mean <= 0.0 || !mean.is_finite() {
        return Err(RakingError::degenerate(column, None));
    }
    for weight in weights.iter_mut() {
        *weight /= mean;
    }
    Ok(())
}

/// Largest absolute gap, in percentage points, between achieved and target
/// shares. Achieved shares are taken over all rows, missing ones included.
fn max_margin_difference(encoded: &[EncodedTarget<'_>], weights: &[f64]) -> f64 {
    let n = weights.len() as f64;
    let mut max_difference: f64 = 0.0;
    for target in encoded {
        let totals = target.category_totals(weights);
        for (category, total) in target.variable.categories.iter().zip(totals) {
            let achieved = total / n * 100.0;
            max_difference = max_difference.max((achieved - category.percentage).abs());
        }
    }
    max_difference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataRow, DataValue, MissingValueAuditor, SchemaValidator};
    use approx::assert_abs_diff_eq;
    use raking_core::{CollectingSink, DiagnosticKind, RawTargetSpec};
    use serde_json::json;

    fn two_column_dataset() -> DataSet {
        // Gender x Region, deliberately unbalanced
        let cells = [
            ("M", "North", 30),
            ("M", "South", 30),
            ("F", "North", 10),
            ("F", "South", 30),
        ];
        let mut rows = Vec::new();
        for (gender, region, count) in cells {
            for _ in 0..count {
                let mut row = DataRow::new();
                row.insert("Gender".to_string(), DataValue::from(gender));
                row.insert("Region".to_string(), DataValue::from(region));
                rows.push(row);
            }
        }
        DataSet::from_rows(rows)
    }

    fn prepare(dataset: &DataSet, raw: &RawTargetSpec) -> (TargetSpec, MissingAudit) {
        let targets = SchemaValidator::new().validate(dataset, raw).unwrap();
        let audit =
            MissingValueAuditor::new().audit(dataset, targets.columns(), &CollectingSink::new());
        (targets, audit)
    }

    fn weighted_share(dataset: &DataSet, weights: &[f64], column: &str, category: &str) -> f64 {
        let total: f64 = weights.iter().sum();
        let matching: f64 = dataset
            .category_keys(column)
            .iter()
            .zip(weights)
            .filter(|(key, _)| key.as_deref() == Some(category))
            .map(|(_, w)| w)
            .sum();
        matching / total * 100.0
    }

    #[test]
    fn test_single_column_one_pass() {
        let dataset = DataSet::from_column(
            "Gender",
            std::iter::repeat_n("M", 60).chain(std::iter::repeat_n("F", 40)),
        );
        let raw = RawTargetSpec::new().column("Gender", json!({"M": 50, "F": 50}));
        let (targets, audit) = prepare(&dataset, &raw);
        let sink = CollectingSink::new();

        let fit = RakingEngine::new(IterationConfig::default())
            .unwrap()
            .fit(&dataset, &targets, &audit, &sink)
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.iterations, 1);
        assert_abs_diff_eq!(fit.weights[0], 50.0 / 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.weights[99], 50.0 / 40.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.mean_weight(), 1.0, epsilon = 1e-12);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DiagnosticKind::Converged { iterations: 1 });
    }

    #[test]
    fn test_two_columns_converge() {
        let dataset = two_column_dataset();
        let raw = RawTargetSpec::new()
            .column("Gender", json!({"M": 49, "F": 51}))
            .column("Region", json!({"North": 45, "South": 55}));
        let (targets, audit) = prepare(&dataset, &raw);

        let config = IterationConfig::builder().tol(0.001).build().unwrap();
        let fit = RakingEngine::new(config)
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap();

        assert!(fit.converged);
        assert!(fit.iterations > 1);
        assert!(fit.max_difference < 0.001);
        assert_abs_diff_eq!(
            weighted_share(&dataset, &fit.weights, "Gender", "M"),
            49.0,
            epsilon = 0.001
        );
        assert_abs_diff_eq!(
            weighted_share(&dataset, &fit.weights, "Region", "North"),
            45.0,
            epsilon = 0.001
        );
    }

    #[test]
    fn test_not_converged_returns_best_effort() {
        let dataset = two_column_dataset();
        let raw = RawTargetSpec::new()
            .column("Gender", json!({"M": 30, "F": 70}))
            .column("Region", json!({"North": 80, "South": 20}));
        let (targets, audit) = prepare(&dataset, &raw);
        let sink = CollectingSink::new();

        let config = IterationConfig::builder()
            .max_iter(1)
            .tol(1e-9)
            .build()
            .unwrap();
        let fit = RakingEngine::new(config)
            .unwrap()
            .fit(&dataset, &targets, &audit, &sink)
            .unwrap();

        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
        assert_eq!(fit.weights.len(), dataset.len());

        let events = sink.events();
        assert!(events[0].is_warning());
        assert!(matches!(
            events[0].kind,
            DiagnosticKind::NotConverged { iterations: 1, .. }
        ));
    }

    #[test]
    fn test_missing_values_refused() {
        let dataset = DataSet::from_column("g", vec![Some("a"), None, Some("b")]);
        let raw = RawTargetSpec::new().column("g", json!({"a": 50, "b": 50}));
        let (targets, audit) = prepare(&dataset, &raw);

        let err = RakingEngine::new(IterationConfig::default())
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap_err();

        assert_eq!(
            err,
            RakingError::MissingValuesNotAllowed {
                columns: vec!["g".to_string()]
            }
        );
    }

    #[test]
    fn test_missing_values_allowed_keep_their_weight_ratio() {
        let dataset = DataSet::from_column("g", vec![Some("a"), Some("a"), Some("b"), None]);
        let raw = RawTargetSpec::new().column("g", json!({"a": 50, "b": 50}));
        let (targets, audit) = prepare(&dataset, &raw);

        let config = IterationConfig::builder().allow_missings(true).build().unwrap();
        let fit = RakingEngine::new(config)
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap();

        // Active rows hold 3 of 4 units of weight, so a and b settle at 37.5%
        // of all rows; that is 12.5 points off target and never converges.
        assert!(!fit.converged);
        assert_abs_diff_eq!(fit.mean_weight(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.weights[0], fit.weights[1], epsilon = 1e-12);
        assert_abs_diff_eq!(fit.weights[0] * 2.0, fit.weights[2], epsilon = 1e-12);
    }

    #[test]
    fn test_weight_bounds_respected() {
        let dataset = DataSet::from_column(
            "g",
            std::iter::repeat_n("a", 90).chain(std::iter::repeat_n("b", 10)),
        );
        let raw = RawTargetSpec::new().column("g", json!({"a": 50, "b": 50}));
        let (targets, audit) = prepare(&dataset, &raw);

        let config = IterationConfig::builder()
            .min_weight(0.7)
            .max_weight(3.0)
            .max_iter(20)
            .build()
            .unwrap();
        let fit = RakingEngine::new(config)
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap();

        assert!(!fit.converged);
        for weight in &fit.weights {
            assert!(
                *weight >= 0.7 - 1e-9 && *weight <= 3.0 + 1e-9,
                "weight {weight} out of bounds"
            );
        }
    }

    #[test]
    fn test_final_clamp_trades_unit_mean_for_bounds() {
        let dataset = DataSet::from_column(
            "g",
            std::iter::repeat_n("a", 90).chain(std::iter::repeat_n("b", 10)),
        );
        let raw = RawTargetSpec::new().column("g", json!({"a": 50, "b": 50}));
        let (targets, audit) = prepare(&dataset, &raw);

        let config = IterationConfig::builder()
            .min_weight(0.7)
            .max_weight(3.0)
            .max_iter(1)
            .build()
            .unwrap();
        let fit = RakingEngine::new(config)
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap();

        // Normalizing after the min raise gives a ~= 0.6965 and b ~= 3.731;
        // the final clamp pulls both back inside the bounds.
        assert_abs_diff_eq!(fit.weights[0], 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.weights[99], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.mean_weight(), 0.93, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_target_category() {
        let dataset = DataSet::from_column("g", vec!["a", "a", "b", "c"]);
        let raw = RawTargetSpec::new().column("g", json!({"a": 60, "b": 40, "c": 0}));
        let (targets, audit) = prepare(&dataset, &raw);

        let fit = RakingEngine::new(IterationConfig::default())
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.weights[3], 0.0);
        assert_abs_diff_eq!(weighted_share(&dataset, &fit.weights, "g", "b"), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_margin_when_category_loses_all_weight() {
        // Region "East" only appears among rows that the Gender target zeroes out.
        let mut rows = Vec::new();
        for (gender, region) in [("M", "East"), ("F", "West"), ("F", "West")] {
            let mut row = DataRow::new();
            row.insert("Gender".to_string(), DataValue::from(gender));
            row.insert("Region".to_string(), DataValue::from(region));
            rows.push(row);
        }
        let dataset = DataSet::from_rows(rows);
        let raw = RawTargetSpec::new()
            .column("Gender", json!({"M": 0, "F": 100}))
            .column("Region", json!({"East": 50, "West": 50}));
        let (targets, audit) = prepare(&dataset, &raw);

        let err = RakingEngine::new(IterationConfig::default())
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap_err();

        assert_eq!(
            err,
            RakingError::degenerate("Region", Some("East".to_string()))
        );
    }

    #[test]
    fn test_degenerate_margin_when_column_entirely_missing() {
        let pairs: [(&str, Option<&str>); 2] = [("x", None), ("y", None)];
        let mut rows = Vec::new();
        for (a, b) in pairs {
            let mut row = DataRow::new();
            row.insert("a".to_string(), DataValue::from(a));
            row.insert("b".to_string(), DataValue::from(b));
            rows.push(row);
        }
        let dataset = DataSet::from_rows(rows);
        let raw = RawTargetSpec::new()
            .column("a", json!({"x": 50, "y": 50}))
            .column("b", json!({}));
        // An empty mapping sums to 0, so build the targets directly.
        assert!(SchemaValidator::new().validate(&dataset, &raw).is_err());

        let targets = TargetSpec::from_variables(vec![TargetVariable {
            column: "b".to_string(),
            categories: vec![],
        }]);
        let audit =
            MissingValueAuditor::new().audit(&dataset, targets.columns(), &CollectingSink::new());
        let config = IterationConfig::builder().allow_missings(true).build().unwrap();

        let err = RakingEngine::new(config)
            .unwrap()
            .fit(&dataset, &targets, &audit, &CollectingSink::new())
            .unwrap_err();
        assert_eq!(err, RakingError::degenerate("b", None));
    }

    #[test]
    fn test_empty_targets_converge_immediately() {
        let dataset = DataSet::from_column("g", vec!["a", "b"]);
        let fit = RakingEngine::new(IterationConfig::default())
            .unwrap()
            .fit(&dataset, &TargetSpec::default(), &MissingAudit::default(), &CollectingSink::new())
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.iterations, 0);
        assert_eq!(fit.weights, vec![1.0, 1.0]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = IterationConfig {
            max_iter: 0,
            ..IterationConfig::default()
        };
        assert!(matches!(
            RakingEngine::new(config),
            Err(RakingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let dataset = two_column_dataset();
        let raw = RawTargetSpec::new()
            .column("Gender", json!({"M": 52, "F": 48}))
            .column("Region", json!({"North": 35, "South": 65}));
        let (targets, audit) = prepare(&dataset, &raw);
        let engine = RakingEngine::new(IterationConfig::default()).unwrap();

        let first = engine.fit(&dataset, &targets, &audit, &CollectingSink::new()).unwrap();
        let second = engine.fit(&dataset, &targets, &audit, &CollectingSink::new()).unwrap();
        assert_eq!(first, second);
    }
}
