//! Unweighted / target / weighted comparison.

use crate::DataSet;
use raking_core::{RakingError, Result, Summary, SummaryRow, TargetSpec};

/// Builds the comparison table for a fitted weight vector.
pub struct SummaryReporter;

impl SummaryReporter {
    /// Creates a new reporter.
    pub fn new() -> Self {
        Self
    }

    /// Builds one row per `(column, category)` of `targets`, in spec order.
    ///
    /// Both percentages use all rows as denominator, so a column with missing
    /// values sums to less than 100.
    pub fn summarize(
        &self,
        dataset: &DataSet,
        targets: &TargetSpec,
        weights: Option<&[f64]>,
    ) -> Result<Summary> {
        let weights = weights.ok_or(RakingError::WeightsNotComputed)?;
        if weights.len() != dataset.len() {
            return Err(RakingError::WeightLengthMismatch {
                expected: dataset.len(),
                actual: weights.len(),
            });
        }

        let row_count = dataset.len() as f64;
        let weight_total: f64 = weights.iter().sum();
        let mut rows = Vec::with_capacity(targets.cell_count());

        for variable in targets.variables() {
            let keys = dataset.category_keys(&variable.column);

            for target in &variable.categories {
                let (count, weight) = keys
                    .iter()
                    .zip(weights)
                    .filter(|(key, _)| key.as_deref() == Some(target.category.as_str()))
                    .fold((0usize, 0.0), |(count, sum), (_, w)| (count + 1, sum + w));

                rows.push(SummaryRow {
                    variable: variable.column.clone(),
                    category: target.category.clone(),
                    unweighted_percentage: percentage(count as f64, row_count),
                    target_percentage: target.percentage,
                    weighted_percentage: percentage(weight, weight_total),
                });
            }
        }

        Ok(Summary { rows })
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}
