//! Result types produced by auditing, fitting and summarizing.

use serde::Serialize;

/// Missing-value count for one target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMissing {
    /// Target column
    pub column: String,
    /// Number of rows with a missing value in this column
    pub missing: usize,
}

/// Missing values across all target columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MissingAudit {
    /// Per-column counts, in target spec order
    pub columns: Vec<ColumnMissing>,
}

impl MissingAudit {
    /// True if any target column has at least one missing value.
    pub fn has_missing(&self) -> bool {
        self.columns.iter().any(|c| c.missing > 0)
    }

    /// Names of target columns with missing values.
    pub fn columns_with_missing(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.missing > 0)
            .map(|c| c.column.clone())
            .collect()
    }

    /// Missing count for `column`, if it is a target column.
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.missing)
    }
}

/// Outcome of one fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    /// One weight per dataset row, row-aligned
    pub weights: Vec<f64>,

    /// Number of passes performed
    pub iterations: usize,

    /// Whether the tolerance was reached
    pub converged: bool,

    /// Largest gap (percentage points) between achieved and target margins after the last pass
    pub max_difference: f64,
}

impl FitResult {
    /// Arithmetic mean of the weights (0 for an empty vector).
    pub fn mean_weight(&self) -> f64 {
        if self.weights.is_empty() {
            return 0.0;
        }
        self.weights.iter().sum::<f64>() / self.weights.len() as f64
    }

    /// Smallest weight, if any.
    pub fn min_weight(&self) -> Option<f64> {
        self.weights.iter().copied().reduce(f64::min)
    }

    /// Largest weight, if any.
    pub fn max_weight(&self) -> Option<f64> {
        self.weights.iter().copied().reduce(f64::max)
    }

    /// Kish effective sample size, `(Σw)² / Σw²`.
    pub fn effective_sample_size(&self) -> f64 {
        let sum: f64 = self.weights.iter().sum();
        let sum_sq: f64 = self.weights.iter().map(|w| w * w).sum();
        if sum_sq == 0.0 {
            return 0.0;
        }
        sum * sum / sum_sq
    }

    /// Kish design effect due to weighting, `n / n_eff`.
    pub fn design_effect(&self) -> f64 {
        let n_eff = self.effective_sample_size();
        if n_eff == 0.0 {
            return 0.0;
        }
        self.weights.len() as f64 / n_eff
    }
}

/// One line of the unweighted / target / weighted comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Target column
    pub variable: String,
    /// Category within the column
    pub category: String,
    /// Share of rows in this category, in percent
    pub unweighted_percentage: f64,
    /// Desired share from the target spec, in percent
    pub target_percentage: f64,
    /// Share of total weight in this category, in percent
    pub weighted_percentage: f64,
}

impl SummaryRow {
    /// Absolute gap between weighted and target percentages.
    pub fn weighted_gap(&self) -> f64 {
        (self.weighted_percentage - self.target_percentage).abs()
    }
}

/// Comparison table over all target columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Rows in target spec order
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Rows belonging to `variable`.
    pub fn rows_for<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a SummaryRow> {
        self.rows.iter().filter(move |r| r.variable == variable)
    }

    /// Looks up a single row.
    pub fn row(&self, variable: &str, category: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.variable == variable && r.category == category)
    }

    /// Largest weighted-vs-target gap across all rows.
    pub fn max_weighted_gap(&self) -> f64 {
        self.rows
            .iter()
            .map(SummaryRow::weighted_gap)
            .fold(0.0, f64::max)
    }
}
