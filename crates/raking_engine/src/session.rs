//! Weighting session.
//!
//! This module provides [`WeightingSession`], which validates targets and
//! audits missing values once, up front, and then fits and summarizes on
//! demand.

use crate::{DataSet, MissingValueAuditor, RakingEngine, SchemaValidator, SummaryReporter};
use raking_core::{
    DiagnosticSink, FitResult, IterationConfig, MissingAudit, RawTargetSpec, Result, Summary,
    TargetSpec, TracingSink,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A dataset paired with validated raking targets.
///
/// Construction fails if the targets do not fit the data; a session that
/// exists is always ready to fit. Fitting never mutates the session, so the
/// same session can be fitted with several configurations.
///
/// # Example
///
/// ```rust
/// use raking_engine::{DataSet, WeightingSession};
/// use raking_core::{IterationConfig, RawTargetSpec};
///
/// let dataset = DataSet::from_column("Gender", ["M", "M", "M", "F"]);
/// let targets = RawTargetSpec::new().categories("Gender", [("M", 50.0), ("F", 50.0)]);
///
/// let session = WeightingSession::new(dataset, &targets).unwrap();
/// let fit = session.fit(&IterationConfig::default()).unwrap();
/// let summary = session.summary(Some(&fit)).unwrap();
///
/// for row in &summary.rows {
///     println!("{} {}: {:.1}% -> {:.1}%", row.variable, row.category,
///         row.unweighted_percentage, row.weighted_percentage);
/// }
/// ```
pub struct WeightingSession {
    dataset: DataSet,
    targets: TargetSpec,
    audit: MissingAudit,
    sink: Arc<dyn DiagnosticSink>,
}

impl WeightingSession {
    /// Creates a session that reports diagnostics through `tracing`.
    pub fn new(dataset: DataSet, targets: &RawTargetSpec) -> Result<Self> {
        Self::with_sink(dataset, targets, Arc::new(TracingSink))
    }

    /// Creates a session that reports diagnostics to `sink`.
    pub fn with_sink(
        dataset: DataSet,
        targets: &RawTargetSpec,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let targets = SchemaValidator::new().validate(&dataset, targets)?;
        let audit = MissingValueAuditor::new().audit(&dataset, targets.columns(), sink.as_ref());

        debug!(
            rows = dataset.len(),
            target_columns = targets.len(),
            has_missing = audit.has_missing(),
            "Weighting session created"
        );

        Ok(Self {
            dataset,
            targets,
            audit,
            sink,
        })
    }

    /// The dataset being weighted.
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// The validated targets.
    pub fn targets(&self) -> &TargetSpec {
        &self.targets
    }

    /// The missing-value audit taken at construction.
    pub fn audit(&self) -> &MissingAudit {
        &self.audit
    }

    /// True if any target column has missing values.
    pub fn has_missing(&self) -> bool {
        self.audit.has_missing()
    }

    /// Runs the raking engine with `config`.
    pub fn fit(&self, config: &IterationConfig) -> Result<FitResult> {
        let engine = RakingEngine::new(config.clone())?;
        engine.fit(&self.dataset, &self.targets, &self.audit, self.sink.as_ref())
    }

    /// Compares unweighted, target and weighted shares.
    ///
    /// Fails with `WeightsNotComputed` when `fit` is `None`.
    pub fn summary(&self, fit: Option<&FitResult>) -> Result<Summary> {
        SummaryReporter::new().summarize(
            &self.dataset,
            &self.targets,
            fit.map(|f| f.weights.as_slice()),
        )
    }
}

impl fmt::Debug for WeightingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightingSession")
            .field("rows", &self.dataset.len())
            .field("targets", &self.targets)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}
