use anyhow::{Context, Result};
use raking_core::{CollectingSink, IterationConfig, IterationConfigBuilder, Tee, TracingSink};
use raking_engine::WeightingSession;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::output;

/// Iteration settings given on the command line.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub max_iter: Option<usize>,
    pub tol: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub allow_missings: bool,
}

impl ConfigOverrides {
    /// Applies the flags on top of `base` and validates the result.
    fn apply(&self, base: IterationConfig) -> Result<IterationConfig> {
        let mut builder = IterationConfigBuilder::from_config(base);
        if let Some(max_iter) = self.max_iter {
            builder = builder.max_iter(max_iter);
        }
        if let Some(tol) = self.tol {
            builder = builder.tol(tol);
        }
        if let Some(min) = self.min_weight {
            builder = builder.min_weight(min);
        }
        if let Some(max) = self.max_weight {
            builder = builder.max_weight(max);
        }
        if self.allow_missings {
            builder = builder.allow_missings(true);
        }
        Ok(builder.build()?)
    }
}

pub fn execute(
    data_path: &str,
    targets_path: &str,
    config_path: Option<&str>,
    overrides: &ConfigOverrides,
    output_path: Option<&str>,
    format: &str,
) -> Result<()> {
    info!("Fitting weights for {} with targets {}", data_path, targets_path);

    let base = match config_path {
        Some(path) => raking_parser::parse_config_file(Path::new(path))
            .with_context(|| format!("Failed to parse config file: {}", path))?,
        None => IterationConfig::default(),
    };
    let config = overrides.apply(base).context("Invalid iteration config")?;

    let (dataset, raw_targets) = super::load_inputs(data_path, targets_path, format)?;

    let collector = Arc::new(CollectingSink::new());
    let session = WeightingSession::with_sink(
        dataset,
        &raw_targets,
        Arc::new(Tee(TracingSink, collector.clone())),
    )
    .context("Targets do not match the dataset")?;

    let fit = session.fit(&config).context("Raking failed")?;
    let summary = session.summary(Some(&fit))?;

    if let Some(path) = output_path {
        raking_io::write_weights(Path::new(path), &fit.weights)
            .with_context(|| format!("Failed to write weights: {}", path))?;
    }

    output::print_fit_report(&fit, &summary, &collector.take(), format);

    if let Some(path) = output_path {
        if format != "json" {
            output::print_success(&format!("Weights written to {}", path));
        }
    }

    Ok(())
}
