use anyhow::{Context, Result};
use raking_core::{CollectingSink, Tee, TracingSink};
use raking_engine::WeightingSession;
use std::sync::Arc;
use tracing::info;

use crate::output;

pub fn execute(data_path: &str, targets_path: &str, format: &str) -> Result<()> {
    info!("Checking targets {} against {}", targets_path, data_path);

    let (dataset, raw_targets) = super::load_inputs(data_path, targets_path, format)?;

    let collector = Arc::new(CollectingSink::new());
    let session = WeightingSession::with_sink(
        dataset,
        &raw_targets,
        Arc::new(Tee(TracingSink, collector.clone())),
    )
    .context("Targets do not match the dataset")?;

    output::print_check_report(&session, &collector.take(), format);

    Ok(())
}
