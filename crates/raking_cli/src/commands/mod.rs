pub mod check;
pub mod fit;

use anyhow::{Context, Result};
use raking_core::RawTargetSpec;
use raking_engine::DataSet;
use std::path::Path;

use crate::output;

/// Loads the dataset and raw targets shared by every command.
///
/// Progress messages are skipped for JSON output so stdout stays parseable.
fn load_inputs(
    data_path: &str,
    targets_path: &str,
    format: &str,
) -> Result<(DataSet, RawTargetSpec)> {
    let dataset = raking_io::load_dataset(Path::new(data_path))
        .with_context(|| format!("Failed to load dataset: {}", data_path))?;

    if format != "json" {
        output::print_info(&format!(
            "Dataset loaded: {} rows, {} columns",
            dataset.len(),
            dataset.columns().len()
        ));
    }

    let targets = raking_parser::parse_targets_file(Path::new(targets_path))
        .with_context(|| format!("Failed to parse targets file: {}", targets_path))?;

    Ok((dataset, targets))
}
