use crate::core::Dataset;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// File name suggested for exports.
pub const DEFAULT_EXPORT_FILE: &str = "filtered_bnpl_data.csv";

/// Writes the filtered table to `output`, or to stdout when no path is given.
pub fn run(dataset: &Dataset, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create export file: {}", path.display()))?;
            dataset
                .write_csv(BufWriter::new(file))
                .with_context(|| format!("Failed to write export file: {}", path.display()))?;
            info!(rows = dataset.len(), "Exported filtered data to {}", path.display());
        }
        None => {
            dataset
                .write_csv(std::io::stdout().lock())
                .context("Failed to write filtered data to stdout")?;
        }
    }
    Ok(())
}
