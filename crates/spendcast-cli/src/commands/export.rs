//! Forecast export command implementation

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{export::forecast_csv, ForecastConfig};

use super::run_pipeline;

pub fn cmd_export(file: &Path, config: ForecastConfig, output: Option<&Path>) -> Result<()> {
    let result = run_pipeline(file, config)?;
    let csv = forecast_csv(&result.summary).context("Failed to render forecast CSV")?;

    match output {
        Some(path) => {
            let mut out = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            out.write_all(csv.as_bytes())?;

            println!(
                "✅ Exported {} forecast days to {}",
                result.summary.rows().len(),
                path.display()
            );
        }
        None => {
            // Write to stdout
            print!("{}", csv);
        }
    }

    Ok(())
}
