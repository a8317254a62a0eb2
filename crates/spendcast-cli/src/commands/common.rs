//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{ForecastConfig, ForecastPipeline, PipelineOutput};

/// Load the forecast config and apply command-line overrides
pub fn resolve_config(
    config_path: Option<&Path>,
    horizon: Option<u64>,
    confidence: Option<f64>,
) -> Result<ForecastConfig> {
    let mut config = ForecastConfig::load(config_path).context("Failed to load forecast config")?;

    if let Some(horizon) = horizon {
        config = config.with_horizon(horizon as usize);
    }
    if let Some(confidence) = confidence {
        config = config.with_confidence(confidence);
    }

    config.validate().context("Invalid forecast settings")?;
    Ok(config)
}

/// Run the whole pipeline on a ledger file
pub fn run_pipeline(file: &Path, config: ForecastConfig) -> Result<PipelineOutput> {
    if !file.exists() {
        anyhow::bail!("Ledger file not found: {}", file.display());
    }

    ForecastPipeline::new(config)
        .run_file(file)
        .with_context(|| format!("Failed to forecast from {}", file.display()))
}
