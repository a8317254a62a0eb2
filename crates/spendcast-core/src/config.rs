//! Forecast configuration
//!
//! Loaded from TOML. Resolution order:
//! 1. An explicit path (e.g. `--config`), which must exist
//! 2. `<data_local_dir>/spendcast/config/forecast.toml` if present
//! 3. The embedded default (`config/forecast.toml`)
//!
//! Keys missing from a file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::chart::DEFAULT_HISTORY_WINDOW;
use crate::error::{Error, Result};
use crate::forecast::DEFAULT_CONFIDENCE;
use crate::models::GapPolicy;
use crate::sarima::{validate_orders, ArimaOrder, SeasonalOrder};

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/forecast.toml");

/// Default number of forecast days
pub const DEFAULT_HORIZON: usize = 30;

/// Horizon bounds enforced by the CLI and the API
pub const MIN_UI_HORIZON: usize = 7;
pub const MAX_UI_HORIZON: usize = 90;

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub horizon: usize,
    pub confidence: f64,
    pub order: ArimaOrder,
    pub seasonal_order: SeasonalOrder,
    pub history_window: usize,
    pub gap_policy: GapPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            confidence: DEFAULT_CONFIDENCE,
            order: ArimaOrder::default(),
            seasonal_order: SeasonalOrder::default(),
            history_window: DEFAULT_HISTORY_WINDOW,
            gap_policy: GapPolicy::default(),
        }
    }
}

impl ForecastConfig {
    /// Load using the standard resolution order
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let content = match explicit {
            Some(path) => read_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };
        parse_config(&content)
    }

    /// Copy with a different horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Copy with a different confidence level
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Check ranges that the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(Error::EmptyForecast);
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(Error::invalid_parameter(
                "confidence",
                format!("must be between 0 and 1 (exclusive), got {}", self.confidence),
            ));
        }
        if self.history_window == 0 {
            return Err(Error::invalid_parameter(
                "history_window",
                "must be greater than 0",
            ));
        }
        validate_orders(self.order, self.seasonal_order)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("config").join("forecast.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Reading config from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    forecast: Option<RawForecast>,
    model: Option<RawModel>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForecast {
    horizon: Option<usize>,
    confidence: Option<f64>,
    history_window: Option<usize>,
    gap_policy: Option<GapPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModel {
    order: Option<[usize; 3]>,
    seasonal_order: Option<[usize; 4]>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<ForecastConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ForecastConfig::default();

    if let Some(forecast) = raw.forecast {
        if let Some(horizon) = forecast.horizon {
            config.horizon = horizon;
        }
        if let Some(confidence) = forecast.confidence {
            config.confidence = confidence;
        }
        if let Some(window) = forecast.history_window {
            config.history_window = window;
        }
        if let Some(policy) = forecast.gap_policy {
            config.gap_policy = policy;
        }
    }

    if let Some(model) = raw.model {
        if let Some([p, d, q]) = model.order {
            config.order = ArimaOrder::new(p, d, q);
        }
        if let Some([p, d, q, s]) = model.seasonal_order {
            config.seasonal_order = SeasonalOrder::new(p, d, q, s);
        }
    }

    config
        .validate()
        .map_err(|e| Error::Config(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_default_matches_default() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, ForecastConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config("[forecast]\nhorizon = 14\ngap_policy = \"as-observed\"\n").unwrap();
        assert_eq!(config.horizon, 14);
        assert_eq!(config.gap_policy, GapPolicy::AsObserved);
        assert_eq!(config.confidence, 0.95);
        assert_eq!(config.seasonal_order, SeasonalOrder::new(1, 1, 1, 7));
    }

    #[test]
    fn test_model_orders() {
        let config = parse_config("[model]\norder = [2, 0, 1]\nseasonal_order = [0, 1, 1, 30]\n").unwrap();
        assert_eq!(config.order, ArimaOrder::new(2, 0, 1));
        assert_eq!(config.seasonal_order, SeasonalOrder::new(0, 1, 1, 30));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for content in [
            "[forecast]\nconfidence = 1.5\n",
            "[forecast]\nhorizon = 0\n",
            "[forecast]\ngap_policy = \"weekly\"\n",
            "[model]\nseasonal_order = [1, 1, 1, 0]\n",
            "[forecast]\nhorizn = 10\n",
            "not toml [",
        ] {
            assert!(
                matches!(parse_config(content), Err(Error::Config(_))),
                "accepted: {}",
                content
            );
        }
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[forecast]\nhorizon = 45").unwrap();

        let config = ForecastConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.horizon, 45);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = ForecastConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builders() {
        let config = ForecastConfig::default().with_horizon(7).with_confidence(0.8);
        assert_eq!(config.horizon, 7);
        assert_eq!(config.confidence, 0.8);
        assert!(config.validate().is_ok());
    }
}
