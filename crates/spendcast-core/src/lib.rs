//! Spendcast Core Library
//!
//! Daily expense forecasting for a personal transaction ledger:
//! - CSV ledger import and daily aggregation
//! - Seasonal ARIMA estimation (CSS with Nelder-Mead)
//! - Point forecasts with Gaussian confidence bands
//! - Forecast summary, CSV export and chart definition
//! - TOML configuration with user overrides

pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod sarima;
pub mod summary;

/// Test utilities including synthetic ledgers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use chart::{BandPoint, ChartDefinition, ChartPoint, DashboardMetrics};
pub use config::{ForecastConfig, MAX_UI_HORIZON, MIN_UI_HORIZON};
pub use error::{Error, Result};
pub use export::{forecast_csv, parse_forecast_csv};
pub use forecast::{BoundInversionWarning, ForecastPoint, ForecastResult};
pub use import::load_and_aggregate;
pub use models::{DailyExpenseSeries, GapPolicy, SeriesPoint, TransactionRecord};
pub use pipeline::{ForecastPipeline, ForecastReport, PipelineOutput};
pub use sarima::{fit, ArimaOrder, FittedModel, SeasonalOrder};
pub use summary::{summarize, ForecastRow, ForecastSummary};
