//! The forecasting pipeline
//!
//! Stages run in order and each one owns its output:
//!
//! load -> prepare -> fit -> forecast -> summarize
//!
//! [`ForecastPipeline::run`] chains them and returns everything the
//! presentation layer needs. Nothing is returned when any stage fails.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::chart::{build_chart, dashboard_metrics, ChartDefinition, DashboardMetrics};
use crate::config::ForecastConfig;
use crate::error::Result;
use crate::forecast::{self, BoundInversionWarning, ForecastResult};
use crate::import;
use crate::models::DailyExpenseSeries;
use crate::sarima::{self, FittedModel};
use crate::summary::{self, ForecastSummary};

/// Output of a complete run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Series the model was trained on (after the gap policy)
    pub series: DailyExpenseSeries,
    pub model: FittedModel,
    pub result: ForecastResult,
    pub summary: ForecastSummary,
    pub chart: ChartDefinition,
    pub metrics: DashboardMetrics,
}

impl PipelineOutput {
    /// The dashboard payload: metrics, chart, table and warnings
    pub fn report(&self) -> ForecastReport<'_> {
        ForecastReport {
            metrics: &self.metrics,
            chart: &self.chart,
            rows: self.summary.rows(),
            warnings: self.result.warnings(),
        }
    }
}

/// Serializable view of a run for JSON consumers
#[derive(Debug, Serialize)]
pub struct ForecastReport<'a> {
    pub metrics: &'a DashboardMetrics,
    pub chart: &'a ChartDefinition,
    pub rows: &'a [summary::ForecastRow],
    pub warnings: &'a [BoundInversionWarning],
}

/// Runs the stages with one configuration
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    config: ForecastConfig,
}

impl ForecastPipeline {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Read a CSV ledger into the observed daily series
    pub fn load<R: Read>(&self, reader: R) -> Result<DailyExpenseSeries> {
        let series = import::load_and_aggregate(reader)?;
        info!(
            "Loaded {} days of expenses ({} to {})",
            series.len(),
            series.first_date(),
            series.last_date()
        );
        Ok(series)
    }

    /// Apply the gap policy
    pub fn prepare(&self, series: &DailyExpenseSeries) -> DailyExpenseSeries {
        let prepared = series.with_gap_policy(self.config.gap_policy);
        debug!(
            "Gap policy {}: {} observed days -> {} training days",
            self.config.gap_policy,
            series.len(),
            prepared.len()
        );
        prepared
    }

    pub fn fit(&self, series: &DailyExpenseSeries) -> Result<FittedModel> {
        sarima::fit(series, self.config.order, self.config.seasonal_order)
    }

    pub fn forecast(&self, model: &FittedModel) -> Result<ForecastResult> {
        forecast::forecast(model, self.config.horizon, self.config.confidence)
    }

    pub fn summarize(&self, result: &ForecastResult) -> Result<ForecastSummary> {
        summary::summarize(result)
    }

    /// Run every stage on a CSV ledger
    pub fn run<R: Read>(&self, reader: R) -> Result<PipelineOutput> {
        self.config.validate()?;

        let observed = self.load(reader)?;
        let series = self.prepare(&observed);
        let model = self.fit(&series)?;
        let result = self.forecast(&model)?;
        let summary = self.summarize(&result)?;
        let chart = build_chart(&series, &result, self.config.history_window);
        let metrics = dashboard_metrics(&series, &model, &summary);

        info!(
            "Forecast {} days: total {:.2}, peak {:.2}, average {:.2}",
            result.horizon(),
            summary.total(),
            summary.peak(),
            summary.average()
        );

        Ok(PipelineOutput {
            series,
            model,
            result,
            summary,
            chart,
            metrics,
        })
    }

    /// Run every stage on a ledger file
    pub fn run_file(&self, path: &Path) -> Result<PipelineOutput> {
        let file = File::open(path)?;
        self.run(BufReader::new(file))
    }
}
