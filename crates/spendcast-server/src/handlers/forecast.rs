//! Forecast and health handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use spendcast_core::{ForecastConfig, ForecastPipeline, PipelineOutput, MAX_UI_HORIZON, MIN_UI_HORIZON};

use crate::{AppError, AppState};

/// Query parameters for forecast requests
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    /// Days to forecast (7-90)
    pub horizon: Option<usize>,
    /// Two-sided confidence level in (0, 1)
    pub confidence: Option<f64>,
}

/// Apply query overrides to the server defaults
pub(crate) fn request_config(state: &AppState, query: &ForecastQuery) -> Result<ForecastConfig, AppError> {
    let horizon = query.horizon.unwrap_or(state.forecast.horizon);
    if !(MIN_UI_HORIZON..=MAX_UI_HORIZON).contains(&horizon) {
        return Err(AppError::bad_request(&format!(
            "horizon must be between {} and {} days",
            MIN_UI_HORIZON, MAX_UI_HORIZON
        )));
    }

    let confidence = query.confidence.unwrap_or(state.forecast.confidence);
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AppError::bad_request(
            "confidence must be between 0 and 1 (exclusive)",
        ));
    }

    Ok(state
        .forecast
        .clone()
        .with_horizon(horizon)
        .with_confidence(confidence))
}

/// Run the pipeline on the ledger off the async executor
pub(crate) async fn run_pipeline(
    state: &AppState,
    config: ForecastConfig,
) -> Result<PipelineOutput, AppError> {
    let path = state.ledger_path.clone();
    debug!(
        "Running forecast pipeline on {} (horizon {})",
        path.display(),
        config.horizon
    );

    tokio::task::spawn_blocking(move || ForecastPipeline::new(config).run_file(&path))
        .await?
        .map_err(AppError::pipeline)
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/forecast - Dashboard metrics, chart definition and forecast table
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Value>, AppError> {
    let config = request_config(&state, &query)?;
    let output = run_pipeline(&state, config).await?;

    Ok(Json(serde_json::to_value(output.report())?))
}
