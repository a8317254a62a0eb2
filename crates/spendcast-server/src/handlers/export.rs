//! Forecast CSV download

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
};
use tracing::info;

use spendcast_core::export::{forecast_csv, EXPORT_FILENAME};

use super::forecast::{request_config, run_pipeline, ForecastQuery};
use crate::{AppError, AppState};

/// GET /api/export/forecast - Forecast table as CSV
pub async fn export_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Response<Body>, AppError> {
    let config = request_config(&state, &query)?;
    let output = run_pipeline(&state, config).await?;

    let csv = forecast_csv(&output.summary).map_err(AppError::pipeline)?;
    info!("Exported {} forecast rows", output.summary.rows().len());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}
