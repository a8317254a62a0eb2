//! Spendcast Web Server
//!
//! Axum-based API that backs the forecast dashboard:
//! - `GET /api/health`
//! - `GET /api/forecast` - metrics, chart definition, forecast table
//! - `GET /api/export/forecast` - forecast table as a CSV download
//!
//! Every request re-reads the ledger and runs the whole pipeline on a blocking
//! thread. There is no cached model and no shared mutable state.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use spendcast_core::ForecastConfig;

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    /// CSV ledger read on every request
    pub ledger_path: PathBuf,
    /// Defaults for requests that don't override them
    pub forecast: ForecastConfig,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(ledger_path: PathBuf, forecast: ForecastConfig) -> Self {
        Self {
            ledger_path,
            forecast,
            config: ServerConfig::default(),
        }
    }

    /// Allow cross-origin requests from the given origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.config.allowed_origins = origins;
        self
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = if state.config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/forecast", get(handlers::get_forecast))
        .route("/export/forecast", get(handlers::export_forecast));

    Router::new()
        .nest("/api", api_routes)
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    info!(
        "Serving forecasts for {} (horizon {}, confidence {})",
        state.ledger_path.display(),
        state.forecast.horizon,
        state.forecast.confidence
    );

    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a pipeline failure: ledger content problems are the caller's to fix,
    /// I/O failures are logged and hidden
    pub fn pipeline(err: spendcast_core::Error) -> Self {
        match err {
            spendcast_core::Error::Io(_) => Self::from(err),
            other => Self::unprocessable(&other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
