use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /metrics
/// Prometheus scrape endpoint.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
