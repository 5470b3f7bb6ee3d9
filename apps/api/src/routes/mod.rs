pub mod health;
pub mod metrics;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::middleware::metrics::track_metrics;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Slack on top of `max_resume_bytes` for multipart headers and boundaries,
/// so oversized files reach the handler and get a proper 413 body.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_resume_bytes + MULTIPART_OVERHEAD;

    let api = Router::new()
        // Auth API
        .route("/api/auth/signup", post(auth::handle_signup))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/refresh", post(auth::handle_refresh))
        .route("/api/auth/logout", post(auth::handle_logout))
        .route(
            "/api/auth/clean-blacklist",
            post(auth::handle_clean_blacklist),
        )
        .route("/api/auth/me", get(auth::handle_me))
        // Resume API
        .route(
            "/api/resume/upload",
            post(resume::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .merge(api)
        .layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .with_state(state)
}
