use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::tokens::TokenManager;
use crate::config::Config;
use crate::middleware::metrics::HttpMetrics;
use crate::middleware::rate_limit::ClientRateLimiter;
use crate::resume::parser::ResumeParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Issues and checks tokens; owns the blacklist store handle.
    pub tokens: Arc<TokenManager>,
    /// Wraps the process-wide resume cache built in `main`.
    pub resume_parser: Arc<ResumeParser>,
    pub metrics: Arc<HttpMetrics>,
    /// `None` when rate limiting is disabled.
    pub rate_limiter: Option<Arc<ClientRateLimiter>>,
}
