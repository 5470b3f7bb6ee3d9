mod auth;
mod cache;
mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod resume;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::blacklist::PgBlacklistStore;
use crate::auth::purge::spawn_blacklist_purge;
use crate::auth::tokens::TokenManager;
use crate::cache::TtlCache;
use crate::config::{check_cors_origins, Config};
use crate::db::{create_pool, run_migrations};
use crate::middleware::metrics::HttpMetrics;
use crate::middleware::rate_limit::{create_rate_limiter, spawn_limiter_cleanup};
use crate::resume::extract::PlainTextExtractor;
use crate::resume::parser::ResumeParser;
use crate::routes::build_router;
use crate::state::AppState;

const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    init_tracing(&config);

    info!("Starting Speech API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Token lifecycle, backed by the durable blacklist
    let blacklist = Arc::new(PgBlacklistStore::new(db.clone()));
    let tokens = Arc::new(
        TokenManager::from_config(&config, blacklist).context("Invalid JWT configuration")?,
    );
    info!(
        "Token manager ready (access {}m, refresh {}d)",
        config.access_token_exp_minutes, config.refresh_token_exp_days
    );

    // Resume cache: one instance for the whole process, shared via AppState
    let resume_cache = Arc::new(TtlCache::new(
        Duration::from_secs(config.resume_cache_ttl_secs),
        config.resume_cache_max_items,
    ));
    let resume_parser = Arc::new(ResumeParser::new(
        resume_cache,
        Arc::new(PlainTextExtractor),
    ));
    info!(
        "Resume cache: ttl {}s, max {} items",
        resume_parser.cache().ttl().as_secs(),
        resume_parser.cache().max_items()
    );

    spawn_blacklist_purge(
        tokens.clone(),
        Duration::from_secs(config.blacklist_purge_interval_secs),
    );

    let metrics = Arc::new(HttpMetrics::new().context("Failed to register HTTP metrics")?);

    let rate_limiter = create_rate_limiter(config.rate_limit_per_minute);
    match &rate_limiter {
        Some(limiter) => {
            info!("Rate limiting: {} requests/minute per client", config.rate_limit_per_minute);
            spawn_limiter_cleanup(limiter.clone(), LIMITER_CLEANUP_INTERVAL);
        }
        None => info!("Rate limiting disabled"),
    }

    let cors = build_cors(&config)?;

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        tokens,
        resume_parser,
        metrics,
        rate_limiter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Structured logging. `LOG_FORMAT=json` switches the fmt layer to JSON lines.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// CORS restricted to the configured front-end origins.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    check_cors_origins(&config.cors_allow_origins)?;

    let origins = config
        .cors_allow_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true))
}
