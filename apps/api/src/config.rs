use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_exp_minutes: i64,
    pub refresh_token_exp_days: i64,
    pub resume_cache_ttl_secs: u64,
    pub resume_cache_max_items: usize,
    pub blacklist_purge_interval_secs: u64,
    pub max_resume_bytes: usize,
    pub cors_allow_origins: Vec<String>,
    /// Per-client-IP quota for `/api/*`. 0 disables rate limiting.
    pub rate_limit_per_minute: u32,
    pub port: u16,
    pub rust_log: String,
    /// "pretty" (default) or "json".
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            access_token_exp_minutes: parse_env("ACCESS_TOKEN_EXP_MINUTES", 15)?,
            refresh_token_exp_days: parse_env("REFRESH_TOKEN_EXP_DAYS", 14)?,
            resume_cache_ttl_secs: parse_env("RESUME_CACHE_TTL_SECS", 900)?,
            resume_cache_max_items: parse_env("RESUME_CACHE_MAX_ITEMS", 128)?,
            blacklist_purge_interval_secs: parse_env("BLACKLIST_PURGE_INTERVAL_SECS", 3600)?,
            max_resume_bytes: parse_env("MAX_RESUME_BYTES", 5 * 1024 * 1024)?,
            cors_allow_origins: parse_origins(
                &std::env::var("CORS_ALLOW_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:8501,http://127.0.0.1:8501".to_string()),
            )?,
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", 200)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<String>> {
    let origins = split_origins(raw);
    check_cors_origins(&origins)?;
    Ok(origins)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// CORS is served with credentials, which browsers refuse for a wildcard origin.
pub fn check_cors_origins(origins: &[String]) -> Result<()> {
    if origins.iter().any(|o| o == "*") {
        bail!("CORS_ALLOW_ORIGINS cannot contain '*' when credentials are allowed");
    }
    Ok(())
}

#[cfg(test)]
impl Config {
    /// Defaults for in-process tests. The database URL is never connected to.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/unused".into(),
            jwt_secret: "router-test-secret-long-enough-for-hs256".into(),
            access_token_exp_minutes: 15,
            refresh_token_exp_days: 14,
            resume_cache_ttl_secs: 900,
            resume_cache_max_items: 128,
            blacklist_purge_interval_secs: 3600,
            max_resume_bytes: 5 * 1024 * 1024,
            cors_allow_origins: vec!["http://localhost:8501".into()],
            rate_limit_per_minute: 0,
            port: 0,
            rust_log: "info".into(),
            log_format: "pretty".into(),
        }
    }
}
