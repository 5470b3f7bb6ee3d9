//! Prometheus request metrics: a count per method, route and status, and a
//! latency histogram per route.

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::state::AppState;

/// Label used for requests that matched no route.
const UNMATCHED_PATH: &str = "unmatched";

pub struct HttpMetrics {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
}

impl HttpMetrics {
    /// Registers the collectors in a registry owned by this instance.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let latency = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "Request latency in seconds"),
            &["path"],
        )?;
        registry.register(Box::new(latency.clone()))?;

        Ok(Self {
            registry,
            requests,
            latency,
        })
    }

    pub fn observe(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.requests
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.latency
            .with_label_values(&[path])
            .observe(elapsed.as_secs_f64());
    }

    /// Text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Labels by route template rather than raw URI to keep cardinality bounded.
pub async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    state.metrics.observe(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_and_render() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.observe("POST", "/api/auth/login", 401, Duration::from_millis(12));
        metrics.observe("POST", "/api/auth/login", 401, Duration::from_millis(8));

        let text = metrics.render().unwrap();
        assert!(text.contains(
            r#"http_requests_total{method="POST",path="/api/auth/login",status="401"} 2"#
        ));
        assert!(text.contains(r#"http_request_duration_seconds_count{path="/api/auth/login"} 2"#));
    }

    #[test]
    fn test_registries_are_independent() {
        let first = HttpMetrics::new().unwrap();
        let second = HttpMetrics::new().unwrap();
        first.observe("GET", "/health", 200, Duration::ZERO);

        assert!(!second.render().unwrap().contains("/health"));
    }
}
