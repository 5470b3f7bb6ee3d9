//! Per-client-IP rate limiting for the `/api` routes, using governor.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub type ClientRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// One bucket per client IP, refilled over a minute. `None` when
/// `requests_per_minute` is 0, which turns limiting off.
pub fn create_rate_limiter(requests_per_minute: u32) -> Option<Arc<ClientRateLimiter>> {
    NonZeroU32::new(requests_per_minute)
        .map(|quota| Arc::new(RateLimiter::keyed(Quota::per_minute(quota))))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return Ok(next.run(request).await);
    };

    let client = client_ip(&request);
    if let Err(not_until) = limiter.check_key(&client) {
        let wait = not_until.wait_time_from(DefaultClock::default().now());
        let retry_after_secs = (wait.as_secs_f64().ceil() as u64).max(1);

        warn!(
            %client,
            path = %request.uri().path(),
            retry_after_secs,
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimited { retry_after_secs });
    }

    Ok(next.run(request).await)
}

/// Peer address from `ConnectInfo`. Requests without one (in-process
/// callers) share a single bucket.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Drops buckets of clients that are back to a full quota, so the keyed
/// store does not grow with every address ever seen.
pub fn spawn_limiter_cleanup(limiter: Arc<ClientRateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            limiter.retain_recent();
            limiter.shrink_to_fit();
            debug!(tracked_clients = limiter.len(), "rate limiter state trimmed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_zero_quota_disables_limiting() {
        assert!(create_rate_limiter(0).is_none());
    }

    #[test]
    fn test_quota_is_per_client() {
        let limiter = create_rate_limiter(2).unwrap();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_err());
        assert!(limiter.check_key(&b).is_ok());
    }

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut request = Request::new(Body::empty());
        assert_eq!(client_ip(&request), IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 7], 5000))));
        assert_eq!(client_ip(&request), IpAddr::from([192, 168, 1, 7]));
    }
}
