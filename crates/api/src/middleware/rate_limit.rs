//! Per-client rate limiting.
//!
//! Clients are keyed by their peer address, or by the first
//! `X-Forwarded-For` entry when the connection address is unavailable.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};

use crate::app::AppState;
use crate::error::ApiError;

type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Tracked clients above which stale entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiter state shared across all requests.
pub struct RateLimiterState {
    limiter: KeyedLimiter,
    clock: DefaultClock,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when the limit is zero, which disables limiting.
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            rate_limit_per_minute,
        })
    }

    /// Checks one request from `client`.
    ///
    /// On rejection returns the number of seconds to wait, at least one.
    pub fn check(&self, client: IpAddr) -> Result<(), u64> {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }

        self.limiter.check_key(&client).map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

fn client_ip(req: &Request<Body>) -> Option<IpAddr> {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.ip());
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
}

/// Rejects requests over the configured per-minute budget with 429 and a
/// `Retry-After` header. Requests without an identifiable client pass.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let (Some(limiter), Some(client)) = (state.rate_limiter.as_ref(), client_ip(&req)) {
        if let Err(retry_after) = limiter.check(client) {
            tracing::warn!(client = %client, retry_after, "Rate limit exceeded");
            return rate_limited_response(retry_after);
        }
    }

    next.run(req).await
}

fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = ApiError::RateLimited.into_response();
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_zero_limit_disables() {
        assert!(RateLimiterState::new(0).is_none());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(1).unwrap();
        assert!(state.check(ip(1)).is_ok());

        let result = state.check(ip(1));
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_clients_are_independent() {
        let state = RateLimiterState::new(1).unwrap();
        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(2)).is_ok());
        assert!(state.check(ip(1)).is_err());
        assert!(state.check(ip(2)).is_err());
    }

    #[test]
    fn test_allows_budget() {
        let state = RateLimiterState::new(5).unwrap();
        for i in 0..5 {
            assert!(state.check(ip(7)).is_ok(), "Request {} should be allowed", i);
        }
        assert!(state.check(ip(7)).is_err());
    }

    #[test]
    fn test_client_ip_from_forwarded_header() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), Some("203.0.113.9".parse().unwrap()));

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&req), None);
    }

    #[test]
    fn test_client_ip_prefers_connect_info() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        assert_eq!(client_ip(&req), Some("192.0.2.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let response = rate_limited_response(12);
        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
