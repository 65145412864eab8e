//! Per-client token bucket rate limiting.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::RateLimitConfig;
use crate::http::types::ErrorBody;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// A bucket that would be full again is indistinguishable from a new one.
    fn is_refilled(&self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens + elapsed * refill_rate >= capacity
    }
}

/// Idle buckets are swept once per this many checks.
const CLEANUP_EVERY: u64 = 1024;

/// Buckets keyed by client IP.
pub struct RateLimiterState {
    buckets: DashMap<String, TokenBucket>,
    rps: f64,
    burst: f64,
    checks: AtomicU64,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            rps: config.requests_per_second as f64,
            burst: config.burst_size.max(1) as f64,
            checks: AtomicU64::new(0),
        }
    }

    pub fn check(&self, key: &str) -> bool {
        let allowed = {
            let mut bucket = self
                .buckets
                .entry(key.to_string())
                .or_insert_with(|| TokenBucket::new(self.burst));
            bucket.try_acquire(self.burst, self.rps)
        };
        if self.checks.fetch_add(1, Ordering::Relaxed) % CLEANUP_EVERY == CLEANUP_EVERY - 1 {
            self.cleanup_idle();
        }
        allowed
    }

    /// Drop buckets of clients that have been quiet long enough to refill.
    pub fn cleanup_idle(&self) {
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| !bucket.is_refilled(now, self.burst, self.rps));
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Middleware function for per-IP rate limiting.
///
/// Requests without connection info (in-process tests) share one bucket.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if state.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited();
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody::new("Rate limit exceeded", "rate_limited")),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_reject() {
        let state = RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1,
            burst_size: 2,
        });
        assert!(state.check("10.0.0.1"));
        assert!(state.check("10.0.0.1"));
        assert!(!state.check("10.0.0.1"));
        // Separate bucket per client
        assert!(state.check("10.0.0.2"));
    }

    #[test]
    fn test_cleanup_drops_only_refilled_buckets() {
        let state = RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1,
            burst_size: 2,
        });
        assert!(state.check("10.0.0.1"));
        assert!(state.check("10.0.0.1"));
        state.cleanup_idle();
        // Still drained, so forgetting it would reset the limit
        assert_eq!(state.len(), 1);
        assert!(!state.check("10.0.0.1"));

        let fast = RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1000,
            burst_size: 2,
        });
        assert!(fast.check("10.0.0.1"));
        std::thread::sleep(std::time::Duration::from_millis(20));
        fast.cleanup_idle();
        assert!(fast.is_empty());
    }

    #[test]
    fn test_cleanup_runs_during_checks() {
        let state = RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1_000_000,
            burst_size: 1_000_000,
        });
        for i in 0..CLEANUP_EVERY {
            state.check(&format!("10.0.{}.{}", i / 256, i % 256));
        }
        assert!(state.len() < CLEANUP_EVERY as usize);
    }
}
