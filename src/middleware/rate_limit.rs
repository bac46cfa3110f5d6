use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header::RETRY_AFTER, HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::response::json_error;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

const DEFAULT_WINDOW_MS: u64 = 60_000;
const DEFAULT_MAX_REQUESTS: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: usize,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            window_ms: env_u64("ANALYSIS_RATE_LIMIT_WINDOW_MS").unwrap_or(DEFAULT_WINDOW_MS),
            max_requests: env_u64("ANALYSIS_RATE_LIMIT_MAX")
                .map(|v| v as usize)
                .unwrap_or(DEFAULT_MAX_REQUESTS),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitCheck {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
    pub reset_after_seconds: u64,
}

/// Sliding-window request log per user. A refused call is not recorded, so
/// hammering a closed window does not extend it.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    requests: Mutex<HashMap<String, Vec<u64>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, key: &str) -> RateLimitCheck {
        self.check_at(key, now_ms()).await
    }

    async fn check_at(&self, key: &str, now_ms: u64) -> RateLimitCheck {
        let window_floor = now_ms.saturating_sub(self.config.window_ms);
        let mut requests = self.requests.lock().await;
        let timestamps = requests.entry(key.to_string()).or_default();
        timestamps.retain(|ts| *ts > window_floor);

        let allowed = timestamps.len() < self.config.max_requests;
        if allowed {
            timestamps.push(now_ms);
        }

        let reset_after_ms = timestamps
            .first()
            .map(|oldest| (oldest + self.config.window_ms).saturating_sub(now_ms))
            .unwrap_or(0);

        RateLimitCheck {
            allowed,
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(timestamps.len()),
            reset_after_seconds: reset_after_ms.div_ceil(1000),
        }
    }

    /// Drops users whose windows have fully drained.
    pub async fn cleanup(&self) {
        let window_floor = now_ms().saturating_sub(self.config.window_ms);
        let mut requests = self.requests.lock().await;
        requests.retain(|_, timestamps| {
            timestamps.retain(|ts| *ts > window_floor);
            !timestamps.is_empty()
        });
    }

    pub async fn tracked_users(&self) -> usize {
        self.requests.lock().await.len()
    }
}

pub async fn analysis_rate_limit_middleware(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = request_key(&req);
    let check = limiter.check(&key).await;

    if !check.allowed {
        let mut res = json_error(
            StatusCode::TOO_MANY_REQUESTS,
            "TOO_MANY_REQUESTS",
            "Too many analysis requests, please retry later",
        )
        .into_response();
        apply_rate_limit_headers(&mut res, check);
        return res;
    }

    let mut res = next.run(req).await;
    apply_rate_limit_headers(&mut res, check);
    res
}

/// The authenticated user when the token checks out, otherwise the peer
/// address, so anonymous traffic still shares one budget per host.
fn request_key(req: &Request<Body>) -> String {
    if let Some(token) = crate::auth::extract_token(req.headers()) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if let Ok(claims) = crate::auth::verify_jwt(&token, &secret) {
                return claims.user_id;
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_rate_limit_headers(res: &mut Response, check: RateLimitCheck) {
    if let Ok(value) = HeaderValue::from_str(&check.limit.to_string()) {
        res.headers_mut().insert(RATE_LIMIT_LIMIT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&check.remaining.to_string()) {
        res.headers_mut().insert(RATE_LIMIT_REMAINING, value);
    }
    if let Ok(value) = HeaderValue::from_str(&check.reset_after_seconds.to_string()) {
        res.headers_mut().insert(RATE_LIMIT_RESET, value.clone());
        if !check.allowed {
            res.headers_mut().insert(RETRY_AFTER, value);
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse::<u64>().ok()
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: usize, window_ms: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(RateLimitConfig {
            window_ms,
            max_requests: max,
        })
    }

    #[tokio::test]
    async fn test_allows_up_to_max_then_refuses() {
        let limiter = limiter(3, 60_000);
        for _ in 0..3 {
            assert!(limiter.check_at("u1", 1_000).await.allowed);
        }
        let check = limiter.check_at("u1", 1_000).await;
        assert!(!check.allowed);
        assert_eq!(check.remaining, 0);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = limiter(2, 1_000);
        assert!(limiter.check_at("u1", 0).await.allowed);
        assert!(limiter.check_at("u1", 500).await.allowed);
        assert!(!limiter.check_at("u1", 900).await.allowed);
        // The first request has aged out by t=1500.
        assert!(limiter.check_at("u1", 1_500).await.allowed);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let limiter = limiter(1, 60_000);
        assert!(limiter.check_at("u1", 0).await.allowed);
        assert!(limiter.check_at("u2", 0).await.allowed);
        assert!(!limiter.check_at("u1", 1).await.allowed);
    }

    #[tokio::test]
    async fn test_refused_calls_are_not_recorded() {
        let limiter = limiter(1, 1_000);
        assert!(limiter.check_at("u1", 0).await.allowed);
        assert!(!limiter.check_at("u1", 999).await.allowed);
        // Only the first call occupies the window; it expires at t=1001.
        assert!(limiter.check_at("u1", 1_001).await.allowed);
    }

    #[tokio::test]
    async fn test_cleanup_drops_drained_users() {
        let limiter = limiter(2, 1);
        limiter.check_at("u1", 0).await;
        assert_eq!(limiter.tracked_users().await, 1);

        // The 1 ms window has long passed by the time cleanup runs on wall
        // clock time.
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_users().await, 0);
    }
}
