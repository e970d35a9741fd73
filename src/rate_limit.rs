use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use crate::metrics::RATE_LIMITED;
use crate::state::AppState;

// Rate limit entry - tracks requests per client key
pub struct RateWindow {
    pub count: u32,
    pub window_start: Instant,
}

pub enum Gate {
    Allow,
    Deny { retry_after_secs: u64 },
}

// Fixed-window rate limiter keyed by client. Windows are kept for the life of
// the process; there is no eviction.
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn gate(&self, key: &str) -> Gate {
        let now = Instant::now();

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(RateWindow {
                count: 0,
                window_start: now,
            });

        // window expired? reset it
        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.limit {
            let remaining = self.window.saturating_sub(now.duration_since(entry.window_start));
            let retry_after_secs = (remaining.as_millis().div_ceil(1000) as u64).max(1);
            return Gate::Deny { retry_after_secs };
        }

        entry.count += 1;
        Gate::Allow
    }
}

// Derive a throttling key from forwarded-for style headers. The value is only
// used as a map key and is never validated as a real IP.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }
    "local".to_string()
}

// Middleware guarding the /proxy routes. Health and metrics stay outside it.
pub async fn gate_proxy(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let key = client_key(req.headers());
    match state.rate_limiter.gate(&key) {
        Gate::Allow => next.run(req).await,
        Gate::Deny { retry_after_secs } => {
            RATE_LIMITED.inc();
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(serde_json::json!({ "error": "too_many_requests" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn allows_up_to_limit_then_denies() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(matches!(limiter.gate("1.2.3.4"), Gate::Allow));
        }
        match limiter.gate("1.2.3.4") {
            Gate::Deny { retry_after_secs } => assert!(retry_after_secs >= 1),
            Gate::Allow => panic!("fourth request should be denied"),
        }
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(matches!(limiter.gate("a"), Gate::Allow));
        assert!(matches!(limiter.gate("a"), Gate::Deny { .. }));
        assert!(matches!(limiter.gate("b"), Gate::Allow));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = RateLimiter::new(2, Duration::from_millis(40));
        assert!(matches!(limiter.gate("k"), Gate::Allow));
        assert!(matches!(limiter.gate("k"), Gate::Allow));
        assert!(matches!(limiter.gate("k"), Gate::Deny { .. }));

        std::thread::sleep(Duration::from_millis(50));

        // fresh window: full quota again
        assert!(matches!(limiter.gate("k"), Gate::Allow));
        assert!(matches!(limiter.gate("k"), Gate::Allow));
        assert!(matches!(limiter.gate("k"), Gate::Deny { .. }));
    }

    #[test]
    fn client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("9.9.9.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("8.8.8.8"));
        assert_eq!(client_key(&headers), "9.9.9.9");
    }

    #[test]
    fn client_key_falls_back_to_real_ip_then_local() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("8.8.8.8"));
        assert_eq!(client_key(&headers), "8.8.8.8");

        assert_eq!(client_key(&HeaderMap::new()), "local");
    }
}
