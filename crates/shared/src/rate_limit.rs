//! In-memory fixed-window rate limiting
//!
//! Used to throttle the public signup form. Each [`RateLimitConfig`] keeps its
//! own counters, so stacking a short and a long window behaves like two
//! independent limiters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Entries are swept once the map grows past this many keys
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Namespace for the counters, unique per limiter
    pub name: &'static str,
    pub max_requests: u32,
    pub window: Duration,
    /// Message returned to rejected clients
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window resets, set only when rejected
    pub retry_after_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(&'static str, String), Window>>>,
}

impl RateLimiter {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    pub async fn check(&self, config: &RateLimitConfig, key: &str) -> RateLimitResult {
        self.check_at(config, key, Instant::now()).await
    }

    /// Count a request for `key` as of `now`
    pub async fn check_at(
        &self,
        config: &RateLimitConfig,
        key: &str,
        now: Instant,
    ) -> RateLimitResult {
        let mut windows = self.windows.lock().await;

        if windows.len() > SWEEP_THRESHOLD {
            // Longest window in use is an hour
            let horizon = config.window.max(Duration::from_secs(3600));
            windows.retain(|_, window| now.saturating_duration_since(window.started_at) < horizon);
        }

        let window = windows
            .entry((config.name, key.to_string()))
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        if now.saturating_duration_since(window.started_at) >= config.window {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= config.max_requests {
            let elapsed = now.saturating_duration_since(window.started_at);
            let retry_after = config.window.saturating_sub(elapsed).as_secs().max(1);

            tracing::debug!(
                limiter = config.name,
                key,
                retry_after,
                "Rate limit exceeded"
            );

            return RateLimitResult {
                allowed: false,
                limit: config.max_requests,
                remaining: 0,
                retry_after_seconds: Some(retry_after),
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            limit: config.max_requests,
            remaining: config.max_requests - window.count,
            retry_after_seconds: None,
        }
    }
}
