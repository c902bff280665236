//! services/api/src/adapters/window.rs
//!
//! An in-process fixed-window implementation of the `RateLimiter` port, used when
//! no hosted limiter is configured.

use async_trait::async_trait;
use notes_core::ports::{PortResult, RateLimitDecision, RateLimiter};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Window {
    started_at: Instant,
    count: u32,
}

/// Counts requests per key and resets the count when the window elapses.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn limit(&self, key: &str) -> PortResult<RateLimitDecision> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        // Drop expired windows so per-client keys do not accumulate forever.
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        entry.count = entry.count.saturating_add(1);

        Ok(RateLimitDecision {
            allowed: entry.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
        })
    }
}
