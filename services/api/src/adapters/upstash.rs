//! services/api/src/adapters/upstash.rs
//!
//! This module contains the adapter for the hosted Upstash Redis rate limiter.
//! It implements the `RateLimiter` port from the `core` crate as a fixed window
//! over the Upstash REST pipeline endpoint.

use async_trait::async_trait;
use notes_core::ports::{PortError, PortResult, RateLimitDecision, RateLimiter};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `RateLimiter` using `INCR` + `PEXPIRE` on Upstash Redis.
#[derive(Clone)]
pub struct UpstashRateLimiter {
    client: reqwest::Client,
    rest_url: String,
    rest_token: String,
    max_requests: u32,
    window: Duration,
}

impl UpstashRateLimiter {
    /// Creates a new `UpstashRateLimiter`.
    pub fn new(
        client: reqwest::Client,
        rest_url: impl Into<String>,
        rest_token: impl Into<String>,
        max_requests: u32,
        window: Duration,
    ) -> Self {
        Self {
            client,
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
            rest_token: rest_token.into(),
            max_requests,
            window,
        }
    }

    /// The Redis key for the window containing `now_ms`.
    fn window_key(&self, key: &str, now_ms: u128) -> String {
        let window_ms = self.window.as_millis().max(1);
        format!("ratelimit:{}:{}", key, now_ms / window_ms)
    }
}

/// One entry of an Upstash pipeline response.
#[derive(Deserialize)]
struct PipelineEntry {
    result: Option<serde_json::Value>,
    error: Option<String>,
}

/// Extracts the counter value returned by the `INCR` command.
fn parse_count(entries: Vec<PipelineEntry>) -> PortResult<u64> {
    let first = entries
        .into_iter()
        .next()
        .ok_or_else(|| PortError::Unexpected("Upstash returned an empty pipeline response".to_string()))?;
    if let Some(error) = first.error {
        return Err(PortError::Unexpected(format!("Upstash INCR failed: {}", error)));
    }
    first
        .result
        .and_then(|v| v.as_u64())
        .ok_or_else(|| PortError::Unexpected("Upstash INCR returned a non-integer result".to_string()))
}

//=========================================================================================
// `RateLimiter` Trait Implementation
//=========================================================================================

#[async_trait]
impl RateLimiter for UpstashRateLimiter {
    async fn limit(&self, key: &str) -> PortResult<RateLimitDecision> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .as_millis();
        let redis_key = self.window_key(key, now_ms);
        let commands = json!([
            ["INCR", redis_key],
            ["PEXPIRE", redis_key, self.window.as_millis().to_string(), "NX"],
        ]);

        let response = self
            .client
            .post(format!("{}/pipeline", self.rest_url))
            .bearer_auth(&self.rest_token)
            .json(&commands)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Upstash request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!("Upstash error {}: {}", status, text)));
        }

        let entries: Vec<PipelineEntry> = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse Upstash response: {}", e)))?;
        let count = parse_count(entries)?;
        let used = u32::try_from(count).unwrap_or(u32::MAX);

        Ok(RateLimitDecision {
            allowed: used <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(used),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    };

    async fn fake_pipeline(
        State(counter): State<Arc<AtomicU64>>,
        headers: HeaderMap,
        Json(commands): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        assert_eq!(
            headers.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer token")
        );
        assert_eq!(commands[0][0], "INCR");
        assert_eq!(commands[1][0], "PEXPIRE");
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Json(json!([{ "result": count }, { "result": 1 }]))
    }

    #[tokio::test]
    async fn counts_through_the_rest_pipeline() {
        let counter = Arc::new(AtomicU64::new(0));
        let app = Router::new()
            .route("/pipeline", post(fake_pipeline))
            .with_state(counter);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let limiter = UpstashRateLimiter::new(
            reqwest::Client::new(),
            format!("http://{}/", addr),
            "token",
            1,
            Duration::from_secs(60),
        );
        let first = limiter.limit("notes-api").await.unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining, 0);
        assert!(!limiter.limit("notes-api").await.unwrap().allowed);
    }

    #[test]
    fn pipeline_errors_are_surfaced() {
        let entries = vec![PipelineEntry {
            result: None,
            error: Some("WRONGTYPE".to_string()),
        }];
        assert!(matches!(parse_count(entries), Err(PortError::Unexpected(_))));
        assert!(parse_count(Vec::new()).is_err());
    }

    #[test]
    fn window_keys_change_per_window() {
        let limiter = UpstashRateLimiter::new(
            reqwest::Client::new(),
            "http://localhost",
            "t",
            10,
            Duration::from_secs(60),
        );
        assert_eq!(limiter.window_key("k", 0), limiter.window_key("k", 59_999));
        assert_ne!(limiter.window_key("k", 0), limiter.window_key("k", 60_000));
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let limiter = UpstashRateLimiter::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "t",
            10,
            Duration::from_secs(60),
        );
        assert!(limiter.limit("k").await.is_err());
    }
}
