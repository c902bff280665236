//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::RateLimitScope;
use notes_core::ports::{NoteStore, RateLimiter};
use std::net::IpAddr;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub limiter: Arc<dyn RateLimiter>,
    pub rate_limit_key: RateLimitKey,
}

/// Chooses the key a request is counted under.
#[derive(Clone, Debug)]
pub struct RateLimitKey {
    pub base: String,
    pub scope: RateLimitScope,
}

impl RateLimitKey {
    pub fn global(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            scope: RateLimitScope::Global,
        }
    }

    /// The key for a request from `peer`. Per-client keys fall back to the shared
    /// key when the peer address is unknown.
    pub fn for_peer(&self, peer: Option<IpAddr>) -> String {
        match (&self.scope, peer) {
            (RateLimitScope::PerClient, Some(ip)) => format!("{}:{}", self.base, ip),
            _ => self.base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_ignores_the_peer() {
        let key = RateLimitKey::global("notes-api");
        assert_eq!(key.for_peer(Some("10.0.0.1".parse().unwrap())), "notes-api");
        assert_eq!(key.for_peer(None), "notes-api");
    }

    #[test]
    fn per_client_scope_appends_the_peer_ip() {
        let key = RateLimitKey {
            base: "notes-api".to_string(),
            scope: RateLimitScope::PerClient,
        };
        assert_eq!(
            key.for_peer(Some("10.0.0.1".parse().unwrap())),
            "notes-api:10.0.0.1"
        );
        assert_eq!(key.for_peer(None), "notes-api");
    }
}
