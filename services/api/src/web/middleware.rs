//! services/api/src/web/middleware.rs
//!
//! Rate-limiting middleware for the notes routes.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that counts the request against the rate limiter before the handler runs.
///
/// If the quota is exhausted, returns 429 without calling the handler.
/// If the limiter itself fails, the error goes to the generic 500 path.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Pick the key (peer address is only present when served with connect info)
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = state.rate_limit_key.for_peer(peer);

    // 2. Consult the limiter
    let decision = state.limiter.limit(&key).await.map_err(|e| {
        error!("Rate limiter failed: {:?}", e);
        ApiError::Internal(e.to_string())
    })?;

    if !decision.allowed {
        warn!(key = %key, "Rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    // 3. Continue to the handler
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    Ok(response)
}
