pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder and state to make them easily accessible
// to the binary that will run the web server.
pub use middleware::rate_limit;
pub use router::build_router;
pub use state::{AppState, RateLimitKey};
