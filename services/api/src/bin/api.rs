//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, FixedWindowLimiter, InMemoryNoteStore, UpstashRateLimiter},
    config::Config,
    error::ApiError,
    web::{build_router, AppState, RateLimitKey},
};
use notes_core::ports::{NoteStore, RateLimiter};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Note Store & Run Migrations ---
    let store: Arc<dyn NoteStore> = if config.uses_memory_store() {
        warn!("Using the in-memory note store; notes will not survive a restart.");
        Arc::new(InMemoryNoteStore::new())
    } else {
        info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;
        let db_adapter = DbAdapter::new(db_pool);
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        info!("Database migrations complete.");
        Arc::new(db_adapter)
    };

    // --- 3. Initialize the Rate Limiter ---
    let rate_limit = &config.rate_limit;
    let limiter: Arc<dyn RateLimiter> = match &rate_limit.upstash {
        Some(credentials) => {
            info!("Using the Upstash rate limiter at {}", credentials.rest_url);
            Arc::new(UpstashRateLimiter::new(
                reqwest::Client::new(),
                credentials.rest_url.clone(),
                credentials.rest_token.clone(),
                rate_limit.max_requests,
                rate_limit.window,
            ))
        }
        None => {
            info!("Using the in-process rate limiter");
            Arc::new(FixedWindowLimiter::new(
                rate_limit.max_requests,
                rate_limit.window,
            ))
        }
    };
    info!(
        "Rate limit: {} requests per {:?} ({:?} scope)",
        rate_limit.max_requests, rate_limit.window, rate_limit.scope
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        limiter,
        rate_limit_key: RateLimitKey {
            base: rate_limit.key.clone(),
            scope: rate_limit.scope.clone(),
        },
    });

    // --- 5. Create the Web Router ---
    let app = build_router(
        app_state,
        &config.static_dir,
        config.cors_allow_origin.as_deref(),
    );

    // --- 6. Start the Server ---
    info!("Server is running on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
