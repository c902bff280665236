//! services/api/src/web/router.rs
//!
//! Assembles the complete HTTP application: the rate-limited notes API, the health
//! check, Swagger UI and the static client bundle.

use crate::web::{
    middleware::rate_limit,
    rest::{
        api_not_found_handler, create_note_handler, delete_note_handler, health_handler,
        list_notes_handler, update_note_handler, ApiDoc,
    },
    state::AppState,
};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{any, get, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// The notes routes, each guarded by the rate limiter.
///
/// Both `/api/notes` and `/api/notes/` are accepted for the collection.
pub fn notes_router(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notes", get(list_notes_handler).post(create_note_handler))
        .route("/api/notes/", get(list_notes_handler).post(create_note_handler))
        .route(
            "/api/notes/{id}",
            put(update_note_handler).delete(delete_note_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(app_state, rate_limit))
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];
    match allow_origin.map(|o| o.parse::<HeaderValue>()) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([CONTENT_TYPE]),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS origin: {}", e);
            CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any)
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any),
    }
}

/// Builds the full application router.
///
/// Any path outside `/api` that matches no route is answered from `static_dir`,
/// falling back to its `index.html` so client-side routes load the shell.
pub fn build_router(
    app_state: Arc<AppState>,
    static_dir: &Path,
    cors_allow_origin: Option<&str>,
) -> Router {
    let client_bundle = ServeDir::new(static_dir)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    let api_router = Router::new()
        .merge(notes_router(app_state.clone()))
        .route("/health", get(health_handler))
        .route("/api", any(api_not_found_handler))
        .route("/api/{*rest}", any(api_not_found_handler))
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(client_bundle)
        .layer(cors_layer(cors_allow_origin))
        .layer(TraceLayer::new_for_http())
}
