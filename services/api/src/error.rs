//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is rendered as an HTTP response.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notes_core::ports::PortError;
use notes_core::protocol::MessageBody;

pub const NOT_FOUND_MESSAGE: &str = "Note not found";
pub const RATE_LIMITED_MESSAGE: &str = "too many request please try again later";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to apply the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The referenced note does not exist, or the id could not be parsed.
    #[error("Note not found")]
    NotFound,

    /// The request body did not match the expected schema.
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// The shared request quota is exhausted.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound | ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE.to_string(),
            StatusCode::BAD_REQUEST => self.to_string(),
            StatusCode::TOO_MANY_REQUESTS => RATE_LIMITED_MESSAGE.to_string(),
            // Internal details stay in the logs, never in the body.
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        };
        (status, Json(MessageBody::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Port(PortError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::Port(PortError::Unexpected("db down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
