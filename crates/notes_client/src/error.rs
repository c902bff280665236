//! crates/notes_client/src/error.rs

/// Errors surfaced by the client's network calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, timeout, bad body).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// True when the server reported that the note does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Server { status: 404, .. })
    }
}
