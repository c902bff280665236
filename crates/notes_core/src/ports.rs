//! crates/notes_core/src/ports.rs
//!
//! Defines the service contracts (traits) the HTTP layer depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete note store and rate-limiting service.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Note, NoteDraft};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The persistent collection of notes.
///
/// Every method touches at most one document and writes through immediately.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, most recently updated first.
    async fn list_notes(&self) -> PortResult<Vec<Note>>;

    /// Persists a new note; the store assigns the id and both timestamps.
    async fn create_note(&self, draft: NoteDraft) -> PortResult<Note>;

    /// Replaces title and content and refreshes `updated_at`.
    /// Returns `PortError::NotFound` when no note has this id.
    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> PortResult<Note>;

    /// Hard-deletes the note. Returns `PortError::NotFound` when no note has this id.
    async fn delete_note(&self, id: Uuid) -> PortResult<()>;
}

/// The outcome of consulting a rate limiter for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests permitted per window.
    pub limit: u32,
    /// Requests still available in the current window.
    pub remaining: u32,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key` and reports whether it may proceed.
    async fn limit(&self, key: &str) -> PortResult<RateLimitDecision>;
}
