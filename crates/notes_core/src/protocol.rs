//! crates/notes_core/src/protocol.rs
//!
//! Defines the JSON bodies exchanged between the client application and the API server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Note, NoteDraft};

//=========================================================================================
// Request Bodies
//=========================================================================================

/// The body accepted by create and update.
///
/// Both fields are optional; an absent or `null` field means the empty string.
/// Any other JSON type is a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl NotePayload {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    pub fn into_draft(self) -> NoteDraft {
        NoteDraft {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
        }
    }
}

impl From<NoteDraft> for NotePayload {
    fn from(draft: NoteDraft) -> Self {
        Self::new(draft.title, draft.content)
    }
}

//=========================================================================================
// Response Bodies
//=========================================================================================

/// Returned by create and update: a status message plus the stored note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NoteEnvelope {
    pub message: String,
    pub note: Note,
}

/// A bare status or error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthBody {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
