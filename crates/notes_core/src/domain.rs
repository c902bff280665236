//! crates/notes_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs are independent of any database; they serialize to the
//! camelCase JSON shape the HTTP API exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A title/content text record with identity and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Assigned by the store at creation, never reused.
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update; never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

/// The editable part of a note, as supplied to create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// True when both fields are blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

impl Note {
    /// Builds a freshly created note with both timestamps set to `now`.
    pub fn create(draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces title and content wholesale and refreshes `updated_at`.
    ///
    /// The new timestamp is clamped so it never moves backwards, which keeps
    /// `updated_at >= created_at` even when the clock steps back.
    pub fn apply(&mut self, draft: NoteDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.content = draft.content;
        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn serializes_with_camel_case_keys() {
        let note = Note::create(NoteDraft::new("T", "C"), Utc::now());
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["title"], "T");
        assert_eq!(json["content"], "C");
    }

    #[test]
    fn apply_never_moves_updated_at_backwards() {
        let now = Utc::now();
        let mut note = Note::create(NoteDraft::default(), now);
        note.apply(NoteDraft::new("A2", "hello2"), now - Duration::seconds(30));
        assert_eq!(note.title, "A2");
        assert_eq!(note.updated_at, now);
        assert!(note.updated_at >= note.created_at);
    }

    #[test]
    fn blank_draft_ignores_whitespace() {
        assert!(NoteDraft::new("  ", "\n\t").is_blank());
        assert!(!NoteDraft::new("", " x ").is_blank());
    }
}
