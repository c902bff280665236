//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `NoteStore` port. Selected with
//! `DATABASE_URL=memory://` for local runs and used by the test suites.

use async_trait::async_trait;
use chrono::Utc;
use notes_core::domain::{Note, NoteDraft};
use notes_core::ports::{NoteStore, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Notes held in a map guarded by an async read/write lock.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list_notes(&self) -> PortResult<Vec<Note>> {
        let mut notes: Vec<Note> = self.notes.read().await.values().cloned().collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(notes)
    }

    async fn create_note(&self, draft: NoteDraft) -> PortResult<Note> {
        let mut notes = self.notes.write().await;
        let mut note = Note::create(draft.clone(), Utc::now());
        // v4 collisions are practically impossible, but ids must never be reused.
        while notes.contains_key(&note.id) {
            note = Note::create(draft.clone(), note.created_at);
        }
        notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> PortResult<Note> {
        let mut notes = self.notes.write().await;
        let note = notes
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))?;
        note.apply(draft, Utc::now());
        Ok(note.clone())
    }

    async fn delete_note(&self, id: Uuid) -> PortResult<()> {
        self.notes
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_distinct_ids_and_equal_timestamps() {
        let store = InMemoryNoteStore::new();
        let a = store.create_note(NoteDraft::new("A", "hello")).await.unwrap();
        let b = store.create_note(NoteDraft::new("B", "world")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn list_is_sorted_by_updated_at_descending() {
        let store = InMemoryNoteStore::new();
        let first = store.create_note(NoteDraft::new("first", "")).await.unwrap();
        let _second = store.create_note(NoteDraft::new("second", "")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update_note(first.id, NoteDraft::new("first, edited", ""))
            .await
            .unwrap();

        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes[0].title, "first, edited");
        assert!(notes.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_and_replaces_fields() {
        let store = InMemoryNoteStore::new();
        let note = store.create_note(NoteDraft::new("A", "hello")).await.unwrap();
        let updated = store
            .update_note(note.id, NoteDraft::new("A2", ""))
            .await
            .unwrap();
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.content, "");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = InMemoryNoteStore::new();
        let note = store.create_note(NoteDraft::new("A", "")).await.unwrap();
        store.delete_note(note.id).await.unwrap();
        assert!(store.is_empty().await);

        assert!(matches!(
            store.delete_note(note.id).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            store.update_note(note.id, NoteDraft::default()).await,
            Err(PortError::NotFound(_))
        ));
    }
}
