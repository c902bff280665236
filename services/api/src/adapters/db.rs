//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `NoteStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notes_core::domain::{Note, NoteDraft};
use notes_core::ports::{NoteStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `NoteStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct NoteRecord {
    id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl NoteRecord {
    fn to_domain(self) -> Note {
        Note {
            id: self.id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at";

//=========================================================================================
// `NoteStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl NoteStore for DbAdapter {
    async fn list_notes(&self) -> PortResult<Vec<Note>> {
        let records = sqlx::query_as::<_, NoteRecord>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes ORDER BY updated_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let notes = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(notes)
    }

    async fn create_note(&self, draft: NoteDraft) -> PortResult<Note> {
        let record = sqlx::query_as::<_, NoteRecord>(&format!(
            "INSERT INTO notes (id, title, content) VALUES ($1, $2, $3) RETURNING {NOTE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(draft.title)
        .bind(draft.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> PortResult<Note> {
        // GREATEST keeps updated_at monotonic even if the database clock steps back.
        let record = sqlx::query_as::<_, NoteRecord>(&format!(
            "UPDATE notes SET title = $1, content = $2, updated_at = GREATEST(now(), updated_at) \
             WHERE id = $3 RETURNING {NOTE_COLUMNS}"
        ))
        .bind(draft.title)
        .bind(draft.content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("Note {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn delete_note(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }
}

// These need a live Postgres: `DATABASE_URL=postgres://... cargo test -- --ignored`.
// `sqlx::test` creates a throwaway database per test and applies `./migrations`.
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[sqlx::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn lists_most_recently_updated_first(pool: PgPool) {
        let store = DbAdapter::new(pool);
        let a = store.create_note(NoteDraft::new("A", "")).await.unwrap();
        let b = store.create_note(NoteDraft::new("B", "")).await.unwrap();
        assert_eq!(store.list_notes().await.unwrap()[0].id, b.id);

        let updated = store.update_note(a.id, NoteDraft::new("A2", "x")).await.unwrap();
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.created_at, a.created_at);
        let ids: Vec<Uuid> = store.list_notes().await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[sqlx::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn update_never_moves_updated_at_backwards(pool: PgPool) {
        let store = DbAdapter::new(pool.clone());
        let note = store.create_note(NoteDraft::new("A", "")).await.unwrap();
        let ahead = Utc::now() + Duration::hours(1);
        sqlx::query("UPDATE notes SET updated_at = $1 WHERE id = $2")
            .bind(ahead)
            .bind(note.id)
            .execute(&pool)
            .await
            .unwrap();

        let updated = store.update_note(note.id, NoteDraft::new("B", "")).await.unwrap();
        assert!(updated.updated_at >= ahead - Duration::milliseconds(1));
    }

    #[sqlx::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn unknown_ids_are_not_found(pool: PgPool) {
        let store = DbAdapter::new(pool);
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.update_note(missing, NoteDraft::new("A", "")).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(store.delete_note(missing).await, Err(PortError::NotFound(_))));

        let note = store.create_note(NoteDraft::new("A", "")).await.unwrap();
        store.delete_note(note.id).await.unwrap();
        assert!(store.list_notes().await.unwrap().is_empty());
    }
}
