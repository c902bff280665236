//! crates/notes_client/src/api.rs
//!
//! The client's view of the notes REST API: a trait the controller depends on and
//! an HTTP implementation backed by `reqwest`.

use async_trait::async_trait;
use notes_core::domain::{Note, NoteDraft};
use notes_core::protocol::{MessageBody, NoteEnvelope, NotePayload};
use reqwest::Response;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<Note>>;
    async fn create(&self, draft: NoteDraft) -> ClientResult<Note>;
    async fn update(&self, id: Uuid, draft: NoteDraft) -> ClientResult<Note>;
    async fn delete(&self, id: Uuid) -> ClientResult<()>;
}

/// Talks to the API server over HTTP.
#[derive(Clone)]
pub struct HttpNotesApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotesApi {
    /// `base_url` is the notes collection, e.g. `http://localhost:5001/api/notes`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn note_url(&self, id: Uuid) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

/// Turns a non-success response into `ClientError::Server`, preferring the
/// server's `message` field over `fallback`.
async fn check(response: Response, fallback: &str) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<MessageBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| fallback.to_string());
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self) -> ClientResult<Vec<Note>> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let notes = check(response, "Failed to fetch notes").await?.json().await?;
        Ok(notes)
    }

    async fn create(&self, draft: NoteDraft) -> ClientResult<Note> {
        let response = self
            .client
            .post(format!("{}/", self.base_url))
            .json(&NotePayload::from(draft))
            .send()
            .await?;
        let envelope: NoteEnvelope = check(response, "Failed to save note").await?.json().await?;
        Ok(envelope.note)
    }

    async fn update(&self, id: Uuid, draft: NoteDraft) -> ClientResult<Note> {
        let response = self
            .client
            .put(self.note_url(id))
            .json(&NotePayload::from(draft))
            .send()
            .await?;
        let envelope: NoteEnvelope = check(response, "Failed to save note").await?.json().await?;
        Ok(envelope.note)
    }

    async fn delete(&self, id: Uuid) -> ClientResult<()> {
        let response = self.client.delete(self.note_url(id)).send().await?;
        check(response, "Failed to delete note").await?;
        Ok(())
    }
}

#[async_trait]
impl<T: NotesApi + ?Sized> NotesApi for std::sync::Arc<T> {
    async fn list(&self) -> ClientResult<Vec<Note>> {
        (**self).list().await
    }

    async fn create(&self, draft: NoteDraft) -> ClientResult<Note> {
        (**self).create(draft).await
    }

    async fn update(&self, id: Uuid, draft: NoteDraft) -> ClientResult<Note> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: Uuid) -> ClientResult<()> {
        (**self).delete(id).await
    }
}
