//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the notes REST API and the health check, and the
//! master definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use notes_core::domain::Note;
use notes_core::ports::PortError;
use notes_core::protocol::{HealthBody, MessageBody, NoteEnvelope, NotePayload};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_notes_handler,
        create_note_handler,
        update_note_handler,
        delete_note_handler,
        health_handler,
    ),
    components(
        schemas(Note, NotePayload, NoteEnvelope, MessageBody, HealthBody)
    ),
    tags(
        (name = "Notes API", description = "Create, list, update and delete text notes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Helpers
//=========================================================================================

/// Ids that do not parse cannot name a stored note, so they are reported as not found.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn read_payload(payload: Result<Json<NotePayload>, JsonRejection>) -> Result<NotePayload, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Logs store failures at the handler boundary; not-found is an expected outcome.
fn store_error(operation: &str, e: PortError) -> ApiError {
    match e {
        PortError::NotFound(_) => ApiError::NotFound,
        other => {
            error!("error in {}: {:?}", operation, other);
            ApiError::Port(other)
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every note, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/notes/",
    responses(
        (status = 200, description = "All notes", body = Vec<Note>),
        (status = 429, description = "Rate limit exceeded", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody)
    )
)]
pub async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state
        .store
        .list_notes()
        .await
        .map_err(|e| store_error("list_notes", e))?;
    Ok(Json(notes))
}

/// Create a note. Missing fields are stored as empty strings.
#[utoipa::path(
    post,
    path = "/api/notes/",
    request_body = NotePayload,
    responses(
        (status = 201, description = "Note created", body = NoteEnvelope),
        (status = 400, description = "Malformed request body", body = MessageBody),
        (status = 429, description = "Rate limit exceeded", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody)
    )
)]
pub async fn create_note_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = read_payload(payload)?.into_draft();
    let note = state
        .store
        .create_note(draft)
        .await
        .map_err(|e| store_error("create_note", e))?;
    info!(note_id = %note.id, "Note created");

    let response = NoteEnvelope {
        message: "Note created successfully".to_string(),
        note,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Replace the title and content of an existing note.
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    request_body = NotePayload,
    params(
        ("id" = String, Path, description = "The note id.")
    ),
    responses(
        (status = 200, description = "Note updated", body = NoteEnvelope),
        (status = 400, description = "Malformed request body", body = MessageBody),
        (status = 404, description = "Note not found", body = MessageBody),
        (status = 429, description = "Rate limit exceeded", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody)
    )
)]
pub async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> Result<Json<NoteEnvelope>, ApiError> {
    let id = parse_note_id(&id)?;
    let draft = read_payload(payload)?.into_draft();
    let note = state
        .store
        .update_note(id, draft)
        .await
        .map_err(|e| store_error("update_note", e))?;

    Ok(Json(NoteEnvelope {
        message: "Note updated successfully".to_string(),
        note,
    }))
}

/// Permanently delete a note.
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "The note id.")
    ),
    responses(
        (status = 200, description = "Note deleted", body = MessageBody),
        (status = 404, description = "Note not found", body = MessageBody),
        (status = 429, description = "Rate limit exceeded", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody)
    )
)]
pub async fn delete_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_note_id(&id)?;
    state
        .store
        .delete_note(id)
        .await
        .map_err(|e| store_error("delete_note", e))?;
    info!(note_id = %id, "Note deleted");

    Ok(Json(MessageBody::new("Note deleted successfully")))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is running", body = HealthBody)
    )
)]
pub async fn health_handler() -> Json<HealthBody> {
    Json(HealthBody {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
        timestamp: Utc::now(),
    })
}

/// Fallback for `/api/*` paths that match no route.
pub async fn api_not_found_handler() -> (StatusCode, Json<MessageBody>) {
    (StatusCode::NOT_FOUND, Json(MessageBody::new("Route not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_note_id("not-a-uuid"), Err(ApiError::NotFound)));
        assert!(parse_note_id(&Uuid::new_v4().to_string()).is_ok());
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/notes/"));
        assert!(paths.iter().any(|p| *p == "/api/notes/{id}"));
        assert!(paths.iter().any(|p| *p == "/health"));
    }
}
