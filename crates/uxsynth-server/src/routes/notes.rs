//! Sticky notes on a study board.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use uxsynth_store::{NewNote, Note, NoteUpdate};

use super::{require_study, ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/studies/{id}/notes", get(list_notes).post(add_note))
        .route(
            "/studies/{id}/notes/{note_id}",
            put(update_note).delete(delete_note),
        )
}

async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Note>>> {
    require_study(&state, &id)?;
    Ok(Json(state.store.list_notes(&id)?))
}

async fn add_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(note): Json<NewNote>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    if note.body.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Note body is empty"));
    }
    let note = state.store.add_note(&id, note)?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(state): State<Arc<AppState>>,
    Path((id, note_id)): Path<(String, String)>,
    Json(update): Json<NoteUpdate>,
) -> ApiResult<Json<Note>> {
    state
        .store
        .update_note(&id, &note_id, &update)?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Note not found: {}", note_id)))
}

async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path((id, note_id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_note(&id, &note_id)? {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Note not found: {}", note_id),
        ));
    }
    Ok(Json(serde_json::json!({ "deleted": true, "id": note_id })))
}
