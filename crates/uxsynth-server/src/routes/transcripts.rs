//! Transcript upload and listing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};
use uxsynth_core::{Error, Participant};
use uxsynth_ingest::Ingester;
use uxsynth_store::TranscriptRecord;

use super::{require_study, ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/studies/{id}/transcripts",
            get(list_transcripts).post(add_transcript),
        )
        .route("/studies/{id}/transcripts/upload", post(upload_transcripts))
        .route(
            "/studies/{id}/transcripts/{transcript_id}",
            delete(delete_transcript),
        )
}

/// Pasted transcript text.
#[derive(Debug, Deserialize)]
struct AddTranscript {
    text: String,
    /// Explicit participant name; otherwise parsed from `filename`.
    #[serde(default)]
    participant: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

async fn list_transcripts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TranscriptRecord>>> {
    require_study(&state, &id)?;
    Ok(Json(state.store.list_transcripts(&id)?))
}

async fn add_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddTranscript>,
) -> ApiResult<(StatusCode, Json<TranscriptRecord>)> {
    require_study(&state, &id)?;
    if req.text.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Transcript text is empty"));
    }

    let ingester = Ingester::new(&state.store);
    let filename = req.filename.as_deref();
    let record = match req.participant.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            let number = ingester.next_sequence(&id)?;
            ingester.ingest_as(&id, filename, Participant::new(name, number), &req.text)?
        }
        _ => ingester.ingest_text(&id, filename, &req.text)?,
    };
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/studies/{id}/transcripts/upload — multipart transcript files.
///
/// Each file is kept under `uploads/{study}/` and ingested on the blocking
/// pool. Per-file failures are reported alongside the successes.
async fn upload_transcripts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    require_study(&state, &id)?;

    let upload_dir = state.config.data_paths.uploads.join(sanitize_filename(&id));
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(Error::from)?;

    let mut uploaded = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let filename = match field.file_name() {
            Some(name) => sanitize_filename(name),
            None => continue,
        };
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                errors.push(serde_json::json!({ "filename": filename, "error": e.to_string() }));
                continue;
            }
        };

        if let Err(e) = tokio::fs::write(upload_dir.join(&filename), &bytes).await {
            warn!("Could not keep upload {}: {}", filename, e);
        }

        match ingest_upload(state.clone(), id.clone(), filename.clone(), bytes).await {
            Ok(Some(record)) => uploaded.push(record),
            Ok(None) => skipped.push(filename),
            Err(e) => {
                errors.push(serde_json::json!({ "filename": filename, "error": e.to_string() }))
            }
        }
    }

    info!(
        "Upload to study {}: {} ingested, {} skipped, {} failed",
        id,
        uploaded.len(),
        skipped.len(),
        errors.len()
    );

    Ok(Json(serde_json::json!({
        "uploaded": uploaded,
        "skipped": skipped,
        "errors": errors,
    })))
}

/// PDF extraction and SQLite writes run off the async workers.
async fn ingest_upload(
    state: Arc<AppState>,
    study_id: String,
    filename: String,
    bytes: Bytes,
) -> uxsynth_core::Result<Option<TranscriptRecord>> {
    tokio::task::spawn_blocking(move || {
        Ingester::new(&state.store).ingest_bytes(&study_id, &filename, &bytes)
    })
    .await
    .map_err(|e| Error::Internal(format!("ingest task failed: {}", e)))?
}

async fn delete_transcript(
    State(state): State<Arc<AppState>>,
    Path((id, transcript_id)): Path<(String, i64)>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_transcript(&id, transcript_id)? {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Transcript not found: {}", transcript_id),
        ));
    }
    Ok(Json(serde_json::json!({ "deleted": true, "id": transcript_id })))
}

/// Keep the name, drop path separators and control characters.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Alice(User 1).txt"), "Alice(User 1).txt");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\tmp\\a?.md"), "a_.md");
        assert_eq!(sanitize_filename(".."), "upload");
    }
}
