//! Study CRUD.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uxsynth_store::Study;

use super::{require_study, ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/studies", get(list_studies).post(create_study))
        .route("/studies/{id}", get(get_study).delete(delete_study))
}

#[derive(Debug, Deserialize)]
struct CreateStudy {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

async fn list_studies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Study>>> {
    Ok(Json(state.store.list_studies()?))
}

async fn create_study(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStudy>,
) -> ApiResult<(StatusCode, Json<Study>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Study name is required"));
    }
    let description = req.description.as_deref().filter(|d| !d.trim().is_empty());
    let study = state.store.create_study(name, description)?;
    Ok((StatusCode::CREATED, Json(study)))
}

async fn get_study(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Study>> {
    Ok(Json(require_study(&state, &id)?))
}

async fn delete_study(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_study(&id)? {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Study not found: {}", id),
        ));
    }
    Ok(Json(serde_json::json!({ "deleted": true, "id": id })))
}
