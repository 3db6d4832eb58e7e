//! HTTP route handlers.

pub mod ai;
pub mod analysis;
pub mod deck;
pub mod notes;
pub mod stats;
pub mod studies;
pub mod transcripts;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use uxsynth_core::Error;
use uxsynth_store::Study;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(stats::routes())
        .merge(studies::routes())
        .merge(transcripts::routes())
        .merge(analysis::routes())
        .merge(deck::routes())
        .merge(notes::routes())
        .merge(ai::routes())
}

/// Error body `{"error": ..}` with a status derived from the error kind.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self(status, message.into())
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateContent(_) => StatusCode::CONFLICT,
            Error::Ingest(_) | Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::Http(_) | Error::Inference(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", e);
        }
        Self(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Look up a study or fail with 404.
pub(crate) fn require_study(state: &AppState, id: &str) -> ApiResult<Study> {
    state
        .store
        .get_study(id)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Study not found: {}", id)))
}
