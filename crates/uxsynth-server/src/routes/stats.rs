//! Health and storage statistics.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(get_stats))
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/stats — storage statistics and the active analysis limits.
async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let stats = state.store.get_stats()?;
    let llm_provider = state
        .llm_config
        .read()
        .resolve_provider()
        .map(|r| r.provider.to_string());

    Ok(Json(serde_json::json!({
        "studies": stats.studies,
        "transcripts": stats.transcripts,
        "analyzedStudies": stats.analyzed_studies,
        "notes": stats.notes,
        "dbSizeMb": stats.db_size_mb,
        "analysis": state.config.analysis,
        "llmProvider": llm_provider,
        "port": state.config.port,
    })))
}
