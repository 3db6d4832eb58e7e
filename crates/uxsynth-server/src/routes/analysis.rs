//! Running analyses and reading the stored insights.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, warn};
use uxsynth_core::{AnalysisOutcome, Error};
use uxsynth_store::StoredInsights;

use super::{require_study, ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/studies/{id}/analyze", post(analyze_heuristic))
        .route("/studies/{id}/analyze/ai", post(analyze_ai))
        .route("/studies/{id}/insights", get(get_insights))
}

/// POST /api/studies/{id}/analyze — run the heuristic pipeline.
///
/// A study without transcript text answers `{"status": "no_input"}` and
/// keeps whatever insights it already had.
async fn analyze_heuristic(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_study(&state, &id)?;
    let transcripts = state.store.load_transcripts(&id)?;

    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.analyzer.analyze(&transcripts))
        .await
        .map_err(|e| Error::Internal(format!("analysis task failed: {}", e)))?;

    match outcome {
        AnalysisOutcome::NoInput => {
            info!("Study {} has no transcript text; insights unchanged", id);
            Ok(Json(serde_json::json!({ "status": "no_input" })))
        }
        AnalysisOutcome::Complete(result) => {
            state.store.save_insights(&id, &result)?;
            Ok(Json(serde_json::json!({
                "status": "complete",
                "insights": result,
            })))
        }
    }
}

/// POST /api/studies/{id}/analyze/ai — analyze with the configured LLM.
///
/// Provider failures answer 502 and leave stored insights untouched.
async fn analyze_ai(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_study(&state, &id)?;
    let llm = state.llm_config.read().clone();
    if llm.resolve_provider().is_none() {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "No LLM provider configured",
        ));
    }

    let transcripts = state.store.load_transcripts(&id)?;
    if transcripts.iter().all(|t| t.text.trim().is_empty()) {
        return Ok(Json(serde_json::json!({ "status": "no_input" })));
    }

    let result = uxsynth_ai::analyze_with_llm(
        &state.http,
        &llm,
        &transcripts,
        &state.config.analysis,
    )
    .await
    .map_err(|e| {
        warn!("AI analysis of study {} failed: {}", id, e);
        ApiError::new(StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    state.store.save_insights(&id, &result)?;
    Ok(Json(serde_json::json!({
        "status": "complete",
        "insights": result,
    })))
}

/// GET /api/studies/{id}/insights — last successful analysis.
async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StoredInsights>> {
    require_study(&state, &id)?;
    state
        .store
        .load_insights(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Study {} not analyzed yet", id)))
}
