//! Slide deck export of a study's insights.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uxsynth_analyze::{build_deck, Deck};

use super::{require_study, ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/studies/{id}/deck", get(get_deck))
        .route("/studies/{id}/deck/markdown", get(get_deck_markdown))
}

fn study_deck(state: &AppState, id: &str) -> ApiResult<Deck> {
    let study = require_study(state, id)?;
    let insights = state.store.load_insights(id)?.ok_or_else(|| {
        ApiError::new(StatusCode::NOT_FOUND, format!("Study {} not analyzed yet", id))
    })?;
    Ok(build_deck(&study.name, &insights.result))
}

async fn get_deck(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deck>> {
    Ok(Json(study_deck(&state, &id)?))
}

async fn get_deck_markdown(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deck = study_deck(&state, &id)?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        deck.to_markdown(),
    ))
}
