//! LLM configuration and insight chat.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio_stream::StreamExt;
use uxsynth_ai::chat::build_chat_messages;
use uxsynth_ai::providers::{self, StreamChunk};
use uxsynth_ai::{
    ChatRequest, GenerationParams, LLMConfigResponse, LLMConfigUpdate, LLMProvider, StreamEvent,
    TestKeyRequest,
};

use super::{require_study, ApiError, ApiResult};
use crate::state::AppState;

type SseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/config", get(get_config).put(update_config))
        .route("/ai/config/test", post(test_key))
        .route("/studies/{id}/chat", post(chat))
}

// ---------------------------------------------------------------
// Config
// ---------------------------------------------------------------

async fn get_config(State(state): State<Arc<AppState>>) -> Json<LLMConfigResponse> {
    Json(state.llm_config.read().to_response())
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LLMConfigUpdate>,
) -> ApiResult<Json<LLMConfigResponse>> {
    let mut config = state.llm_config.write();
    config.apply_update(&update)?;
    config.save().map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save config: {}", e),
        )
    })?;
    Ok(Json(config.to_response()))
}

async fn test_key(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestKeyRequest>,
) -> Json<serde_json::Value> {
    let Some(provider) = LLMProvider::parse(&req.provider) else {
        return Json(serde_json::json!({
            "success": false,
            "error": format!("Unknown provider: {}", req.provider),
        }));
    };
    match providers::test_api_key(&state.http, provider, &req.api_key).await {
        Ok(()) => Json(serde_json::json!({ "success": true })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

// ---------------------------------------------------------------
// Chat (SSE)
// ---------------------------------------------------------------

fn event(event: &StreamEvent) -> Event {
    match serde_json::to_string(event) {
        Ok(data) => Event::default().data(data),
        Err(e) => Event::default().data(format!("{{\"type\":\"error\",\"error\":\"{}\"}}", e)),
    }
}

/// POST /api/studies/{id}/chat — stream an answer grounded in the study's
/// stored insights.
async fn chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Sse<SseStream>> {
    let start = Instant::now();
    let study = require_study(&state, &id)?;

    let resolved = state.llm_config.read().resolve_provider();
    let Some(target) = resolved else {
        let error_stream: SseStream = Box::pin(async_stream::stream! {
            yield Ok::<_, Infallible>(event(&StreamEvent::Error {
                error: "No LLM provider configured".into(),
            }));
        });
        return Ok(Sse::new(error_stream));
    };

    let insights = state.store.load_insights(&id)?;
    let messages = build_chat_messages(
        &study.name,
        insights.as_ref().map(|i| &i.result),
        &req.conversation_history,
        &req.message,
    );
    let params = GenerationParams {
        temperature: req.temperature.unwrap_or(GenerationParams::CHAT.temperature),
        max_tokens: req.max_tokens.unwrap_or(GenerationParams::CHAT.max_tokens),
    };

    let mut llm_stream = providers::stream_llm(&state.http, &target, messages, params);
    let model = target.model.clone();

    let sse_stream: SseStream = Box::pin(async_stream::stream! {
        while let Some(chunk) = llm_stream.next().await {
            match chunk {
                StreamChunk::Token(content) => {
                    yield Ok::<_, Infallible>(event(&StreamEvent::Token { content }));
                }
                StreamChunk::Done { tokens_used } => {
                    yield Ok(event(&StreamEvent::Done {
                        model: model.clone(),
                        tokens_used,
                        duration: start.elapsed().as_millis() as u64,
                    }));
                    yield Ok(Event::default().data("[DONE]"));
                    return;
                }
                StreamChunk::Error(error) => {
                    yield Ok(event(&StreamEvent::Error { error }));
                    return;
                }
            }
        }
    });

    Ok(Sse::new(sse_stream))
}
