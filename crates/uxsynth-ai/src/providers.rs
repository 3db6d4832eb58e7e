//! External LLM provider calls.
//!
//! Every provider streams over SSE. OpenAI and Groq share one event format;
//! Anthropic has its own. [`complete`] drains a stream into a single string
//! for callers that need the whole response (analysis).

use std::pin::Pin;

use futures::Stream;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, error};
use uxsynth_core::{Error, Result};

use crate::config::ResolvedProvider;
use crate::types::{ChatMessage, GenerationParams, LLMProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// What one SSE `data:` payload means.
#[derive(Debug, PartialEq, Eq)]
enum Delta {
    Token(String),
    Stop,
    Error(String),
    Skip,
}

/// Stream tokens from the resolved provider.
pub fn stream_llm(
    client: &Client,
    target: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: GenerationParams,
) -> BoxedStream {
    debug!(
        "Streaming from {} with model {} ({} messages)",
        target.provider,
        target.model,
        messages.len()
    );
    match target.provider {
        LLMProvider::OpenAI | LLMProvider::Groq => {
            let url = if target.provider == LLMProvider::OpenAI {
                OPENAI_URL
            } else {
                GROQ_URL
            };
            let body = json!({
                "model": target.model,
                "messages": messages,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            let request = client
                .post(url)
                .bearer_auth(&target.api_key)
                .json(&body);
            Box::pin(sse_stream(request, openai_delta))
        }
        LLMProvider::Anthropic => {
            let system: Vec<&str> = messages
                .iter()
                .filter(|m| m.role == "system")
                .map(|m| m.content.as_str())
                .collect();
            let conversation: Vec<&ChatMessage> =
                messages.iter().filter(|m| m.role != "system").collect();

            let mut body = json!({
                "model": target.model,
                "messages": conversation,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            if !system.is_empty() {
                body["system"] = json!(system.join("\n\n"));
            }
            let request = client
                .post(ANTHROPIC_URL)
                .header("x-api-key", &target.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body);
            Box::pin(sse_stream(request, anthropic_delta))
        }
    }
}

/// Run a streaming call to completion and return the full text.
pub async fn complete(
    client: &Client,
    target: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: GenerationParams,
) -> Result<String> {
    let mut stream = stream_llm(client, target, messages, params);
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(token) => text.push_str(&token),
            StreamChunk::Done { tokens_used } => {
                debug!("{} completion finished after {} chunks", target.provider, tokens_used);
                break;
            }
            StreamChunk::Error(e) => return Err(Error::Http(e)),
        }
    }
    if text.trim().is_empty() {
        return Err(Error::Inference(format!("{} returned no content", target.provider)));
    }
    Ok(text)
}

fn sse_stream(
    request: RequestBuilder,
    parse: fn(&str) -> Delta,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };
            buffer.extend_from_slice(&bytes);

            for data in drain_data_lines(&mut buffer) {
                match parse(&data) {
                    Delta::Token(text) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    Delta::Stop => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    Delta::Error(msg) => {
                        error!("Provider stream error: {}", msg);
                        yield StreamChunk::Error(msg);
                        return;
                    }
                    Delta::Skip => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Remove complete lines from `buffer`, returning the `data:` payloads.
/// A trailing partial line stays buffered as raw bytes, so a multibyte
/// character split across network chunks is decoded only once whole.
fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=line_end).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();
        if let Some(data) = line.strip_prefix("data:") {
            out.push(data.trim_start().to_string());
        }
    }
    out
}

fn openai_delta(data: &str) -> Delta {
    if data.trim() == "[DONE]" {
        return Delta::Stop;
    }
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) else {
        return Delta::Skip;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return Delta::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => Delta::Token(content.to_string()),
        _ => Delta::Skip,
    }
}

fn anthropic_delta(data: &str) -> Delta {
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) else {
        return Delta::Skip;
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => Delta::Token(text.to_string()),
            _ => Delta::Skip,
        },
        Some("message_stop") => Delta::Stop,
        Some("error") => Delta::Error(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => Delta::Skip,
    }
}

/// Test an API key by making a minimal request.
pub async fn test_api_key(client: &Client, provider: LLMProvider, api_key: &str) -> Result<()> {
    let request = match provider {
        LLMProvider::OpenAI => client
            .get("https://api.openai.com/v1/models")
            .bearer_auth(api_key),
        LLMProvider::Groq => client
            .get("https://api.groq.com/openai/v1/models")
            .bearer_auth(api_key),
        LLMProvider::Anthropic => client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": "claude-3-5-haiku-20241022",
                "max_tokens": 1,
                "messages": [{"role": "user", "content": "Hi"}],
            })),
    };

    let resp = request
        .send()
        .await
        .map_err(|e| Error::Http(e.to_string()))?;
    let status = resp.status();
    // Anthropic answers 400 for a valid key with a model or quota problem
    if status.is_success() || (provider == LLMProvider::Anthropic && status.as_u16() == 400) {
        Ok(())
    } else {
        Err(Error::Http(format!("API returned status {}", status)))
    }
}
