//! LLM-backed analysis and insight chat over external providers
//! (OpenAI/Anthropic/Groq).
//!
//! The heuristic pipeline is always available; this crate is the optional
//! second opinion. Provider responses are normalised into the same
//! [`uxsynth_core::AnalysisResult`] shape.

pub mod analysis;
pub mod chat;
pub mod config;
pub mod parse;
pub mod prompt;
pub mod providers;
pub mod types;

pub use analysis::analyze_with_llm;
pub use config::{LLMConfig, ResolvedProvider};
pub use types::*;
