//! LLM-backed analysis of a transcript set.

use reqwest::Client;
use tracing::info;
use uxsynth_analyze::split_sentences;
use uxsynth_core::{AnalysisConfig, AnalysisResult, AnalysisStats, Error, Result, Transcript};

use crate::config::LLMConfig;
use crate::parse::parse_analysis;
use crate::prompt::build_analysis_messages;
use crate::providers::complete;
use crate::types::GenerationParams;

/// Analyze transcripts with the configured provider.
///
/// Fails with [`Error::Config`] when no provider has a key, and with
/// [`Error::Inference`] when there is nothing to analyze or the response
/// cannot be parsed.
pub async fn analyze_with_llm(
    client: &Client,
    llm: &LLMConfig,
    transcripts: &[Transcript],
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    let usable: Vec<Transcript> = transcripts
        .iter()
        .filter(|t| !t.text.trim().is_empty())
        .cloned()
        .collect();
    if usable.is_empty() {
        return Err(Error::Inference("no transcript text to analyze".into()));
    }

    let target = llm
        .resolve_provider()
        .ok_or_else(|| Error::Config("No LLM provider configured".into()))?;

    info!(
        "Requesting AI analysis of {} transcripts from {} ({})",
        usable.len(),
        target.provider,
        target.model
    );
    let messages = build_analysis_messages(&usable);
    let raw = complete(client, &target, messages, GenerationParams::ANALYSIS).await?;

    let stats = AnalysisStats {
        participants: usable.len(),
        responses: usable
            .iter()
            .map(|t| split_sentences(&t.text).count())
            .sum(),
    };
    parse_analysis(&raw, stats, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uxsynth_core::Participant;

    #[tokio::test]
    async fn test_requires_text() {
        let client = Client::new();
        let err = analyze_with_llm(
            &client,
            &LLMConfig::default(),
            &[Transcript::new(Participant::new("Ana", 1), "  ")],
            &AnalysisConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn test_requires_provider() {
        let client = Client::new();
        let mut llm = LLMConfig::default();
        llm.preferred_provider = "groq".into();
        let err = analyze_with_llm(
            &client,
            &llm,
            &[Transcript::new(Participant::new("Ana", 1), "It was slow.")],
            &AnalysisConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
