//! The analysis pipeline: transcripts in, one complete result out.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uxsynth_core::{
    AnalysisConfig, AnalysisOutcome, AnalysisResult, AnalysisSource, AnalysisStats, Transcript,
};

use crate::observer::AnalysisObserver;
use crate::pain_points::extract_pain_points;
use crate::quotes::extract_quotes;
use crate::recommendations::generate_recommendations;
use crate::sentences::split_sentences;
use crate::summary::{compose_summary, key_findings};
use crate::themes::extract_themes;

/// Runs the heuristic analysis. Holds only configuration and observers, so
/// one instance can serve any number of independent runs.
#[derive(Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
    observers: Vec<Arc<dyn AnalysisObserver>>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a transcript set.
    ///
    /// Returns [`AnalysisOutcome::NoInput`] when there is no non-blank text.
    /// Apart from `generated_at`, the result depends only on the input.
    pub fn analyze(&self, transcripts: &[Transcript]) -> AnalysisOutcome {
        // Only a set that actually contains blank transcripts is copied.
        let usable: Cow<'_, [Transcript]> = if transcripts.iter().any(is_blank) {
            Cow::Owned(
                transcripts
                    .iter()
                    .filter(|t| !is_blank(t))
                    .cloned()
                    .collect(),
            )
        } else {
            Cow::Borrowed(transcripts)
        };

        if usable.is_empty() {
            for observer in &self.observers {
                observer.on_skipped();
            }
            return AnalysisOutcome::NoInput;
        }

        for observer in &self.observers {
            observer.on_started(usable.len());
        }

        let result = run(&usable, &self.config);

        for observer in &self.observers {
            observer.on_completed(&result);
        }
        AnalysisOutcome::Complete(Box::new(result))
    }
}

fn is_blank(transcript: &Transcript) -> bool {
    transcript.text.trim().is_empty()
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn run(transcripts: &[Transcript], config: &AnalysisConfig) -> AnalysisResult {
    let stats = AnalysisStats {
        participants: transcripts.len(),
        responses: transcripts
            .iter()
            .map(|t| split_sentences(&t.text).count())
            .sum(),
    };

    let themes = extract_themes(transcripts, config);
    let pain_points = extract_pain_points(transcripts, config);
    let quotes = extract_quotes(transcripts, config);
    let recommendations =
        generate_recommendations(&themes, &pain_points, stats.participants, config);
    debug!(
        "Extracted {} themes, {} pain points, {} quotes",
        themes.len(),
        pain_points.len(),
        quotes.len()
    );

    AnalysisResult {
        summary: compose_summary(&stats, &themes, &pain_points, &quotes),
        key_findings: key_findings(&stats, &themes, &pain_points),
        themes,
        pain_points,
        quotes,
        recommendations,
        stats,
        source: AnalysisSource::Heuristic,
        generated_at: Utc::now(),
    }
}

/// Analyze with default configuration and no observers.
pub fn analyze(transcripts: &[Transcript]) -> AnalysisOutcome {
    Analyzer::default().analyze(transcripts)
}
