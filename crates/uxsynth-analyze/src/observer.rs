//! Hooks for code that reacts to analysis runs (renderers, persistence).

use tracing::info;
use uxsynth_core::AnalysisResult;

/// Receives pipeline lifecycle events. All methods default to no-ops so
/// implementors only override what they render.
pub trait AnalysisObserver: Send + Sync {
    fn on_started(&self, _participants: usize) {}
    fn on_completed(&self, _result: &AnalysisResult) {}
    /// No transcript text was available.
    fn on_skipped(&self) {}
}

/// Logs each run through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AnalysisObserver for TracingObserver {
    fn on_started(&self, participants: usize) {
        info!("Analyzing {} transcript(s)", participants);
    }

    fn on_completed(&self, result: &AnalysisResult) {
        info!(
            "Analysis complete: themes={}, pain_points={}, quotes={}, recommendations={}",
            result.themes.len(),
            result.pain_points.len(),
            result.quotes.len(),
            result.recommendations.len()
        );
    }

    fn on_skipped(&self) {
        info!("Analysis skipped: no transcript text");
    }
}
