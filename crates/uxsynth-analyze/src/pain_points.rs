//! Pain point detection: sentences that mention a problem, verbatim.

use std::collections::HashMap;

use uxsynth_core::{AnalysisConfig, PainPoint, Severity, Transcript};

use crate::dictionary::{
    categorize, contains_any, HIGH_SEVERITY_MARKERS, LOW_SEVERITY_MARKERS, PAIN_KEYWORDS,
};
use crate::sentences::period_fragments;

/// Keyword override: any high marker wins, then any low marker, else medium.
pub fn classify_severity(text: &str) -> Severity {
    let lowered = text.to_ascii_lowercase();
    if contains_any(&lowered, HIGH_SEVERITY_MARKERS) {
        Severity::High
    } else if contains_any(&lowered, LOW_SEVERITY_MARKERS) {
        Severity::Low
    } else {
        Severity::Medium
    }
}

/// Extract pain points in discovery order (participant order, then text
/// order). Once the cap is reached no new entries are added, but later
/// repeats of a kept entry still record their participant.
///
/// Each candidate is a `.`-bounded fragment containing a pain keyword,
/// kept only if its length is inside the configured window. Identical text
/// from several participants collapses into one entry listing all of them.
pub fn extract_pain_points(transcripts: &[Transcript], config: &AnalysisConfig) -> Vec<PainPoint> {
    let mut pain_points: Vec<PainPoint> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for transcript in transcripts {
        let label = &transcript.participant.label;
        for fragment in period_fragments(&transcript.text) {
            let lowered = fragment.text.to_ascii_lowercase();
            if !contains_any(&lowered, PAIN_KEYWORDS) {
                continue;
            }
            if !config.pain_point_length.admits(fragment.text) {
                continue;
            }

            if let Some(&idx) = seen.get(fragment.text) {
                let existing = &mut pain_points[idx];
                if !existing.participants.contains(label) {
                    existing.participants.push(label.clone());
                }
                continue;
            }

            if pain_points.len() >= config.max_pain_points {
                continue;
            }

            seen.insert(fragment.text.to_string(), pain_points.len());
            pain_points.push(PainPoint {
                description: fragment.text.to_string(),
                participants: vec![label.clone()],
                severity: classify_severity(fragment.text),
                category: categorize(&lowered).to_string(),
            });
        }
    }

    pain_points
}

#[cfg(test)]
mod tests {
    use super::*;
    use uxsynth_core::Participant;

    fn transcript(name: &str, n: u32, text: &str) -> Transcript {
        Transcript::new(Participant::new(name, n), text)
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(classify_severity("The export is broken"), Severity::High);
        assert_eq!(classify_severity("A minor issue with colours"), Severity::Low);
        assert_eq!(classify_severity("There was an issue with colours"), Severity::Medium);
        // High wins over low.
        assert_eq!(classify_severity("A small but serious problem"), Severity::High);
    }

    #[test]
    fn test_high_severity_participant_and_silent_participant() {
        let config = AnalysisConfig::default();
        let transcripts = vec![
            transcript("Ana", 1, "The export button is broken on every report."),
            transcript("Ben", 2, "Everything went smoothly and I enjoyed it."),
        ];
        let points = extract_pain_points(&transcripts, &config);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].severity, Severity::High);
        assert_eq!(points[0].participants, vec!["Ana (User 1)".to_string()]);
    }

    #[test]
    fn test_short_fragment_dropped() {
        let config = AnalysisConfig::default();
        let transcripts = vec![transcript("Ana", 1, "It is broken.")];
        assert!(extract_pain_points(&transcripts, &config).is_empty());
    }

    #[test]
    fn test_duplicate_text_merges_participants() {
        let config = AnalysisConfig::default();
        let sentence = "Finding the settings page was really confusing.";
        let transcripts = vec![transcript("Ana", 1, sentence), transcript("Ben", 2, sentence)];
        let points = extract_pain_points(&transcripts, &config);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].participants, vec!["Ana (User 1)", "Ben (User 2)"]);
    }

    #[test]
    fn test_cap_and_traceability() {
        let config = AnalysisConfig::default();
        let text: String = (0..15)
            .map(|i| format!("Step {} had an annoying problem for me. ", i))
            .collect();
        let transcripts = vec![transcript("Ana", 1, &text)];
        let points = extract_pain_points(&transcripts, &config);
        assert_eq!(points.len(), config.max_pain_points);
        assert_eq!(points[0].description, "Step 0 had an annoying problem for me");
        for p in &points {
            assert!(text.contains(&p.description));
        }
    }

    #[test]
    fn test_duplicate_after_cap_still_merges() {
        let config = AnalysisConfig::default();
        let ana: String = (0..11)
            .map(|i| format!("Step {} had an annoying problem for me. ", i))
            .collect();
        let transcripts = vec![
            transcript("Ana", 1, &ana),
            transcript("Ben", 2, "Step 0 had an annoying problem for me."),
        ];
        let points = extract_pain_points(&transcripts, &config);
        assert_eq!(points.len(), config.max_pain_points);
        assert_eq!(points[0].participants, vec!["Ana (User 1)", "Ben (User 2)"]);
        assert!(points.iter().all(|p| p.description != "Step 10 had an annoying problem for me"));
    }

    #[test]
    fn test_length_window_upper_bound() {
        let mut config = AnalysisConfig::default();
        config.pain_point_length.max = 30;
        let transcripts = vec![transcript(
            "Ana",
            1,
            "This long sentence about a problem goes well beyond thirty characters.",
        )];
        assert!(extract_pain_points(&transcripts, &config).is_empty());
    }
}
