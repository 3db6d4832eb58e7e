//! Keyword-frequency theme extraction.

use uxsynth_core::{AnalysisConfig, Excerpt, Theme, Transcript};

use crate::dictionary::{self, ThemeDefinition, THEMES};
use crate::sentences::split_sentences;

/// Find recurring themes across all transcripts.
///
/// A theme's mentions are the total keyword occurrences in the combined
/// corpus. Themes at or below the configured threshold are dropped. The
/// reported frequency is capped at the participant count. Output is ordered
/// by frequency, highest first; equal frequencies keep dictionary order.
pub fn extract_themes(transcripts: &[Transcript], config: &AnalysisConfig) -> Vec<Theme> {
    let corpus = transcripts
        .iter()
        .map(|t| t.text.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("\n");
    if corpus.trim().is_empty() {
        return Vec::new();
    }

    let participants = transcripts.len();
    let mut themes: Vec<Theme> = THEMES
        .iter()
        .filter_map(|def| {
            let mentions: usize = def
                .keywords
                .iter()
                .map(|kw| dictionary::count_occurrences(&corpus, kw))
                .sum();
            if mentions <= config.theme_mention_threshold {
                return None;
            }
            Some(Theme {
                name: def.name.to_string(),
                frequency: mentions.min(participants),
                mentions,
                category: def.category.to_string(),
                examples: collect_examples(def, transcripts, config.max_theme_examples),
            })
        })
        .collect();

    // Stable: ties stay in declaration order.
    themes.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    themes
}

fn collect_examples(
    def: &ThemeDefinition,
    transcripts: &[Transcript],
    limit: usize,
) -> Vec<Excerpt> {
    let mut examples = Vec::new();
    for transcript in transcripts {
        for sentence in split_sentences(&transcript.text) {
            if examples.len() >= limit {
                return examples;
            }
            if dictionary::contains_any(&sentence.to_ascii_lowercase(), def.keywords) {
                examples.push(Excerpt {
                    text: sentence.to_string(),
                    participant: transcript.participant.label.clone(),
                });
            }
        }
    }
    examples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{USER_EXPERIENCE, WORKFLOW_EFFICIENCY};
    use uxsynth_core::Participant;

    fn transcript(name: &str, n: u32, text: &str) -> Transcript {
        Transcript::new(Participant::new(name, n), text)
    }

    #[test]
    fn test_equal_frequencies_keep_table_order() {
        let mut config = AnalysisConfig::default();
        config.theme_mention_threshold = 0;
        // One participant caps every theme at frequency 1.
        let transcripts = vec![transcript("A", 1, "Can I trust it? The layout is so slow.")];
        let names: Vec<String> = extract_themes(&transcripts, &config)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec![WORKFLOW_EFFICIENCY, USER_EXPERIENCE, "Trust & Verification"]
        );
    }

    #[test]
    fn test_empty_corpus() {
        let config = AnalysisConfig::default();
        assert!(extract_themes(&[], &config).is_empty());
        assert!(extract_themes(&[transcript("A", 1, "   ")], &config).is_empty());
    }

    #[test]
    fn test_threshold_and_cap() {
        let config = AnalysisConfig::default();
        let transcripts = vec![transcript(
            "Alice",
            1,
            "The workflow is slow. Every workflow step is slow. It wastes time.",
        )];
        let themes = extract_themes(&transcripts, &config);
        let workflow = themes.iter().find(|t| t.name == WORKFLOW_EFFICIENCY).unwrap();
        assert!(workflow.mentions > 2);
        assert_eq!(workflow.frequency, 1);
        assert!(workflow.examples.len() <= 3);
        assert_eq!(workflow.examples[0].participant, "Alice (User 1)");
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let text = "It was confusing. Really confusing.";
        let mut config = AnalysisConfig::default();
        config.theme_mention_threshold = 2;
        assert!(extract_themes(&[transcript("A", 1, text)], &config).is_empty());

        config.theme_mention_threshold = 0;
        let themes = extract_themes(&[transcript("A", 1, text)], &config);
        assert_eq!(themes[0].name, USER_EXPERIENCE);
        assert_eq!(themes[0].mentions, 2);
    }

    #[test]
    fn test_sorted_by_frequency() {
        let mut config = AnalysisConfig::default();
        config.theme_mention_threshold = 0;
        let transcripts = vec![
            transcript("A", 1, "The layout is confusing."),
            transcript("B", 2, "I could not understand the layout."),
            transcript("C", 3, "Too slow, and the team cannot share reports."),
        ];
        let themes = extract_themes(&transcripts, &config);
        let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![USER_EXPERIENCE, "Collaboration", WORKFLOW_EFFICIENCY]);
        assert_eq!(themes[0].frequency, 3);
        assert_eq!(themes[0].mentions, 4);
        assert!(themes.windows(2).all(|w| w[0].frequency >= w[1].frequency));
        for t in &themes {
            assert!(t.frequency <= transcripts.len());
        }
    }
}
