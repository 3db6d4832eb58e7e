//! Quote selection: first-person and opinion sentences worth showing.

use std::collections::HashSet;

use uxsynth_core::{AnalysisConfig, Quote, Transcript};

use crate::dictionary::{categorize, OPINION_MARKERS};
use crate::sentences::split_sentences;

/// Context label for the first opinion marker in the sentence, if any.
pub fn opinion_context(lowered: &str) -> Option<&'static str> {
    OPINION_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, context)| *context)
}

/// Select up to `quotes_per_participant` quotes from each transcript, then
/// cap the combined list at `max_quotes`. Both limits keep discovery order.
pub fn extract_quotes(transcripts: &[Transcript], config: &AnalysisConfig) -> Vec<Quote> {
    let mut quotes = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for transcript in transcripts {
        let mut taken = 0;
        for sentence in split_sentences(&transcript.text) {
            if taken >= config.quotes_per_participant || quotes.len() >= config.max_quotes {
                break;
            }
            if !config.quote_length.admits(sentence) {
                continue;
            }
            let lowered = sentence.to_ascii_lowercase();
            let Some(context) = opinion_context(&lowered) else {
                continue;
            };
            if !seen.insert(sentence) {
                continue;
            }
            quotes.push(Quote {
                text: sentence.to_string(),
                participant: transcript.participant.label.clone(),
                context: context.to_string(),
                category: categorize(&lowered).to_string(),
            });
            taken += 1;
        }
    }

    quotes
}
