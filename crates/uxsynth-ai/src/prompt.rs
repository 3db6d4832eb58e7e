//! Prompt for LLM-backed transcript analysis.

use uxsynth_core::Transcript;

use crate::types::ChatMessage;

/// Per-transcript character budget in the user prompt.
pub const MAX_TRANSCRIPT_CHARS: usize = 6000;

const SYSTEM_PROMPT: &str = "You are a senior UX researcher synthesizing user interview \
transcripts. Answer with a single JSON object and nothing else. Use this shape:
{
  \"summary\": string,
  \"keyFindings\": [string],
  \"themes\": [{\"name\": string, \"frequency\": number of participants, \"mentions\": number, \"category\": string, \"examples\": [{\"text\": string, \"participant\": string}]}],
  \"painPoints\": [{\"description\": string, \"participants\": [string], \"severity\": \"high\" | \"medium\" | \"low\", \"category\": string}],
  \"quotes\": [{\"text\": string, \"participant\": string, \"context\": string, \"category\": string}],
  \"recommendations\": [{\"title\": string, \"description\": string, \"priority\": \"p0\" | \"p1\" | \"p2\", \"rationale\": string, \"impact\": string, \"relatedTheme\": string}]
}
Quote participants verbatim, use their labels exactly as given, and only cite text that appears in the transcripts.";

/// Truncate to at most `max` chars on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// System and user messages asking for an `AnalysisResult`-shaped JSON object.
pub fn build_analysis_messages(transcripts: &[Transcript]) -> Vec<ChatMessage> {
    let mut user = format!(
        "Analyze these {} interview transcripts.\n",
        transcripts.len()
    );
    for transcript in transcripts {
        let text = transcript.text.trim();
        let clipped = truncate_chars(text, MAX_TRANSCRIPT_CHARS);
        user.push_str(&format!("\n### {}\n{}\n", transcript.participant.label, clipped));
        if clipped.len() < text.len() {
            user.push_str("[transcript truncated]\n");
        }
    }

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uxsynth_core::Participant;

    #[test]
    fn test_messages_carry_labels() {
        let transcripts = vec![
            Transcript::new(Participant::new("Ana", 1), "Setup was slow."),
            Transcript::new(Participant::sequential(2), "Search is confusing."),
        ];
        let messages = build_analysis_messages(&transcripts);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("### Ana (User 1)\nSetup was slow."));
        assert!(messages[1].content.contains("### Participant 2\n"));
        assert!(!messages[1].content.contains("truncated"));
    }

    #[test]
    fn test_long_transcript_truncated() {
        let long = "é".repeat(MAX_TRANSCRIPT_CHARS + 10);
        let messages =
            build_analysis_messages(&[Transcript::new(Participant::new("Ana", 1), long)]);
        assert!(messages[1].content.contains("[transcript truncated]"));
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
