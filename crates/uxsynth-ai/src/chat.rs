//! Conversational questions over a study's stored insights.

use uxsynth_core::AnalysisResult;

use crate::types::ChatMessage;

/// Prior turns kept in the prompt.
pub const MAX_HISTORY: usize = 10;

fn insight_context(result: &AnalysisResult) -> String {
    let mut ctx = format!(
        "Summary: {}\nParticipants: {}\n",
        result.summary, result.stats.participants
    );
    if !result.themes.is_empty() {
        ctx.push_str("\nThemes:\n");
        for theme in &result.themes {
            ctx.push_str(&format!(
                "- {} ({} participants, {} mentions)\n",
                theme.name, theme.frequency, theme.mentions
            ));
        }
    }
    if !result.pain_points.is_empty() {
        ctx.push_str("\nPain points:\n");
        for pain in &result.pain_points {
            ctx.push_str(&format!(
                "- [{}] {} ({})\n",
                pain.severity,
                pain.description,
                pain.participants.join(", ")
            ));
        }
    }
    if !result.quotes.is_empty() {
        ctx.push_str("\nQuotes:\n");
        for quote in &result.quotes {
            ctx.push_str(&format!("- \"{}\" ({})\n", quote.text, quote.participant));
        }
    }
    if !result.recommendations.is_empty() {
        ctx.push_str("\nRecommendations:\n");
        for rec in &result.recommendations {
            ctx.push_str(&format!("- {}: {}\n", rec.priority, rec.title));
        }
    }
    ctx
}

/// Messages for one chat turn: system context, recent history, question.
pub fn build_chat_messages(
    study_name: &str,
    insights: Option<&AnalysisResult>,
    history: &[ChatMessage],
    message: &str,
) -> Vec<ChatMessage> {
    let context = match insights {
        Some(result) => insight_context(result),
        None => "This study has not been analyzed yet.\n".to_string(),
    };
    let system = format!(
        "You help a product team explore user research for the study \"{}\". \
         Answer from the findings below and say so when they do not cover the question.\n\n{}",
        study_name, context
    );

    let mut messages = vec![ChatMessage::system(system)];
    let skip = history.len().saturating_sub(MAX_HISTORY);
    messages.extend(
        history
            .iter()
            .skip(skip)
            .filter(|m| m.role == "user" || m.role == "assistant")
            .cloned(),
    );
    messages.push(ChatMessage::user(message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uxsynth_core::{AnalysisSource, AnalysisStats, Theme};

    #[test]
    fn test_context_and_history_window() {
        let result = AnalysisResult {
            summary: "People find setup slow.".into(),
            key_findings: Vec::new(),
            themes: vec![Theme {
                name: "Performance".into(),
                frequency: 2,
                mentions: 5,
                category: "technical".into(),
                examples: Vec::new(),
            }],
            pain_points: Vec::new(),
            quotes: Vec::new(),
            recommendations: Vec::new(),
            stats: AnalysisStats {
                participants: 2,
                responses: 8,
            },
            source: AnalysisSource::Heuristic,
            generated_at: Utc::now(),
        };
        let history: Vec<ChatMessage> = (0..15)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("q{}", i))
                } else {
                    ChatMessage::assistant(format!("a{}", i))
                }
            })
            .collect();

        let messages = build_chat_messages("Onboarding", Some(&result), &history, "Why slow?");
        assert_eq!(messages.len(), 1 + MAX_HISTORY + 1);
        assert!(messages[0].content.contains("\"Onboarding\""));
        assert!(messages[0].content.contains("- Performance (2 participants, 5 mentions)"));
        assert_eq!(messages[1].content, "a5");
        assert_eq!(messages.last().unwrap().content, "Why slow?");
    }

    #[test]
    fn test_without_insights() {
        let messages = build_chat_messages("S", None, &[ChatMessage::system("ignored")], "Hi");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("not been analyzed"));
    }
}
