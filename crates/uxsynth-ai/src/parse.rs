//! Normalise an LLM response into an [`AnalysisResult`].
//!
//! Models return almost-right JSON: fenced in Markdown, snake_case keys,
//! numbers as strings, severities the enum does not know. Everything that
//! can be repaired is; only a missing or unparseable object is an error.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uxsynth_core::{
    AnalysisConfig, AnalysisResult, AnalysisSource, AnalysisStats, Error, Excerpt, PainPoint,
    Priority, Quote, Recommendation, Result, Severity, Theme,
};

const GENERAL_CATEGORY: &str = "general";

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    summary: String,
    #[serde(alias = "key_findings")]
    key_findings: Vec<String>,
    themes: Vec<RawTheme>,
    #[serde(alias = "pain_points")]
    pain_points: Vec<RawPainPoint>,
    quotes: Vec<RawQuote>,
    recommendations: Vec<RawRecommendation>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTheme {
    name: String,
    frequency: Value,
    mentions: Value,
    category: String,
    examples: Vec<RawExcerpt>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExcerpt {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        participant: String,
    },
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPainPoint {
    #[serde(alias = "text")]
    description: String,
    participants: Vec<String>,
    severity: Value,
    category: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawQuote {
    text: String,
    participant: String,
    context: String,
    category: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawRecommendation {
    title: String,
    description: String,
    priority: Value,
    rationale: String,
    impact: String,
    #[serde(alias = "related_theme")]
    related_theme: Option<String>,
}

/// Slice the outermost JSON object out of a response, ignoring code
/// fences and any prose around it.
fn json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn label(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

fn category(raw: String) -> String {
    if raw.trim().is_empty() {
        GENERAL_CATEGORY.to_string()
    } else {
        raw.trim().to_string()
    }
}

/// Parse a provider response. `stats` comes from the transcripts that were
/// sent, not from the model.
pub fn parse_analysis(
    raw: &str,
    stats: AnalysisStats,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    let object = json_object(raw)
        .ok_or_else(|| Error::Inference("response contains no JSON object".into()))?;
    let parsed: RawAnalysis = serde_json::from_str(object)
        .map_err(|e| Error::Inference(format!("malformed analysis JSON: {}", e)))?;

    let mut themes: Vec<Theme> = parsed
        .themes
        .into_iter()
        .filter(|t| !t.name.trim().is_empty())
        .map(|t| {
            let mentions = count(&t.mentions);
            let frequency = count(&t.frequency).or(mentions).unwrap_or(0);
            Theme {
                name: t.name.trim().to_string(),
                frequency: frequency.min(stats.participants),
                mentions: mentions.unwrap_or(frequency),
                category: category(t.category),
                examples: t
                    .examples
                    .into_iter()
                    .map(|e| match e {
                        RawExcerpt::Text(text) => Excerpt {
                            text,
                            participant: String::new(),
                        },
                        RawExcerpt::Full { text, participant } => Excerpt { text, participant },
                    })
                    .filter(|e| !e.text.trim().is_empty())
                    .take(config.max_theme_examples)
                    .collect(),
            }
        })
        .collect();
    themes.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let pain_points: Vec<PainPoint> = parsed
        .pain_points
        .into_iter()
        .filter(|p| !p.description.trim().is_empty())
        .take(config.max_pain_points)
        .map(|p| PainPoint {
            description: p.description.trim().to_string(),
            participants: p.participants,
            severity: Severity::parse_lenient(&label(&p.severity)),
            category: category(p.category),
        })
        .collect();

    let quotes: Vec<Quote> = parsed
        .quotes
        .into_iter()
        .filter(|q| !q.text.trim().is_empty())
        .take(config.max_quotes)
        .map(|q| Quote {
            text: q.text.trim().to_string(),
            participant: q.participant,
            context: q.context,
            category: category(q.category),
        })
        .collect();

    let recommendations: Vec<Recommendation> = parsed
        .recommendations
        .into_iter()
        .filter(|r| !r.title.trim().is_empty())
        .map(|r| Recommendation {
            title: r.title.trim().to_string(),
            description: r.description,
            priority: Priority::parse_lenient(&label(&r.priority)),
            rationale: r.rationale,
            impact: r.impact,
            related_theme: r.related_theme.filter(|t| !t.trim().is_empty()),
        })
        .collect();

    let summary = if parsed.summary.trim().is_empty() {
        format!(
            "AI analysis of {} participants surfaced {} themes and {} pain points.",
            stats.participants,
            themes.len(),
            pain_points.len()
        )
    } else {
        parsed.summary.trim().to_string()
    };

    Ok(AnalysisResult {
        summary,
        key_findings: parsed.key_findings,
        themes,
        pain_points,
        quotes,
        recommendations,
        stats,
        source: AnalysisSource::Ai,
        generated_at: Utc::now(),
    })
}
