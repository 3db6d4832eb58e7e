//! Research synthesis data model: transcripts in, insights out.
//!
//! Field names serialize in camelCase, which is the shape the report and
//! slide renderers consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a transcript belongs to, usually parsed from its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub number: u32,
    /// Display label, e.g. `Alice (User 1)`.
    pub label: String,
    /// True when the filename did not carry a name and a sequential
    /// fallback was used.
    #[serde(default)]
    pub inferred: bool,
}

impl Participant {
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        let name = name.into();
        let label = format!("{} (User {})", name, number);
        Self {
            name,
            number,
            label,
            inferred: false,
        }
    }

    /// Sequential fallback used when no name can be recovered.
    pub fn sequential(number: u32) -> Self {
        Self {
            name: format!("Participant {}", number),
            number,
            label: format!("Participant {}", number),
            inferred: true,
        }
    }
}

/// One participant's session text after extraction from its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub participant: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub text: String,
}

impl Transcript {
    pub fn new(participant: Participant, text: impl Into<String>) -> Self {
        Self {
            participant,
            source: None,
            text: text.into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A sentence quoted as evidence, with attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    pub text: String,
    pub participant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    /// Mentions capped at the participant count.
    pub frequency: usize,
    /// Raw keyword occurrences across the corpus.
    #[serde(default)]
    pub mentions: usize,
    pub category: String,
    #[serde(default)]
    pub examples: Vec<Excerpt>,
}

/// Three-tier pain point severity. Unknown values read as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" => Self::High,
            "low" | "minor" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPoint {
    /// Verbatim sentence fragment from a transcript.
    pub description: String,
    pub participants: Vec<String>,
    pub severity: Severity,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub text: String,
    pub participant: String,
    pub context: String,
    pub category: String,
}

/// Recommendation priority tier. Unknown values read as `P1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
    P0,
    P1,
    P2,
}

impl Priority {
    /// Priority for the n-th ranked theme.
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => Self::P0,
            1 => Self::P1,
            _ => Self::P2,
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "p0" | "high" | "critical" => Self::P0,
            "p2" | "low" => Self::P2,
            _ => Self::P1,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P0 => write!(f, "p0"),
            Self::P1 => write!(f, "p1"),
            Self::P2 => write!(f, "p2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub rationale: String,
    pub impact: String,
    /// Theme this addresses, by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_theme: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub participants: usize,
    #[serde(default)]
    pub responses: usize,
}

/// Which analyzer produced a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    #[default]
    Heuristic,
    Ai,
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

/// Complete output of one analysis run. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub pain_points: Vec<PainPoint>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub stats: AnalysisStats,
    #[serde(default)]
    pub source: AnalysisSource,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn high_severity_count(&self) -> usize {
        self.pain_points
            .iter()
            .filter(|p| p.severity == Severity::High)
            .count()
    }
}

/// Result of asking the pipeline to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// No transcript text was available; nothing was analyzed.
    NoInput,
    Complete(Box<AnalysisResult>),
}

impl AnalysisOutcome {
    pub fn is_no_input(&self) -> bool {
        matches!(self, Self::NoInput)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::NoInput => None,
            Self::Complete(result) => Some(result.as_ref()),
        }
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            Self::NoInput => None,
            Self::Complete(result) => Some(*result),
        }
    }
}
