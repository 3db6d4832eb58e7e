//! Slide deck assembly from an analysis result.

use serde::Serialize;
use uxsynth_core::AnalysisResult;

const MAX_BULLETS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Title,
    Summary,
    KeyFindings,
    Themes,
    PainPoints,
    Quotes,
    Recommendations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub kind: SlideKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub bullets: Vec<String>,
}

impl Slide {
    fn new(kind: SlideKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: None,
            bullets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck {
    pub title: String,
    pub slides: Vec<Slide>,
}

/// Build the presentation. Title and summary slides are always present;
/// sections with nothing to show are left out.
pub fn build_deck(study_name: &str, result: &AnalysisResult) -> Deck {
    let mut slides = Vec::new();

    let mut title = Slide::new(SlideKind::Title, study_name);
    title.body = Some(format!(
        "{} participants, generated {}",
        result.stats.participants,
        result.generated_at.format("%Y-%m-%d")
    ));
    slides.push(title);

    let mut summary = Slide::new(SlideKind::Summary, "Summary");
    summary.body = Some(result.summary.clone());
    slides.push(summary);

    push_section(
        &mut slides,
        SlideKind::KeyFindings,
        "Key Findings",
        result.key_findings.iter().cloned(),
    );
    push_section(
        &mut slides,
        SlideKind::Themes,
        "Themes",
        result.themes.iter().map(|t| {
            format!("{} ({}/{} participants)", t.name, t.frequency, result.stats.participants)
        }),
    );
    push_section(
        &mut slides,
        SlideKind::PainPoints,
        "Pain Points",
        result
            .pain_points
            .iter()
            .map(|p| format!("[{}] {}", p.severity, p.description)),
    );
    push_section(
        &mut slides,
        SlideKind::Quotes,
        "What Participants Said",
        result
            .quotes
            .iter()
            .map(|q| format!("\"{}\" ({})", q.text, q.participant)),
    );
    push_section(
        &mut slides,
        SlideKind::Recommendations,
        "Recommendations",
        result
            .recommendations
            .iter()
            .map(|r| format!("{}: {}", r.priority.to_string().to_uppercase(), r.title)),
    );

    Deck {
        title: study_name.to_string(),
        slides,
    }
}

fn push_section(
    slides: &mut Vec<Slide>,
    kind: SlideKind,
    title: &str,
    bullets: impl Iterator<Item = String>,
) {
    let bullets: Vec<String> = bullets.take(MAX_BULLETS).collect();
    if bullets.is_empty() {
        return;
    }
    let mut slide = Slide::new(kind, title);
    slide.bullets = bullets;
    slides.push(slide);
}

impl Deck {
    /// Render as Markdown slides separated by `---`.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (i, slide) in self.slides.iter().enumerate() {
            if i > 0 {
                out.push_str("\n---\n\n");
            }
            let heading = if slide.kind == SlideKind::Title { "#" } else { "##" };
            out.push_str(&format!("{} {}\n", heading, slide.title));
            if let Some(body) = &slide.body {
                out.push_str(&format!("\n{}\n", body));
            }
            if !slide.bullets.is_empty() {
                out.push('\n');
                for bullet in &slide.bullets {
                    out.push_str(&format!("- {}\n", bullet));
                }
            }
        }
        out
    }
}
