//! Templated summary paragraph and key findings.

use uxsynth_core::{AnalysisStats, PainPoint, Quote, Severity, Theme};

const SUMMARY_TOP_THEMES: usize = 3;
const MAX_THEME_FINDINGS: usize = 5;

fn count_noun(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

/// One paragraph built from counts and the top theme names.
pub fn compose_summary(
    stats: &AnalysisStats,
    themes: &[Theme],
    pain_points: &[PainPoint],
    quotes: &[Quote],
) -> String {
    let mut summary = format!(
        "Analysis of {} surfaced {}, {} and {}.",
        count_noun(stats.participants, "participant", "participants"),
        count_noun(themes.len(), "recurring theme", "recurring themes"),
        count_noun(pain_points.len(), "pain point", "pain points"),
        count_noun(quotes.len(), "notable quote", "notable quotes"),
    );

    if themes.is_empty() {
        summary.push_str(" No theme was mentioned often enough to report.");
    } else {
        let top: Vec<&str> = themes
            .iter()
            .take(SUMMARY_TOP_THEMES)
            .map(|t| t.name.as_str())
            .collect();
        summary.push_str(&format!(" The most prominent themes were {}.", top.join(", ")));
    }

    summary
}

/// Ordered finding lines: one per leading theme, then severity totals.
pub fn key_findings(stats: &AnalysisStats, themes: &[Theme], pain_points: &[PainPoint]) -> Vec<String> {
    let mut findings: Vec<String> = themes
        .iter()
        .take(MAX_THEME_FINDINGS)
        .map(|t| {
            format!(
                "{} came up for {} of {} participants ({} mentions)",
                t.name, t.frequency, stats.participants, t.mentions
            )
        })
        .collect();

    for severity in [Severity::High, Severity::Medium, Severity::Low] {
        let count = pain_points.iter().filter(|p| p.severity == severity).count();
        if count > 0 {
            findings.push(format!(
                "{} {}-severity {} reported",
                count,
                severity,
                if count == 1 { "pain point" } else { "pain points" }
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(name: &str) -> Theme {
        Theme {
            name: name.to_string(),
            frequency: 1,
            mentions: 3,
            category: "general".to_string(),
            examples: Vec::new(),
        }
    }

    #[test]
    fn test_summary_lists_top_three() {
        let stats = AnalysisStats {
            participants: 2,
            responses: 10,
        };
        let themes = vec![theme("A"), theme("B"), theme("C"), theme("D")];
        let summary = compose_summary(&stats, &themes, &[], &[]);
        assert_eq!(
            summary,
            "Analysis of 2 participants surfaced 4 recurring themes, 0 pain points and \
             0 notable quotes. The most prominent themes were A, B, C."
        );
    }

    #[test]
    fn test_summary_without_themes() {
        let stats = AnalysisStats {
            participants: 1,
            responses: 1,
        };
        let summary = compose_summary(&stats, &[], &[], &[]);
        assert!(summary.starts_with("Analysis of 1 participant surfaced"));
        assert!(summary.ends_with("often enough to report."));
    }

    #[test]
    fn test_key_findings_order() {
        let stats = AnalysisStats {
            participants: 1,
            responses: 1,
        };
        let pain = |severity| PainPoint {
            description: "x".repeat(25),
            participants: Vec::new(),
            severity,
            category: "general".to_string(),
        };
        let findings = key_findings(
            &stats,
            &[theme("A")],
            &[pain(Severity::Low), pain(Severity::High), pain(Severity::Low)],
        );
        assert_eq!(
            findings,
            vec![
                "A came up for 1 of 1 participants (3 mentions)",
                "1 high-severity pain point reported",
                "2 low-severity pain points reported",
            ]
        );
    }
}
