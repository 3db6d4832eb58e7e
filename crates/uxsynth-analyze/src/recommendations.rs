//! Recommendation generation from ranked themes plus a small rule table.

use uxsynth_core::{AnalysisConfig, PainPoint, Priority, Recommendation, Severity, Theme};

use crate::dictionary::{TRUST_AND_VERIFICATION, WORKFLOW_EFFICIENCY};

pub const HIGH_PRIORITY_PAIN_POINTS_TITLE: &str = "Address High-Priority Pain Points";

/// Inputs every rule may inspect.
pub struct RuleContext<'a> {
    pub themes: &'a [Theme],
    pub pain_points: &'a [PainPoint],
    pub participants: usize,
}

impl RuleContext<'_> {
    fn has_theme(&self, name: &str) -> bool {
        self.themes.iter().any(|t| t.name == name)
    }

    fn high_severity_count(&self) -> usize {
        self.pain_points
            .iter()
            .filter(|p| p.severity == Severity::High)
            .count()
    }
}

/// A (condition, template) pair.
pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&RuleContext<'_>) -> bool,
    pub build: fn(&RuleContext<'_>) -> Recommendation,
}

/// Evaluated once per run, in order, appending each match.
pub static RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "high-severity-pain-points",
        applies: |ctx| ctx.high_severity_count() > 0,
        build: |ctx| {
            let count = ctx.high_severity_count();
            Recommendation {
                title: HIGH_PRIORITY_PAIN_POINTS_TITLE.to_string(),
                description: format!(
                    "Fix the {} high-severity pain point{} reported before expanding scope.",
                    count,
                    plural(count)
                ),
                priority: Priority::P0,
                rationale: "Participants described these issues as blocking or broken."
                    .to_string(),
                impact: "Removes the failures most likely to cause abandonment.".to_string(),
                related_theme: None,
            }
        },
    },
    RecommendationRule {
        name: "trust-and-verification",
        applies: |ctx| ctx.has_theme(TRUST_AND_VERIFICATION),
        build: |_| Recommendation {
            title: "Make Results Verifiable".to_string(),
            description: "Show sources, confidence and an easy path to double-check outputs."
                .to_string(),
            priority: Priority::P1,
            rationale: "Participants hesitated to rely on results they could not verify."
                .to_string(),
            impact: "Higher confidence and faster adoption of generated results.".to_string(),
            related_theme: Some(TRUST_AND_VERIFICATION.to_string()),
        },
    },
    RecommendationRule {
        name: "workflow-efficiency",
        applies: |ctx| ctx.has_theme(WORKFLOW_EFFICIENCY),
        build: |_| Recommendation {
            title: "Streamline Core Workflows".to_string(),
            description: "Cut steps from the most frequent tasks and remove manual repetition."
                .to_string(),
            priority: Priority::P1,
            rationale: "Participants repeatedly mentioned slow or step-heavy tasks.".to_string(),
            impact: "Less time per task and fewer drop-offs mid-flow.".to_string(),
            related_theme: Some(WORKFLOW_EFFICIENCY.to_string()),
        },
    },
];

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn theme_recommendation(theme: &Theme, rank: usize, participants: usize) -> Recommendation {
    Recommendation {
        title: format!("Improve {}", theme.name),
        description: format!(
            "{} of {} participant{} raised {} concerns. Prioritise changes in this area.",
            theme.frequency,
            participants,
            plural(participants),
            theme.name.to_lowercase()
        ),
        priority: Priority::for_rank(rank),
        rationale: format!(
            "Ranked #{} of recurring themes with {} keyword mention{}.",
            rank + 1,
            theme.mentions,
            plural(theme.mentions)
        ),
        impact: format!("Better {} for the participants who raised it.", theme.category),
        related_theme: Some(theme.name.clone()),
    }
}

/// Expand the top themes, then apply [`RULES`] in order.
pub fn generate_recommendations(
    themes: &[Theme],
    pain_points: &[PainPoint],
    participants: usize,
    config: &AnalysisConfig,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = themes
        .iter()
        .take(config.top_theme_recommendations)
        .enumerate()
        .map(|(rank, theme)| theme_recommendation(theme, rank, participants))
        .collect();

    let ctx = RuleContext {
        themes,
        pain_points,
        participants,
    };
    for rule in RULES {
        if (rule.applies)(&ctx) {
            tracing::debug!("Recommendation rule matched: {}", rule.name);
            recommendations.push((rule.build)(&ctx));
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(name: &str, frequency: usize) -> Theme {
        Theme {
            name: name.to_string(),
            frequency,
            mentions: frequency * 2,
            category: "general".to_string(),
            examples: Vec::new(),
        }
    }

    fn pain(severity: Severity) -> PainPoint {
        PainPoint {
            description: "Saving a draft failed twice in a row".to_string(),
            participants: vec!["Ana (User 1)".to_string()],
            severity,
            category: "general".to_string(),
        }
    }

    #[test]
    fn test_rank_priorities() {
        let config = AnalysisConfig::default();
        let themes = vec![theme("A", 4), theme("B", 3), theme("C", 2), theme("D", 1)];
        let recs = generate_recommendations(&themes, &[], 4, &config);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].priority, Priority::P0);
        assert_eq!(recs[1].priority, Priority::P1);
        assert_eq!(recs[2].priority, Priority::P2);
        assert_eq!(recs[0].related_theme.as_deref(), Some("A"));
    }

    #[test]
    fn test_high_priority_rule_iff_high_pain_point() {
        let config = AnalysisConfig::default();
        let has_rule = |recs: &[Recommendation]| {
            recs.iter().any(|r| r.title == HIGH_PRIORITY_PAIN_POINTS_TITLE)
        };

        let recs = generate_recommendations(&[], &[pain(Severity::Medium)], 1, &config);
        assert!(!has_rule(&recs));

        let recs = generate_recommendations(
            &[],
            &[pain(Severity::Low), pain(Severity::High)],
            1,
            &config,
        );
        assert!(has_rule(&recs));
        assert_eq!(recs[0].priority, Priority::P0);
    }

    #[test]
    fn test_named_theme_rules_append_in_order() {
        let config = AnalysisConfig::default();
        let themes = vec![theme(WORKFLOW_EFFICIENCY, 2), theme(TRUST_AND_VERIFICATION, 1)];
        let recs = generate_recommendations(&themes, &[pain(Severity::High)], 2, &config);
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Improve Workflow Efficiency",
                "Improve Trust & Verification",
                HIGH_PRIORITY_PAIN_POINTS_TITLE,
                "Make Results Verifiable",
                "Streamline Core Workflows",
            ]
        );
    }
}
