//! Static keyword tables driving every extractor.
//!
//! Matching is case-insensitive substring matching with no word boundaries,
//! so "time" also fires on "sometimes". Keywords are ASCII lowercase; text
//! is lowercased with `to_ascii_lowercase` so byte offsets survive.

/// A reportable theme and the stems that signal it.
#[derive(Debug, Clone, Copy)]
pub struct ThemeDefinition {
    pub name: &'static str,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

pub const WORKFLOW_EFFICIENCY: &str = "Workflow Efficiency";
pub const USER_EXPERIENCE: &str = "User Experience";
pub const TRUST_AND_VERIFICATION: &str = "Trust & Verification";

/// Declaration order is the tie-break order for equally frequent themes.
pub static THEMES: &[ThemeDefinition] = &[
    ThemeDefinition {
        name: WORKFLOW_EFFICIENCY,
        category: "efficiency",
        keywords: &[
            "workflow", "efficien", "slow", "fast", "quick", "time", "steps", "process",
            "manual", "repetitive",
        ],
    },
    ThemeDefinition {
        name: USER_EXPERIENCE,
        category: "usability",
        keywords: &[
            "confus", "easy", "intuitive", "difficult", "navigat", "interface", "layout",
            "clear", "understand", "button",
        ],
    },
    ThemeDefinition {
        name: TRUST_AND_VERIFICATION,
        category: "trust",
        keywords: &[
            "trust", "verif", "accura", "reliab", "confiden", "source", "double check",
            "correct",
        ],
    },
    ThemeDefinition {
        name: "Data & Integration",
        category: "integration",
        keywords: &["data", "integrat", "export", "import", "sync", "connect", "spreadsheet"],
    },
    ThemeDefinition {
        name: "Collaboration",
        category: "collaboration",
        keywords: &["team", "share", "sharing", "collaborat", "colleague", "together", "communicat"],
    },
    ThemeDefinition {
        name: "Learning Curve",
        category: "onboarding",
        keywords: &["learn", "training", "onboard", "tutorial", "documentation", "guide"],
    },
    ThemeDefinition {
        name: "Performance",
        category: "performance",
        keywords: &["loading", "lag", "crash", "freez", "speed", "waiting"],
    },
    ThemeDefinition {
        name: "Feature Requests",
        category: "features",
        keywords: &["i wish", "would like", "feature", "missing", "would be nice", "add a"],
    },
];

/// Stems that mark a sentence as describing a problem.
pub static PAIN_KEYWORDS: &[&str] = &[
    "problem", "issue", "frustrat", "difficult", "confus", "hard to", "annoying", "broken",
    "bug", "error", "slow", "cant", "can't", "cannot", "unable", "struggl", "fail", "stuck",
    "doesn't work",
];

/// Any of these upgrades a pain point to high severity.
pub static HIGH_SEVERITY_MARKERS: &[&str] = &[
    "frustrat", "broken", "critical", "major", "serious", "cant", "impossible",
];

/// Any of these (absent a high marker) downgrades to low severity.
pub static LOW_SEVERITY_MARKERS: &[&str] = &["minor", "small", "slight"];

/// First-person and opinion markers that make a sentence quotable, with
/// the context label the quote is filed under.
pub static OPINION_MARKERS: &[(&str, &str)] = &[
    ("i wish", "Feature request"),
    ("i would", "Feature request"),
    ("i want", "Feature request"),
    ("i think", "Opinion"),
    ("i feel", "Opinion"),
    ("i prefer", "Preference"),
    ("i like", "Positive feedback"),
    ("i love", "Positive feedback"),
    ("helpful", "Positive feedback"),
    ("useful", "Positive feedback"),
    ("i hate", "Pain point"),
    ("difficult", "Pain point"),
    ("frustrat", "Pain point"),
    ("confus", "Pain point"),
];

pub const GENERAL_CATEGORY: &str = "general";

/// Whether lowercased text contains any of the stems.
pub fn contains_any(lowered: &str, stems: &[&str]) -> bool {
    stems.iter().any(|s| lowered.contains(s))
}

/// Non-overlapping occurrences of `needle` in lowercased text.
pub fn count_occurrences(lowered: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    lowered.matches(needle).count()
}

/// Category of the first theme whose keywords appear in the text.
pub fn categorize(lowered: &str) -> &'static str {
    THEMES
        .iter()
        .find(|t| contains_any(lowered, t.keywords))
        .map(|t| t.category)
        .unwrap_or(GENERAL_CATEGORY)
}

pub fn find_theme(name: &str) -> Option<&'static ThemeDefinition> {
    THEMES.iter().find(|t| t.name == name)
}
