//! Participant labels recovered from transcript filenames.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use uxsynth_core::Participant;

/// `Alice(User 1)`, `Bob (Participant 2)`
static PAREN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?P<name>.+?)\s*\(\s*(?:user|participant)\s*#?\s*(?P<num>\d+)\s*\)")
        .unwrap()
});

/// `Carol - User 3`
static DASH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?P<name>.+?)\s+-\s+(?:user|participant)\s*#?\s*(?P<num>\d+)\b").unwrap()
});

/// `Dan_P4`
static SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?P<name>.+?)_p(?P<num>\d+)\s*$").unwrap());

/// Parse a participant from a filename. Never fails: unrecognised names
/// fall back to `Participant {sequence}` with `inferred` set.
pub fn parse_participant(filename: &str, sequence: u32) -> Participant {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    for re in [&*PAREN_RE, &*DASH_RE, &*SUFFIX_RE] {
        if let Some(caps) = re.captures(stem) {
            let name = clean_name(&caps["name"]);
            let number = caps["num"].parse::<u32>().ok();
            if let (false, Some(number)) = (name.is_empty(), number) {
                return Participant::new(name, number);
            }
        }
    }

    debug!("No participant label in {:?}, using sequence {}", filename, sequence);
    Participant::sequential(sequence)
}

fn clean_name(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesised_user() {
        let p = parse_participant("Alice(User 1).txt", 9);
        assert_eq!(p.name, "Alice");
        assert_eq!(p.number, 1);
        assert_eq!(p.label, "Alice (User 1)");
        assert!(!p.inferred);
    }

    #[test]
    fn test_participant_keyword_and_spacing() {
        let p = parse_participant("Bob Jones (participant 12).md", 1);
        assert_eq!(p.name, "Bob Jones");
        assert_eq!(p.number, 12);
    }

    #[test]
    fn test_dash_form() {
        let p = parse_participant("Carol - User 3.pdf", 1);
        assert_eq!(p.label, "Carol (User 3)");
    }

    #[test]
    fn test_suffix_form() {
        let p = parse_participant("Eve_Smith_P4.json", 1);
        assert_eq!(p.name, "Eve Smith");
        assert_eq!(p.number, 4);
    }

    #[test]
    fn test_fallback_is_sequential() {
        let p = parse_participant("session-notes.txt", 5);
        assert_eq!(p.label, "Participant 5");
        assert!(p.inferred);

        let p = parse_participant("(User 3).txt", 2);
        assert_eq!(p.label, "Participant 2");
    }
}
