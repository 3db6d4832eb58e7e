//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Paths to all uxsynth data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
    /// Raw uploaded transcript files (`data/uploads/`).
    pub uploads: PathBuf,
    /// Pre-seeded transcripts imported into the demo study (`data/seed/`).
    pub seed: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            uploads: root.join("uploads"),
            seed: root.join("seed"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.db)?;
        std::fs::create_dir_all(&self.uploads)?;
        Ok(())
    }
}

/// Inclusive character-length window used to drop sentence fragments that
/// are too short to carry meaning or too long to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthWindow {
    pub min: usize,
    pub max: usize,
}

impl LengthWindow {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Whether `text` (measured in chars) falls inside the window.
    pub fn admits(&self, text: &str) -> bool {
        let len = text.chars().count();
        len >= self.min && len <= self.max
    }
}

/// A theme is kept only when its keyword mentions exceed this count.
pub const DEFAULT_THEME_MENTION_THRESHOLD: usize = 2;
pub const DEFAULT_MAX_THEME_EXAMPLES: usize = 3;
pub const DEFAULT_PAIN_POINT_LENGTH: LengthWindow = LengthWindow::new(20, 250);
pub const DEFAULT_MAX_PAIN_POINTS: usize = 10;
pub const DEFAULT_QUOTE_LENGTH: LengthWindow = LengthWindow::new(20, 200);
pub const DEFAULT_QUOTES_PER_PARTICIPANT: usize = 2;
pub const DEFAULT_MAX_QUOTES: usize = 8;
pub const DEFAULT_TOP_THEME_RECOMMENDATIONS: usize = 3;

/// Tunables for the heuristic analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub theme_mention_threshold: usize,
    pub max_theme_examples: usize,
    pub pain_point_length: LengthWindow,
    pub max_pain_points: usize,
    pub quote_length: LengthWindow,
    pub quotes_per_participant: usize,
    pub max_quotes: usize,
    pub top_theme_recommendations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            theme_mention_threshold: DEFAULT_THEME_MENTION_THRESHOLD,
            max_theme_examples: DEFAULT_MAX_THEME_EXAMPLES,
            pain_point_length: DEFAULT_PAIN_POINT_LENGTH,
            max_pain_points: DEFAULT_MAX_PAIN_POINTS,
            quote_length: DEFAULT_QUOTE_LENGTH,
            quotes_per_participant: DEFAULT_QUOTES_PER_PARTICIPANT,
            max_quotes: DEFAULT_MAX_QUOTES,
            top_theme_recommendations: DEFAULT_TOP_THEME_RECOMMENDATIONS,
        }
    }
}

impl AnalysisConfig {
    /// Defaults with `UXSYNTH_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_usize("UXSYNTH_THEME_THRESHOLD") {
            config.theme_mention_threshold = v;
        }
        if let Some(v) = env_usize("UXSYNTH_MAX_PAIN_POINTS") {
            config.max_pain_points = v;
        }
        if let Some(v) = env_usize("UXSYNTH_MAX_QUOTES") {
            config.max_quotes = v;
        }
        if let Some(v) = env_usize("UXSYNTH_QUOTES_PER_PARTICIPANT") {
            config.quotes_per_participant = v;
        }
        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a non-negative integer", key, raw);
            None
        }
    }
}

/// Top-level uxsynth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UxsynthConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Heuristic analysis policy.
    pub analysis: AnalysisConfig,
}

impl UxsynthConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3010);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            analysis: AnalysisConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_created() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path()).unwrap();
        assert!(paths.db.is_dir());
        assert!(paths.uploads.is_dir());
        assert_eq!(paths.llm_config_file, dir.path().join("llm-config.json"));
    }

    #[test]
    fn test_length_window_counts_chars() {
        let window = LengthWindow::new(3, 4);
        assert!(!window.admits("ab"));
        assert!(window.admits("abc"));
        assert!(window.admits("äöüß"));
        assert!(!window.admits("abcde"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"maxQuotes": 3}"#).unwrap();
        assert_eq!(config.max_quotes, 3);
        assert_eq!(config.max_pain_points, DEFAULT_MAX_PAIN_POINTS);
        assert_eq!(config.pain_point_length, DEFAULT_PAIN_POINT_LENGTH);
    }
}
