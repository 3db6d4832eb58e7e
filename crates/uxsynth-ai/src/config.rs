//! LLM configuration persistence and provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use uxsynth_core::{Error, Result};

use crate::types::{LLMConfigResponse, LLMConfigUpdate, LLMProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

pub const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];
pub const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-20250514",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
];
pub const GROQ_MODELS: &[&str] = &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"];

/// Key and model for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Empty means the provider default.
    #[serde(default)]
    pub model: String,
}

impl ProviderSettings {
    fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// A provider ready to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
}

/// Stored LLM configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMConfig {
    /// `auto`, `openai`, `anthropic` or `groq`.
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub anthropic: ProviderSettings,
    #[serde(default)]
    pub groq: ProviderSettings,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            openai: ProviderSettings::default(),
            anthropic: ProviderSettings::default(),
            groq: ProviderSettings::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        for (settings, var) in [
            (&mut config.openai, "OPENAI_API_KEY"),
            (&mut config.anthropic, "ANTHROPIC_API_KEY"),
            (&mut config.groq, "GROQ_API_KEY"),
        ] {
            if settings.key().is_none() {
                settings.api_key = std::env::var(var).ok().filter(|k| !k.trim().is_empty());
            }
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    fn settings(&self, provider: LLMProvider) -> &ProviderSettings {
        match provider {
            LLMProvider::OpenAI => &self.openai,
            LLMProvider::Anthropic => &self.anthropic,
            LLMProvider::Groq => &self.groq,
        }
    }

    fn settings_mut(&mut self, provider: LLMProvider) -> &mut ProviderSettings {
        match provider {
            LLMProvider::OpenAI => &mut self.openai,
            LLMProvider::Anthropic => &mut self.anthropic,
            LLMProvider::Groq => &mut self.groq,
        }
    }

    /// Configured model, or the provider default.
    pub fn model(&self, provider: LLMProvider) -> String {
        let model = &self.settings(provider).model;
        if !model.trim().is_empty() {
            return model.clone();
        }
        match provider {
            LLMProvider::OpenAI => DEFAULT_OPENAI_MODEL,
            LLMProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            LLMProvider::Groq => DEFAULT_GROQ_MODEL,
        }
        .to_string()
    }

    /// Apply an update, merging with existing config.
    pub fn apply_update(&mut self, update: &LLMConfigUpdate) -> Result<()> {
        if let Some(p) = &update.preferred_provider {
            if p != "auto" && LLMProvider::parse(p).is_none() {
                return Err(Error::Config(format!("Unknown provider: {}", p)));
            }
            self.preferred_provider = p.to_ascii_lowercase();
        }
        for (provider, key, model) in [
            (LLMProvider::OpenAI, &update.openai_api_key, &update.openai_model),
            (LLMProvider::Anthropic, &update.anthropic_api_key, &update.anthropic_model),
            (LLMProvider::Groq, &update.groq_api_key, &update.groq_model),
        ] {
            let settings = self.settings_mut(provider);
            if let Some(k) = key {
                settings.api_key = Some(k.trim().to_string()).filter(|k| !k.is_empty());
            }
            if let Some(m) = model {
                settings.model = m.trim().to_string();
            }
        }
        Ok(())
    }

    /// Resolve which provider and model to use.
    ///
    /// An explicit preference only resolves to that provider; `auto` picks
    /// Anthropic, then Groq, then OpenAI, whichever has a key first.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        let candidates: Vec<LLMProvider> = match LLMProvider::parse(&self.preferred_provider) {
            Some(provider) => vec![provider],
            None if self.preferred_provider == "auto" => {
                vec![LLMProvider::Anthropic, LLMProvider::Groq, LLMProvider::OpenAI]
            }
            None => Vec::new(),
        };

        candidates.into_iter().find_map(|provider| {
            self.settings(provider).key().map(|key| ResolvedProvider {
                provider,
                model: self.model(provider),
                api_key: key.to_string(),
            })
        })
    }

    /// Build the public config response (no API keys exposed).
    pub fn to_response(&self) -> LLMConfigResponse {
        let resolved = self.resolve_provider();
        let available_models = match resolved.as_ref().map(|r| r.provider) {
            Some(LLMProvider::OpenAI) => OPENAI_MODELS,
            Some(LLMProvider::Anthropic) => ANTHROPIC_MODELS,
            Some(LLMProvider::Groq) => GROQ_MODELS,
            None => &[],
        };
        LLMConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            openai_configured: self.openai.key().is_some(),
            anthropic_configured: self.anthropic.key().is_some(),
            groq_configured: self.groq.key().is_some(),
            openai_model: self.model(LLMProvider::OpenAI),
            anthropic_model: self.model(LLMProvider::Anthropic),
            groq_model: self.model(LLMProvider::Groq),
            active_provider: resolved.map(|r| r.provider.to_string()),
            available_models: available_models.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_keys(openai: Option<&str>, anthropic: Option<&str>, groq: Option<&str>) -> LLMConfig {
        let key = |k: Option<&str>| ProviderSettings {
            api_key: k.map(str::to_string),
            model: String::new(),
        };
        LLMConfig {
            openai: key(openai),
            anthropic: key(anthropic),
            groq: key(groq),
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_resolution_order() {
        let config = with_keys(Some("o"), Some("a"), Some("g"));
        assert_eq!(config.resolve_provider().unwrap().provider, LLMProvider::Anthropic);

        let config = with_keys(Some("o"), None, Some("g"));
        assert_eq!(config.resolve_provider().unwrap().provider, LLMProvider::Groq);

        let config = with_keys(Some("o"), None, None);
        let resolved = config.resolve_provider().unwrap();
        assert_eq!(resolved.provider, LLMProvider::OpenAI);
        assert_eq!(resolved.model, DEFAULT_OPENAI_MODEL);

        assert!(with_keys(None, None, None).resolve_provider().is_none());
    }

    #[test]
    fn test_explicit_preference_without_key() {
        let mut config = with_keys(Some("o"), None, None);
        config.preferred_provider = "anthropic".into();
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_update_merges_and_clears() {
        let mut config = with_keys(Some("o"), None, None);
        config
            .apply_update(&LLMConfigUpdate {
                preferred_provider: Some("groq".into()),
                groq_api_key: Some("gk".into()),
                groq_model: Some("llama-3.1-8b-instant".into()),
                openai_api_key: Some("".into()),
                ..Default::default()
            })
            .unwrap();
        let resolved = config.resolve_provider().unwrap();
        assert_eq!(resolved.provider, LLMProvider::Groq);
        assert_eq!(resolved.model, "llama-3.1-8b-instant");
        assert!(!config.to_response().openai_configured);

        let err = config
            .apply_update(&LLMConfigUpdate {
                preferred_provider: Some("mystery".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_response_masks_keys() {
        let config = with_keys(None, Some("secret-key"), None);
        let json = serde_json::to_string(&config.to_response()).unwrap();
        assert!(!json.contains("secret-key"));
        assert!(json.contains("\"activeProvider\":\"anthropic\""));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm-config.json");
        let mut config = LLMConfig {
            config_path: path.clone(),
            ..Default::default()
        };
        config.preferred_provider = "openai".into();
        config.openai.model = "gpt-4o".into();
        config.save().unwrap();

        let loaded = LLMConfig::load(&path);
        assert_eq!(loaded.preferred_provider, "openai");
        assert_eq!(loaded.model(LLMProvider::OpenAI), "gpt-4o");
        assert_eq!(loaded.model(LLMProvider::Groq), DEFAULT_GROQ_MODEL);
    }
}
