//! Shared application state.

use std::sync::Arc;

use parking_lot::RwLock;
use uxsynth_ai::LLMConfig;
use uxsynth_analyze::{Analyzer, TracingObserver};
use uxsynth_core::UxsynthConfig;
use uxsynth_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: UxsynthConfig,
    pub store: SqliteStore,
    pub analyzer: Analyzer,
    pub llm_config: RwLock<LLMConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: UxsynthConfig, store: SqliteStore) -> Self {
        let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
        let analyzer =
            Analyzer::new(config.analysis.clone()).with_observer(Arc::new(TracingObserver));

        Self {
            config,
            store,
            analyzer,
            llm_config: RwLock::new(llm_config),
            http: reqwest::Client::new(),
        }
    }
}
