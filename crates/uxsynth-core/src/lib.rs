//! uxsynth Core: data model, configuration, error types.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalysisConfig, DataPaths, UxsynthConfig};
pub use error::{Error, Result};
pub use types::*;
