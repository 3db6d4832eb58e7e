//! uxsynth Store: SQLite persistence for studies, transcripts, insights and notes.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
