//! HTTP API over studies, transcripts and insights.

pub mod routes;
pub mod seed;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
