//! uxsynth Ingest: transcript text extraction, participant labels, storage.

pub mod file;
pub mod ingest;
pub mod participant;

pub use file::{extract_text, extract_text_from_bytes, FileType};
pub use ingest::{content_hash, transcripts_from_dir, ImportReport, Ingester};
pub use participant::parse_participant;
