//! Row types returned by the store.

use serde::{Deserialize, Serialize};
use uxsynth_core::{AnalysisResult, AnalysisSource, Participant, Transcript};

/// A research study grouping transcripts, insights and notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    pub transcript_count: i64,
    pub analyzed: bool,
}

/// A stored transcript row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub id: i64,
    pub study_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub participant: Participant,
    pub text: String,
    pub content_hash: String,
    pub created_at: i64,
}

impl TranscriptRecord {
    pub fn to_transcript(&self) -> Transcript {
        Transcript {
            participant: self.participant.clone(),
            source: self.filename.clone(),
            text: self.text.clone(),
        }
    }
}

/// Input for [`crate::SqliteStore::add_transcript`].
#[derive(Debug, Clone)]
pub struct NewTranscript {
    pub filename: Option<String>,
    pub participant: Participant,
    pub text: String,
    pub content_hash: String,
}

/// The last-known-good analysis for a study.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInsights {
    pub study_id: String,
    pub source: AnalysisSource,
    pub result: AnalysisResult,
    pub updated_at: i64,
}

/// A sticky note on a study board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub study_id: String,
    pub author: String,
    pub body: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    #[serde(default = "default_author")]
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

fn default_author() -> String {
    "anonymous".into()
}

/// Partial note update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub body: Option<String>,
    pub color: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Store statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub studies: i64,
    pub transcripts: i64,
    pub analyzed_studies: i64,
    pub notes: i64,
    pub db_path: String,
    pub db_size_mb: f64,
}
