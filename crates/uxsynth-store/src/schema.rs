//! Database schema SQL.

/// Studies and the transcripts uploaded to them.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS studies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transcripts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    study_id TEXT NOT NULL REFERENCES studies(id) ON DELETE CASCADE,
    filename TEXT,
    participant_name TEXT NOT NULL,
    participant_number INTEGER NOT NULL,
    participant_label TEXT NOT NULL,
    participant_inferred INTEGER NOT NULL DEFAULT 0,
    text TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (study_id, content_hash)
);

CREATE INDEX IF NOT EXISTS idx_transcripts_study ON transcripts(study_id);
"#;

/// The last successful analysis per study, stored as one JSON document.
pub const INSIGHTS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS insights (
    study_id TEXT PRIMARY KEY REFERENCES studies(id) ON DELETE CASCADE,
    source TEXT NOT NULL,
    result_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;

/// Free-form sticky notes pinned to a study board.
pub const NOTES_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    study_id TEXT NOT NULL REFERENCES studies(id) ON DELETE CASCADE,
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT 'yellow',
    x REAL NOT NULL DEFAULT 0,
    y REAL NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_study ON notes(study_id);
"#;
