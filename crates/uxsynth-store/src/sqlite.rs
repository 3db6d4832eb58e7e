//! SQLite-backed study store.
//!
//! One connection behind a mutex; every public method takes the lock for
//! the duration of its statement(s). Insights are replaced wholesale so a
//! reader never observes a partially written analysis.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::{INSIGHTS_SCHEMA_SQL, NOTES_SCHEMA_SQL, SCHEMA_SQL};
use crate::types::*;
use uxsynth_core::{AnalysisResult, Error, Participant, Result, Transcript};

/// SQLite store for studies, transcripts, insights and notes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/uxsynth.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("uxsynth.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let stats = store.get_stats()?;
        info!(
            "SqliteStore initialized: {} studies, {} transcripts, path={}",
            stats.studies,
            stats.transcripts,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        let full_schema = format!("{}\n{}\n{}", SCHEMA_SQL, INSIGHTS_SCHEMA_SQL, NOTES_SCHEMA_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Studies
    // ---------------------------------------------------------------

    /// Create a study with a generated ID.
    pub fn create_study(&self, name: &str, description: Option<&str>) -> Result<Study> {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert_study(&id, name, description)
    }

    /// Return the study with this ID, creating it if missing.
    pub fn ensure_study(&self, id: &str, name: &str) -> Result<Study> {
        match self.get_study(id)? {
            Some(study) => Ok(study),
            None => self.insert_study(id, name, None),
        }
    }

    fn insert_study(&self, id: &str, name: &str, description: Option<&str>) -> Result<Study> {
        let now = now_millis();
        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO studies (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, name, description, now],
            )
            .map_err(db_err)?;
        }
        debug!("Created study {} ({})", id, name);
        Ok(Study {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            transcript_count: 0,
            analyzed: false,
        })
    }

    const STUDY_SELECT: &'static str = "SELECT s.id, s.name, s.description, s.created_at,
            (SELECT COUNT(*) FROM transcripts t WHERE t.study_id = s.id) AS transcript_count,
            EXISTS (SELECT 1 FROM insights i WHERE i.study_id = s.id) AS analyzed
         FROM studies s";

    pub fn get_study(&self, id: &str) -> Result<Option<Study>> {
        let conn = self.conn.lock();
        let sql = format!("{} WHERE s.id = ?1", Self::STUDY_SELECT);
        let mut stmt = conn.prepare_cached(&sql).map_err(db_err)?;
        stmt.query_row(params![id], |row| Ok(Self::row_to_study(row)))
            .optional()
            .map_err(db_err)
    }

    /// All studies, newest first.
    pub fn list_studies(&self) -> Result<Vec<Study>> {
        let conn = self.conn.lock();
        let sql = format!("{} ORDER BY s.created_at DESC, s.id", Self::STUDY_SELECT);
        let mut stmt = conn.prepare_cached(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_study(row)))
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Delete a study and everything attached to it (cascade).
    pub fn delete_study(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM studies WHERE id = ?1", params![id])
            .map_err(db_err)?;
        Ok(count > 0)
    }

    fn require_study(&self, id: &str) -> Result<()> {
        if self.get_study(id)?.is_none() {
            return Err(Error::NotFound(format!("study {}", id)));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Transcripts
    // ---------------------------------------------------------------

    /// Insert a transcript. Returns the new row ID.
    pub fn add_transcript(&self, study_id: &str, transcript: NewTranscript) -> Result<i64> {
        self.require_study(study_id)?;
        let p = &transcript.participant;
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "INSERT INTO transcripts (study_id, filename, participant_name, participant_number,
                    participant_label, participant_inferred, text, content_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .map_err(db_err)?;
        stmt.insert(params![
            study_id,
            transcript.filename,
            p.name,
            p.number,
            p.label,
            p.inferred,
            transcript.text,
            transcript.content_hash,
            now_millis()
        ])
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::DuplicateContent(transcript.content_hash.clone())
            } else {
                db_err(e)
            }
        })
    }

    pub fn find_transcript_by_hash(
        &self,
        study_id: &str,
        content_hash: &str,
    ) -> Result<Option<TranscriptRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM transcripts WHERE study_id = ?1 AND content_hash = ?2")
            .map_err(db_err)?;
        stmt.query_row(params![study_id, content_hash], |row| {
            Ok(Self::row_to_transcript(row))
        })
        .optional()
        .map_err(db_err)
    }

    /// Transcripts of a study in upload order.
    pub fn list_transcripts(&self, study_id: &str) -> Result<Vec<TranscriptRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM transcripts WHERE study_id = ?1 ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![study_id], |row| Ok(Self::row_to_transcript(row)))
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Transcripts of a study as analysis input.
    pub fn load_transcripts(&self, study_id: &str) -> Result<Vec<Transcript>> {
        Ok(self
            .list_transcripts(study_id)?
            .iter()
            .map(TranscriptRecord::to_transcript)
            .collect())
    }

    pub fn count_transcripts(&self, study_id: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*) FROM transcripts WHERE study_id = ?1",
            params![study_id],
            |row| row.get(0),
        )
        .map_err(db_err)
    }

    /// Highest participant number used in a study, 0 when it has none.
    pub fn max_participant_number(&self, study_id: &str) -> Result<u32> {
        let conn = self.conn.lock();
        let max: Option<i64> = conn
            .query_row(
                "SELECT MAX(participant_number) FROM transcripts WHERE study_id = ?1",
                params![study_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(max.and_then(|n| u32::try_from(n).ok()).unwrap_or(0))
    }

    pub fn delete_transcript(&self, study_id: &str, transcript_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "DELETE FROM transcripts WHERE study_id = ?1 AND id = ?2",
                params![study_id, transcript_id],
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    // ---------------------------------------------------------------
    // Insights
    // ---------------------------------------------------------------

    /// Replace the study's stored analysis with `result`.
    pub fn save_insights(&self, study_id: &str, result: &AnalysisResult) -> Result<()> {
        self.require_study(study_id)?;
        let json = serde_json::to_string(result)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO insights (study_id, source, result_json, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(study_id) DO UPDATE SET
                source = excluded.source,
                result_json = excluded.result_json,
                updated_at = excluded.updated_at",
            params![study_id, result.source.to_string(), json, now_millis()],
        )
        .map_err(db_err)?;
        debug!("Saved {} insights for study {}", result.source, study_id);
        Ok(())
    }

    pub fn load_insights(&self, study_id: &str) -> Result<Option<StoredInsights>> {
        let row: Option<(String, i64)> = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare_cached("SELECT result_json, updated_at FROM insights WHERE study_id = ?1")
                .map_err(db_err)?;
            stmt.query_row(params![study_id], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()
                .map_err(db_err)?
        };

        match row {
            Some((json, updated_at)) => {
                let result: AnalysisResult = serde_json::from_str(&json)?;
                Ok(Some(StoredInsights {
                    study_id: study_id.to_string(),
                    source: result.source,
                    result,
                    updated_at,
                }))
            }
            None => Ok(None),
        }
    }

    // ---------------------------------------------------------------
    // Notes
    // ---------------------------------------------------------------

    pub fn add_note(&self, study_id: &str, note: NewNote) -> Result<Note> {
        self.require_study(study_id)?;
        let now = now_millis();
        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            study_id: study_id.to_string(),
            author: note.author,
            body: note.body,
            color: note.color.unwrap_or_else(|| "yellow".to_string()),
            x: note.x,
            y: note.y,
            created_at: now,
            updated_at: now,
        };
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notes (id, study_id, author, body, color, x, y, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                note.id,
                note.study_id,
                note.author,
                note.body,
                note.color,
                note.x,
                note.y,
                note.created_at,
                note.updated_at
            ],
        )
        .map_err(db_err)?;
        Ok(note)
    }

    pub fn list_notes(&self, study_id: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM notes WHERE study_id = ?1 ORDER BY created_at, id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![study_id], |row| Ok(Self::row_to_note(row)))
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    fn get_note(&self, study_id: &str, note_id: &str) -> Result<Option<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM notes WHERE study_id = ?1 AND id = ?2")
            .map_err(db_err)?;
        stmt.query_row(params![study_id, note_id], |row| Ok(Self::row_to_note(row)))
            .optional()
            .map_err(db_err)
    }

    /// Apply a partial update. Returns `None` if the note does not exist.
    pub fn update_note(
        &self,
        study_id: &str,
        note_id: &str,
        update: &NoteUpdate,
    ) -> Result<Option<Note>> {
        let Some(mut note) = self.get_note(study_id, note_id)? else {
            return Ok(None);
        };
        if let Some(body) = &update.body {
            note.body = body.clone();
        }
        if let Some(color) = &update.color {
            note.color = color.clone();
        }
        if let Some(x) = update.x {
            note.x = x;
        }
        if let Some(y) = update.y {
            note.y = y;
        }
        note.updated_at = now_millis();

        let conn = self.conn.lock();
        conn.execute(
            "UPDATE notes SET body = ?1, color = ?2, x = ?3, y = ?4, updated_at = ?5
             WHERE study_id = ?6 AND id = ?7",
            params![note.body, note.color, note.x, note.y, note.updated_at, study_id, note_id],
        )
        .map_err(db_err)?;
        Ok(Some(note))
    }

    pub fn delete_note(&self, study_id: &str, note_id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "DELETE FROM notes WHERE study_id = ?1 AND id = ?2",
                params![study_id, note_id],
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    pub fn get_stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<i64> {
            let conn = self.conn.lock();
            conn.query_row(sql, [], |row| row.get(0)).map_err(db_err)
        };
        let studies = count("SELECT COUNT(*) FROM studies")?;
        let transcripts = count("SELECT COUNT(*) FROM transcripts")?;
        let analyzed_studies = count("SELECT COUNT(*) FROM insights")?;
        let notes = count("SELECT COUNT(*) FROM notes")?;

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            studies,
            transcripts,
            analyzed_studies,
            notes,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    fn row_to_study(row: &rusqlite::Row<'_>) -> Study {
        Study {
            id: row.get("id").unwrap_or_default(),
            name: row.get("name").unwrap_or_default(),
            description: row.get("description").ok().flatten(),
            created_at: row.get("created_at").unwrap_or(0),
            transcript_count: row.get("transcript_count").unwrap_or(0),
            analyzed: row.get("analyzed").unwrap_or(false),
        }
    }

    fn row_to_transcript(row: &rusqlite::Row<'_>) -> TranscriptRecord {
        TranscriptRecord {
            id: row.get("id").unwrap_or(0),
            study_id: row.get("study_id").unwrap_or_default(),
            filename: row.get("filename").ok().flatten(),
            participant: Participant {
                name: row.get("participant_name").unwrap_or_default(),
                number: row.get("participant_number").unwrap_or(0),
                label: row.get("participant_label").unwrap_or_default(),
                inferred: row.get("participant_inferred").unwrap_or(false),
            },
            text: row.get("text").unwrap_or_default(),
            content_hash: row.get("content_hash").unwrap_or_default(),
            created_at: row.get("created_at").unwrap_or(0),
        }
    }

    fn row_to_note(row: &rusqlite::Row<'_>) -> Note {
        Note {
            id: row.get("id").unwrap_or_default(),
            study_id: row.get("study_id").unwrap_or_default(),
            author: row.get("author").unwrap_or_default(),
            body: row.get("body").unwrap_or_default(),
            color: row.get("color").unwrap_or_default(),
            x: row.get("x").unwrap_or(0.0),
            y: row.get("y").unwrap_or(0.0),
            created_at: row.get("created_at").unwrap_or(0),
            updated_at: row.get("updated_at").unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;
    use uxsynth_core::{AnalysisSource, AnalysisStats};

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn new_transcript(name: &str, number: u32, text: &str, hash: &str) -> NewTranscript {
        NewTranscript {
            filename: Some(format!("{}(User {}).txt", name, number)),
            participant: Participant::new(name, number),
            text: text.to_string(),
            content_hash: hash.to_string(),
        }
    }

    fn result(summary: &str, source: AnalysisSource) -> AnalysisResult {
        AnalysisResult {
            summary: summary.to_string(),
            key_findings: Vec::new(),
            themes: Vec::new(),
            pain_points: Vec::new(),
            quotes: Vec::new(),
            recommendations: Vec::new(),
            stats: AnalysisStats {
                participants: 1,
                responses: 3,
            },
            source,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_list_studies() {
        let (store, _dir) = test_store();
        let study = store.create_study("Checkout usability", Some("Round 1")).unwrap();
        let fetched = store.get_study(&study.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Checkout usability");
        assert_eq!(fetched.description.as_deref(), Some("Round 1"));
        assert_eq!(fetched.transcript_count, 0);
        assert!(!fetched.analyzed);
        assert_eq!(store.list_studies().unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_study_is_idempotent() {
        let (store, _dir) = test_store();
        store.ensure_study("demo", "Demo study").unwrap();
        store.ensure_study("demo", "Renamed").unwrap();
        let studies = store.list_studies().unwrap();
        assert_eq!(studies.len(), 1);
        assert_eq!(studies[0].name, "Demo study");
    }

    #[test]
    fn test_add_and_load_transcripts() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        store
            .add_transcript(&study.id, new_transcript("Alice", 1, "First text.", "h1"))
            .unwrap();
        store
            .add_transcript(&study.id, new_transcript("Bob", 2, "Second text.", "h2"))
            .unwrap();

        let transcripts = store.load_transcripts(&study.id).unwrap();
        assert_eq!(transcripts.len(), 2);
        assert_eq!(transcripts[0].participant.label, "Alice (User 1)");
        assert_eq!(transcripts[1].text, "Second text.");
        assert_eq!(store.count_transcripts(&study.id).unwrap(), 2);
        assert!(store.find_transcript_by_hash(&study.id, "h2").unwrap().is_some());
    }

    #[test]
    fn test_max_participant_number() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        assert_eq!(store.max_participant_number(&study.id).unwrap(), 0);
        store
            .add_transcript(&study.id, new_transcript("Alice", 3, "First text.", "h1"))
            .unwrap();
        store
            .add_transcript(&study.id, new_transcript("Bob", 1, "Second text.", "h2"))
            .unwrap();
        assert_eq!(store.max_participant_number(&study.id).unwrap(), 3);
    }

    #[test]
    fn test_duplicate_transcript_rejected() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        store
            .add_transcript(&study.id, new_transcript("Alice", 1, "Same.", "same"))
            .unwrap();
        let err = store
            .add_transcript(&study.id, new_transcript("Alice", 1, "Same.", "same"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(_)));

        // Same content is allowed in a different study.
        let other = store.create_study("Other", None).unwrap();
        store
            .add_transcript(&other.id, new_transcript("Alice", 1, "Same.", "same"))
            .unwrap();
    }

    #[test]
    fn test_transcript_for_missing_study() {
        let (store, _dir) = test_store();
        let err = store
            .add_transcript("nope", new_transcript("A", 1, "x", "h"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_insights_replaced_wholesale() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        assert!(store.load_insights(&study.id).unwrap().is_none());

        store
            .save_insights(&study.id, &result("first", AnalysisSource::Heuristic))
            .unwrap();
        store
            .save_insights(&study.id, &result("second", AnalysisSource::Ai))
            .unwrap();

        let stored = store.load_insights(&study.id).unwrap().unwrap();
        assert_eq!(stored.result.summary, "second");
        assert_eq!(stored.source, AnalysisSource::Ai);
        assert!(store.get_study(&study.id).unwrap().unwrap().analyzed);
    }

    #[test]
    fn test_delete_study_cascades() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        store
            .add_transcript(&study.id, new_transcript("A", 1, "x", "h"))
            .unwrap();
        store
            .save_insights(&study.id, &result("r", AnalysisSource::Heuristic))
            .unwrap();
        store
            .add_note(
                &study.id,
                NewNote {
                    author: "kim".into(),
                    body: "Follow up".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(store.delete_study(&study.id).unwrap());
        let stats = store.get_stats().unwrap();
        assert_eq!(stats.studies, 0);
        assert_eq!(stats.transcripts, 0);
        assert_eq!(stats.analyzed_studies, 0);
        assert_eq!(stats.notes, 0);
    }

    #[test]
    fn test_note_lifecycle() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        let note = store
            .add_note(
                &study.id,
                NewNote {
                    author: "kim".into(),
                    body: "Users skip onboarding".into(),
                    color: None,
                    x: 10.0,
                    y: 20.0,
                },
            )
            .unwrap();
        assert_eq!(note.color, "yellow");

        let updated = store
            .update_note(
                &study.id,
                &note.id,
                &NoteUpdate {
                    body: Some("Most users skip onboarding".into()),
                    x: Some(42.0),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.body, "Most users skip onboarding");
        assert_eq!(updated.x, 42.0);
        assert_eq!(updated.y, 20.0);

        let notes = store.list_notes(&study.id).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "Most users skip onboarding");

        assert!(store.delete_note(&study.id, &note.id).unwrap());
        assert!(!store.delete_note(&study.id, &note.id).unwrap());
        assert!(store
            .update_note(&study.id, &note.id, &NoteUpdate::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_transcript() {
        let (store, _dir) = test_store();
        let study = store.create_study("S", None).unwrap();
        let id = store
            .add_transcript(&study.id, new_transcript("A", 1, "x", "h"))
            .unwrap();
        assert!(store.delete_transcript(&study.id, id).unwrap());
        assert!(!store.delete_transcript(&study.id, id).unwrap());
        assert_eq!(store.count_transcripts(&study.id).unwrap(), 0);
    }
}
