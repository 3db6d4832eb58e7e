//! Transcript ingestion: file → text → participant → store.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::file::{self, FileType};
use crate::participant::parse_participant;
use uxsynth_core::{Error, Participant, Result, Transcript};
use uxsynth_store::{NewTranscript, SqliteStore, TranscriptRecord};

/// Outcome of a directory import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Handles transcript ingestion into a study.
pub struct Ingester<'a> {
    store: &'a SqliteStore,
}

impl<'a> Ingester<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Ingest a transcript file. Returns `None` when the file has no text.
    pub fn ingest_file(&self, study_id: &str, path: &Path) -> Result<Option<TranscriptRecord>> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        let bytes = std::fs::read(path)?;
        self.ingest_bytes(study_id, filename, &bytes)
    }

    /// Ingest uploaded bytes; `filename` selects the format and participant.
    pub fn ingest_bytes(
        &self,
        study_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Option<TranscriptRecord>> {
        match file::extract_text_from_bytes(filename, bytes)? {
            Some(text) => self.ingest_text(study_id, Some(filename), &text).map(Some),
            None => {
                debug!("No text extracted from {}", filename);
                Ok(None)
            }
        }
    }

    /// Ingest raw text, deriving the participant from `filename` when given.
    pub fn ingest_text(
        &self,
        study_id: &str,
        filename: Option<&str>,
        text: &str,
    ) -> Result<TranscriptRecord> {
        let sequence = self.next_sequence(study_id)?;
        let participant = match filename {
            Some(name) => parse_participant(name, sequence),
            None => Participant::sequential(sequence),
        };
        self.ingest_as(study_id, filename, participant, text)
    }

    /// Ingest raw text for an explicitly named participant.
    pub fn ingest_as(
        &self,
        study_id: &str,
        filename: Option<&str>,
        participant: Participant,
        text: &str,
    ) -> Result<TranscriptRecord> {
        let content_hash = content_hash(text);

        if self
            .store
            .find_transcript_by_hash(study_id, &content_hash)?
            .is_some()
        {
            debug!("Duplicate transcript in study {}, skipping", study_id);
            return Err(Error::DuplicateContent(content_hash));
        }

        let label = participant.label.clone();
        let id = self.store.add_transcript(
            study_id,
            NewTranscript {
                filename: filename.map(str::to_string),
                participant,
                text: text.to_string(),
                content_hash: content_hash.clone(),
            },
        )?;
        info!("Ingested transcript {} for {} into study {}", id, label, study_id);

        self.store
            .find_transcript_by_hash(study_id, &content_hash)?
            .ok_or_else(|| Error::Internal(format!("transcript {} vanished after insert", id)))
    }

    /// Sequence number for the next unlabelled participant in a study.
    /// Numbers freed by deleted transcripts are not reused.
    pub fn next_sequence(&self, study_id: &str) -> Result<u32> {
        let max = self.store.max_participant_number(study_id)?;
        Ok(max.saturating_add(1))
    }

    /// Import every supported file in `dir` (non-recursive, name order).
    pub fn import_dir(&self, study_id: &str, dir: &Path) -> Result<ImportReport> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut report = ImportReport::default();
        for path in paths {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("");
            if name.starts_with('.') || !FileType::from_name(name).is_supported() {
                report.skipped += 1;
                continue;
            }
            match self.ingest_file(study_id, &path) {
                Ok(Some(_)) => report.imported += 1,
                Ok(None) => report.skipped += 1,
                Err(Error::DuplicateContent(_)) => report.duplicates += 1,
                Err(e) => {
                    warn!("Failed to import {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Imported {} transcripts from {} ({} duplicates, {} skipped, {} failed)",
            report.imported,
            dir.display(),
            report.duplicates,
            report.skipped,
            report.failed
        );
        Ok(report)
    }
}

/// Read every supported file in `dir` into transcripts without a store.
/// Identical contents are kept once.
pub fn transcripts_from_dir(dir: &Path) -> Result<Vec<Transcript>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut seen = std::collections::HashSet::new();
    let mut transcripts = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        if name.starts_with('.') || !FileType::from_name(&name).is_supported() {
            continue;
        }
        let text = match file::extract_text(&path) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if !seen.insert(content_hash(&text)) {
            continue;
        }
        let participant = parse_participant(&name, transcripts.len() as u32 + 1);
        transcripts.push(Transcript::new(participant, text).with_source(name));
    }
    Ok(transcripts)
}

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (SqliteStore, String, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("db")).unwrap();
        let study = store.create_study("Study", None).unwrap();
        (store, study.id, dir)
    }

    #[test]
    fn test_content_hash_stable() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("").len(), 64);
    }

    #[test]
    fn test_ingest_bytes_parses_participant() {
        let (store, study, _dir) = setup();
        let ingester = Ingester::new(&store);
        let record = ingester
            .ingest_bytes(&study, "Alice(User 1).txt", b"The export is slow.")
            .unwrap()
            .unwrap();
        assert_eq!(record.participant.label, "Alice (User 1)");
        assert_eq!(record.filename.as_deref(), Some("Alice(User 1).txt"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let (store, study, _dir) = setup();
        let ingester = Ingester::new(&store);
        ingester.ingest_text(&study, None, "Same words.").unwrap();
        let err = ingester.ingest_text(&study, None, "Same words.").unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(_)));
    }

    #[test]
    fn test_sequential_fallback_counts_existing() {
        let (store, study, _dir) = setup();
        let ingester = Ingester::new(&store);
        let first = ingester.ingest_text(&study, None, "One.").unwrap();
        let second = ingester.ingest_text(&study, Some("notes.txt"), "Two.").unwrap();
        assert_eq!(first.participant.label, "Participant 1");
        assert_eq!(second.participant.label, "Participant 2");
        assert!(second.participant.inferred);
    }

    #[test]
    fn test_sequential_fallback_after_delete() {
        let (store, study, _dir) = setup();
        let ingester = Ingester::new(&store);
        let first = ingester.ingest_text(&study, None, "One.").unwrap();
        let second = ingester.ingest_text(&study, None, "Two.").unwrap();
        assert!(store.delete_transcript(&study, first.id).unwrap());

        let third = ingester.ingest_text(&study, None, "Three.").unwrap();
        assert_eq!(second.participant.label, "Participant 2");
        assert_eq!(third.participant.label, "Participant 3");
        assert_ne!(second.participant.label, third.participant.label);
    }

    #[test]
    fn test_sequential_fallback_skips_labelled_numbers() {
        let (store, study, _dir) = setup();
        let ingester = Ingester::new(&store);
        ingester
            .ingest_bytes(&study, "Cara (User 4).txt", b"Search is slow.")
            .unwrap()
            .unwrap();
        let next = ingester.ingest_text(&study, None, "Setup was fine.").unwrap();
        assert_eq!(next.participant.label, "Participant 5");
    }

    #[test]
    fn test_transcripts_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Ana(User 1).txt"), "Setup was confusing.").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Search is slow.").unwrap();
        std::fs::write(dir.path().join("same.txt"), "Search is slow.").unwrap();

        let transcripts = transcripts_from_dir(dir.path()).unwrap();
        assert_eq!(transcripts.len(), 2);
        assert_eq!(transcripts[0].participant.label, "Ana (User 1)");
        assert_eq!(transcripts[1].participant.label, "Participant 2");
        assert_eq!(transcripts[1].source.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn test_import_dir() {
        let (store, study, dir) = setup();
        let seed = dir.path().join("seed");
        std::fs::create_dir_all(&seed).unwrap();
        std::fs::write(seed.join("Ana(User 1).txt"), "Setup was confusing.").unwrap();
        std::fs::write(seed.join("Ben (Participant 2).md"), "Reports load slowly.").unwrap();
        std::fs::write(seed.join("copy.txt"), "Setup was confusing.").unwrap();
        std::fs::write(seed.join("empty.txt"), "   ").unwrap();
        std::fs::write(seed.join("image.png"), [0u8, 1, 2]).unwrap();

        let report = Ingester::new(&store).import_dir(&study, &seed).unwrap();
        assert_eq!(
            report,
            ImportReport {
                imported: 2,
                duplicates: 1,
                skipped: 2,
                failed: 0,
            }
        );

        let transcripts = store.load_transcripts(&study).unwrap();
        assert_eq!(transcripts[0].participant.label, "Ana (User 1)");
        assert_eq!(transcripts[1].participant.label, "Ben (User 2)");
    }
}
