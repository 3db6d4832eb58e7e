//! Transcript text extraction for the supported upload formats.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};
use uxsynth_core::{Error, Result};

/// Supported file types for transcript extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Json,
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "vtt" | "srt" => Self::PlainText,
            "md" | "markdown" => Self::Markdown,
            "json" => Self::Json,
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    pub fn from_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    /// Whether a directory import should pick this file up.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Extract transcript text from a file on disk.
pub fn extract_text(path: &Path) -> Result<Option<String>> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    extract_text_from_bytes(name, &bytes)
}

/// Extract transcript text from uploaded bytes. `name` picks the format.
///
/// Returns `Ok(None)` when the content carries no usable text.
pub fn extract_text_from_bytes(name: &str, bytes: &[u8]) -> Result<Option<String>> {
    let text = match FileType::from_name(name) {
        FileType::PlainText | FileType::Markdown => Some(decode_text(bytes)),
        FileType::Json => extract_json(bytes)?,
        FileType::Pdf => Some(extract_pdf(name, bytes)?),
        FileType::Unknown => {
            if looks_binary(bytes) {
                debug!("Skipping binary upload {}", name);
                None
            } else {
                Some(decode_text(bytes))
            }
        }
    };
    Ok(text.filter(|t| !t.trim().is_empty()))
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8192).any(|b| *b == 0)
}

#[derive(Deserialize)]
struct Turn {
    #[serde(default)]
    speaker: Option<String>,
    text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptBody {
    Text(String),
    Turns(Vec<Turn>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTranscript {
    Text { text: String },
    Transcript { transcript: TranscriptBody },
    Turns(Vec<Turn>),
}

fn render_turns(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| match &turn.speaker {
            Some(speaker) if !speaker.trim().is_empty() => {
                format!("{}: {}", speaker.trim(), turn.text.trim())
            }
            _ => turn.text.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Accepts `{"text": ..}`, `{"transcript": ..}` (string or turns) and a
/// bare array of `{speaker, text}` turns.
fn extract_json(bytes: &[u8]) -> Result<Option<String>> {
    let content = decode_text(bytes);
    let parsed: JsonTranscript = serde_json::from_str(&content)
        .map_err(|e| Error::Ingest(format!("Unrecognised JSON transcript: {}", e)))?;
    let text = match parsed {
        JsonTranscript::Text { text } => text,
        JsonTranscript::Transcript {
            transcript: TranscriptBody::Text(text),
        } => text,
        JsonTranscript::Transcript {
            transcript: TranscriptBody::Turns(turns),
        }
        | JsonTranscript::Turns(turns) => render_turns(&turns),
    };
    Ok(Some(text))
}

fn extract_pdf(name: &str, bytes: &[u8]) -> Result<String> {
    // pdf-extract can panic on malformed files
    let owned = bytes.to_vec();
    let result = std::panic::catch_unwind(move || pdf_extract::extract_text_from_mem(&owned));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(Error::Ingest(format!("PDF {}: {}", name, e))),
        Err(_) => {
            warn!("PDF extraction panicked on {}", name);
            Err(Error::Ingest(format!("PDF {}: malformed file", name)))
        }
    }
}
