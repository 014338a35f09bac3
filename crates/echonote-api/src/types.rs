//! Wire types for the notes backend.

use serde::Deserialize;

/// A stored transcription as returned by `/notes/` and `/search/`.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRecord {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub transcription_text: String,
    #[serde(default)]
    pub created_at: String,
}

/// Successful response from `/upload-audio/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptionReply {
    pub transcription: String,
    /// English translation, present for non-English uploads
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}
