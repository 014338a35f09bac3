//! Backend client and upload coordination for echonote.
//!
//! This crate provides a trait-based abstraction over the transcription
//! backend so the upload lifecycle can be exercised against a mock service,
//! plus the production HTTP client for the notes endpoints.

mod client;
mod types;
mod upload;

pub use client::NotesClient;
pub use types::{NoteRecord, TranscriptionReply};
pub use upload::{GENERIC_UPLOAD_ERROR, UploadCoordinator, UploadOutcome};

use async_trait::async_trait;
use bytes::Bytes;
use echonote_core::Language;
use thiserror::Error;

/// Errors that can occur at the backend boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload attempted without a finalized recording
    #[error("no finished recording to upload")]
    NoRecording,

    /// An upload is already in flight
    #[error("an upload is already in progress")]
    Busy,

    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// A service that can turn an audio payload into text.
///
/// [`NotesClient`] is the production implementation; tests substitute mocks
/// to drive the upload lifecycle without a network.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribe an audio payload.
    ///
    /// `audio` is the finalized blob as reference-counted bytes, so cloning
    /// it into the request is O(1). `filename` labels the payload on the
    /// backend side.
    async fn transcribe(
        &self,
        audio: Bytes,
        filename: &str,
        language: Language,
    ) -> Result<TranscriptionReply>;
}
