//! HTTP client for the notes backend.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use echonote_core::Language;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::types::{NoteRecord, TranscriptionReply};
use crate::{ApiError, Result, TranscriptionService};

/// Client for the transcription/notes backend.
#[derive(Debug, Clone)]
pub struct NotesClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotesClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch all stored transcriptions.
    pub async fn notes(&self) -> Result<Vec<NoteRecord>> {
        let response = self.client.get(self.url("/notes/")).send().await?;
        Self::parse_json(response).await
    }

    /// Keyword search over stored transcriptions. Zero matches is a valid,
    /// empty result, not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<NoteRecord>> {
        let response = self
            .client
            .get(self.url("/search/"))
            .query(&[("query", query)])
            .send()
            .await?;
        Self::parse_json(response).await
    }

    /// Upload an audio payload for transcription.
    pub async fn upload_audio(
        &self,
        audio: Bytes,
        filename: &str,
        language: Language,
    ) -> Result<TranscriptionReply> {
        debug!(
            bytes = audio.len(),
            language = %language,
            filename,
            "uploading audio"
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::stream(audio)
                    .file_name(filename.to_string())
                    .mime_str("audio/wav")?,
            )
            .text("language", language.code());

        let response = self
            .client
            .post(self.url("/upload-audio/"))
            .multipart(form)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    /// Run the backend's canned-sample transcription check. The payload
    /// shape is backend-defined, so it comes back as raw JSON.
    pub async fn test_transcription(&self, language: Language) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/test-transcription/"))
            .query(&[("language", language.code())])
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Server { status, body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TranscriptionService for NotesClient {
    async fn transcribe(
        &self,
        audio: Bytes,
        filename: &str,
        language: Language,
    ) -> Result<TranscriptionReply> {
        self.upload_audio(audio, filename, language).await
    }
}
