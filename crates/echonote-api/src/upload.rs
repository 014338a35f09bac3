//! Upload lifecycle for a finished recording.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use echonote_core::{Language, RecorderSession};
use parking_lot::Mutex;
use tracing::{error, info};

use crate::types::TranscriptionReply;
use crate::{ApiError, Result, TranscriptionService};

/// Message shown to the user when an upload fails. The underlying cause is
/// logged, never surfaced verbatim.
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed. Please check the backend or try again.";

/// State of the most recent upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Request in flight
    Pending,
    /// Backend produced a transcription
    Success(TranscriptionReply),
    /// Upload failed; `message` is safe to show the user
    Failure { message: String },
}

/// Drives the upload of a finalized recording to a transcription service.
///
/// A busy flag admits one in-flight upload at a time: a second call while
/// one is pending is rejected with [`ApiError::Busy`] before any request is
/// issued. Front ends can also poll [`is_busy`] to render a disabled
/// control instead of surfacing the rejection.
///
/// [`is_busy`]: UploadCoordinator::is_busy
pub struct UploadCoordinator<S> {
    service: S,
    busy: AtomicBool,
    outcome: Mutex<Option<UploadOutcome>>,
}

impl<S: TranscriptionService> UploadCoordinator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            busy: AtomicBool::new(false),
            outcome: Mutex::new(None),
        }
    }

    /// True while an upload is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the most recent upload's state, if any upload has run.
    pub fn outcome(&self) -> Option<UploadOutcome> {
        self.outcome.lock().clone()
    }

    /// Upload the session's finalized blob with the given language.
    ///
    /// Fails fast with [`ApiError::NoRecording`] when the session holds no
    /// blob, and with [`ApiError::Busy`] while another upload is pending;
    /// neither issues a request. Service failures resolve to
    /// [`UploadOutcome::Failure`] carrying [`GENERIC_UPLOAD_ERROR`], with
    /// the cause logged.
    pub async fn upload(
        &self,
        session: &RecorderSession,
        language: Language,
    ) -> Result<UploadOutcome> {
        let blob = session.blob().ok_or(ApiError::NoRecording)?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ApiError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        *self.outcome.lock() = Some(UploadOutcome::Pending);

        let filename = upload_filename();
        let outcome = match self
            .service
            .transcribe(blob.data().clone(), &filename, language)
            .await
        {
            Ok(reply) => {
                info!(chars = reply.transcription.len(), "transcription received");
                UploadOutcome::Success(reply)
            }
            Err(err) => {
                error!(error = %err, "upload failed");
                UploadOutcome::Failure {
                    message: GENERIC_UPLOAD_ERROR.to_string(),
                }
            }
        };

        *self.outcome.lock() = Some(outcome.clone());
        Ok(outcome)
    }
}

// Clears the busy flag on every exit path, including panics in the service.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Filename attached to the multipart payload, unique per attempt.
fn upload_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("recording-{millis}.wav")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use bytes::Bytes;
    use tokio::sync::Notify;

    use super::*;

    /// Service returning a canned result, counting how many requests it saw.
    struct MockService {
        reply: Result<TranscriptionReply>,
        calls: AtomicUsize,
    }

    impl MockService {
        fn returning(reply: TranscriptionReply) -> Self {
            Self {
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16, body: &str) -> Self {
            Self {
                reply: Err(ApiError::Server {
                    status,
                    body: body.to_string(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TranscriptionService for MockService {
        async fn transcribe(
            &self,
            _audio: Bytes,
            _filename: &str,
            _language: Language,
        ) -> Result<TranscriptionReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(ApiError::Server { status, body }) => Err(ApiError::Server {
                    status: *status,
                    body: body.clone(),
                }),
                Err(_) => unreachable!("mock only fails with Server errors"),
            }
        }
    }

    /// Service that parks inside `transcribe` until the test releases it.
    #[derive(Clone)]
    struct BlockingService {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    impl BlockingService {
        fn new() -> Self {
            Self {
                entered: Arc::new(Notify::new()),
                release: Arc::new(Notify::new()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait::async_trait]
    impl TranscriptionService for BlockingService {
        async fn transcribe(
            &self,
            _audio: Bytes,
            _filename: &str,
            _language: Language,
        ) -> Result<TranscriptionReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(TranscriptionReply {
                transcription: "done".to_string(),
                translation: None,
                summary: None,
            })
        }
    }

    fn finished_session() -> RecorderSession {
        let mut session = RecorderSession::new();
        session.begin();
        session.push_chunk(Bytes::from_static(b"fake audio"));
        session.finish();
        session
    }

    #[tokio::test]
    async fn test_rejected_without_blob_for_all_languages() {
        let service = MockService::returning(TranscriptionReply {
            transcription: "unused".to_string(),
            translation: None,
            summary: None,
        });
        let coordinator = UploadCoordinator::new(service);
        let session = RecorderSession::new();

        for language in Language::ALL {
            let err = coordinator.upload(&session, language).await.unwrap_err();
            assert!(matches!(err, ApiError::NoRecording));
        }
        assert_eq!(coordinator.service.calls(), 0);
        assert!(coordinator.outcome().is_none());
    }

    #[tokio::test]
    async fn test_no_blob_while_recording() {
        let service = MockService::returning(TranscriptionReply {
            transcription: "unused".to_string(),
            translation: None,
            summary: None,
        });
        let coordinator = UploadCoordinator::new(service);

        let mut session = RecorderSession::new();
        session.begin();
        session.push_chunk(Bytes::from_static(b"partial"));

        let err = coordinator.upload(&session, Language::En).await.unwrap_err();
        assert!(matches!(err, ApiError::NoRecording));
    }

    #[tokio::test]
    async fn test_success_populates_transcription() {
        let service = MockService::returning(TranscriptionReply {
            transcription: "你好".to_string(),
            translation: None,
            summary: None,
        });
        let coordinator = UploadCoordinator::new(service);
        let session = finished_session();

        let outcome = coordinator.upload(&session, Language::Zh).await.unwrap();
        match &outcome {
            UploadOutcome::Success(reply) => {
                assert_eq!(reply.transcription, "你好");
                assert!(reply.summary.is_none());
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(coordinator.service.calls(), 1);
        assert_eq!(coordinator.outcome(), Some(outcome));
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_server_error_becomes_generic_failure() {
        let service = MockService::failing(500, "internal server error");
        let coordinator = UploadCoordinator::new(service);
        let session = finished_session();

        let outcome = coordinator.upload(&session, Language::En).await.unwrap();
        match outcome {
            UploadOutcome::Failure { message } => {
                assert!(!message.is_empty());
                assert_eq!(message, GENERIC_UPLOAD_ERROR);
                // backend detail stays in the logs
                assert!(!message.contains("internal server error"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_second_upload_while_pending_is_rejected() {
        let service = BlockingService::new();
        let coordinator = Arc::new(UploadCoordinator::new(service.clone()));
        let session = Arc::new(finished_session());

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            let session = session.clone();
            async move { coordinator.upload(&session, Language::En).await }
        });

        // Wait until the first upload is inside the service call.
        service.entered.notified().await;
        assert!(coordinator.is_busy());
        assert_eq!(coordinator.outcome(), Some(UploadOutcome::Pending));

        // The second attempt is rejected and issues no request.
        let err = coordinator.upload(&session, Language::En).await.unwrap_err();
        assert!(matches!(err, ApiError::Busy));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        service.release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, UploadOutcome::Success(_)));
        assert!(!coordinator.is_busy());
    }
}
