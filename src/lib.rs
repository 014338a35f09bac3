// Re-export from sub-crates
pub use echonote_api::{
    ApiError, GENERIC_UPLOAD_ERROR, NoteRecord, NotesClient, TranscriptionReply,
    TranscriptionService, UploadCoordinator, UploadOutcome,
};
pub use echonote_capture::{CaptureError, CaptureHandle, Recorder, StreamSpec, probe_wav};
pub use echonote_core::{
    APP_NAME, AudioBlob, Config, ConfigManager, DEFAULT_LOG_LEVEL, Language, RecorderSession,
    RecorderStatus, UnknownLanguage, format_elapsed,
};

// App-specific modules
pub mod preview;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
