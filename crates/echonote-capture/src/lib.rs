//! Microphone capture for echonote.
//!
//! Acquires the default input device through cpal and emits the take as an
//! ordered sequence of chunks: a streaming WAV header first, then 16-bit PCM
//! segments as the device callback delivers them. Concatenating the chunks
//! in emission order therefore yields a playable `audio/wav` object, which
//! is exactly how the session finalizes a take.

mod recorder;
mod wav;

pub use recorder::{CaptureHandle, Recorder};
pub use wav::{StreamSpec, WavInfo, probe_wav, streaming_wav_header};

use thiserror::Error;

/// Errors raised while acquiring or driving the input device.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Microphone missing, or access denied by the platform
    #[error("no input device available")]
    NoInputDevice,
    /// Sample format not supported
    #[error("sample format not supported: {0}")]
    SampleFormatNotSupported(String),
    /// Build stream error
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    /// The stream refused to start
    #[error("failed to start input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
