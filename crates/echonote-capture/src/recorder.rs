//! Device capture producing ordered audio chunks. There can only be one
//! active capture at a time; buffering of the emitted chunks is the
//! caller's concern.

use std::sync::mpsc::{self, Receiver};

use bytes::Bytes;
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::wav::{StreamSpec, samples_to_pcm, streaming_wav_header};
use crate::{CaptureError, Result};

/// Factory for capture handles, bound to the platform's default audio host.
pub struct Recorder {
    host: Host,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Acquire the default input device and start capturing.
    ///
    /// The handle's channel carries the WAV header first, then PCM chunks in
    /// the order the device callback delivers them. Acquisition failure
    /// leaves nothing allocated; the caller's session stays idle.
    pub fn start(&self) -> Result<CaptureHandle> {
        let device = self
            .host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;
        let config = device
            .default_input_config()
            .map_err(|_| CaptureError::NoInputDevice)?;

        info!(
            device = %device.name().unwrap_or_else(|_| "<unnamed>".into()),
            config = ?config,
            "capturing from device"
        );

        let spec = StreamSpec {
            channels: config.channels(),
            sample_rate: config.sample_rate().0,
        };

        let (chunk_tx, chunk_rx) = mpsc::channel::<Bytes>();

        // The header must be chunk zero, so it goes out before the stream
        // starts delivering callbacks.
        chunk_tx.send(streaming_wav_header(spec)).ok();

        let err_fn = move |err| {
            error!("input stream error: {err}");
        };

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| {
                    // The receiver outlives the stream, so a failed send only
                    // happens during teardown and is safe to ignore.
                    chunk_tx.send(samples_to_pcm(data)).ok();
                },
                err_fn,
                None,
            )?,
            sample_format => {
                return Err(CaptureError::SampleFormatNotSupported(format!(
                    "{sample_format:?}"
                )));
            }
        };

        stream.play()?;

        Ok(CaptureHandle {
            stream: Some(stream),
            chunks: chunk_rx,
            spec,
        })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the active capture. Dropping it, or calling [`finish`], pauses
/// the stream and releases the input device.
///
/// [`finish`]: CaptureHandle::finish
pub struct CaptureHandle {
    stream: Option<cpal::Stream>,
    chunks: Receiver<Bytes>,
    spec: StreamSpec,
}

impl CaptureHandle {
    pub fn spec(&self) -> StreamSpec {
        self.spec
    }

    /// Chunks emitted since the last drain, in emission order.
    pub fn drain(&mut self) -> Vec<Bytes> {
        self.chunks.try_iter().collect()
    }

    /// Stop the device and collect every chunk still in flight.
    ///
    /// Dropping the stream tears down the callback, so once this returns the
    /// channel held the complete tail of the take; finalization observes all
    /// emitted chunks.
    pub fn finish(self) -> Vec<Bytes> {
        let mut handle = self;
        handle.release();
        handle.chunks.try_iter().collect()
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.pause().ok();
            drop(stream);
            info!("input device released");
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.release();
    }
}
