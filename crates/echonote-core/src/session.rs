//! Recording session state machine.
//!
//! Models the lifecycle of a single take: `Idle` until capture starts,
//! `Recording` while chunks arrive, `Stopped` once the take is finalized
//! into a blob. Invalid transitions are guarded no-ops so callers never
//! need to pre-check status before driving the machine.

use bytes::{Bytes, BytesMut};
use tracing::info;

use crate::timer::TickTimer;

/// Lifecycle status of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderStatus {
    /// No take in progress
    #[default]
    Idle,
    /// Audio chunks are being captured
    Recording,
    /// The take is finalized and a blob is available
    Stopped,
}

/// The finalized audio of a completed take.
///
/// Only a [`RecorderSession`] constructs blobs, which keeps the invariant
/// that a blob always corresponds to a stopped take. The payload is
/// reference-counted, so cloning is O(1).
#[derive(Debug, Clone)]
pub struct AudioBlob {
    data: Bytes,
}

impl AudioBlob {
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// State for one recording take.
///
/// Owns the chunk buffer, the timer, and the finalized blob so that every
/// exit path (a new take, an explicit reset, teardown) releases all three.
/// At most one take is active at a time; starting a new take discards any
/// previous unsent blob.
#[derive(Debug, Default)]
pub struct RecorderSession {
    status: RecorderStatus,
    timer: TickTimer,
    chunks: Vec<Bytes>,
    blob: Option<AudioBlob>,
}

impl RecorderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RecorderStatus {
        self.status
    }

    /// True while audio is being captured.
    pub fn is_recording(&self) -> bool {
        self.status == RecorderStatus::Recording
    }

    /// Begin a new take: discard any previous chunks and blob, zero the
    /// timer, and move to `Recording`. Returns `false` and changes nothing
    /// when a take is already in progress.
    pub fn begin(&mut self) -> bool {
        if self.status == RecorderStatus::Recording {
            return false;
        }
        self.chunks.clear();
        self.blob = None;
        self.timer.start();
        self.status = RecorderStatus::Recording;
        info!("recording started");
        true
    }

    /// Append a captured chunk in emission order. Zero-length chunks are
    /// discarded, as are chunks arriving outside of `Recording`.
    pub fn push_chunk(&mut self, chunk: Bytes) {
        if self.status != RecorderStatus::Recording || chunk.is_empty() {
            return;
        }
        self.chunks.push(chunk);
    }

    /// Advance the recording clock by one second.
    pub fn tick(&mut self) {
        self.timer.tick();
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.timer.elapsed_secs()
    }

    /// Finalize the take: concatenate the accepted chunks in emission order
    /// into a blob, cancel the timer, and move to `Stopped`. Returns `false`
    /// and changes nothing unless a take is in progress, so stopping while
    /// `Idle` or already `Stopped` is safe.
    pub fn finish(&mut self) -> bool {
        if self.status != RecorderStatus::Recording {
            return false;
        }
        let total: usize = self.chunks.iter().map(Bytes::len).sum();
        let mut data = BytesMut::with_capacity(total);
        for chunk in self.chunks.drain(..) {
            data.extend_from_slice(&chunk);
        }
        self.blob = Some(AudioBlob {
            data: data.freeze(),
        });
        self.timer.cancel();
        self.status = RecorderStatus::Stopped;
        info!(
            bytes = total,
            seconds = self.timer.elapsed_secs(),
            "recording finished"
        );
        true
    }

    /// The finalized blob, present only after a take has been stopped.
    pub fn blob(&self) -> Option<&AudioBlob> {
        self.blob.as_ref()
    }

    /// Drop all take state and return to `Idle`. Used on teardown; `begin`
    /// performs the same discard implicitly.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.blob = None;
        self.timer = TickTimer::default();
        self.status = RecorderStatus::Idle;
    }
}
