//! WAV framing for captured audio.

use bytes::Bytes;

/// Negotiated input stream parameters, fixed for the lifetime of a take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub channels: u16,
    pub sample_rate: u32,
}

const BITS_PER_SAMPLE: u16 = 16;

// Sizes a streaming header cannot know yet stay at the all-ones placeholder;
// decoders treat such files as data-to-EOF.
const UNKNOWN_SIZE: u32 = u32::MAX;

/// Build the 44-byte RIFF/WAVE header that precedes the PCM chunks of a
/// take. Emitted as chunk zero so the concatenated take is a playable file.
pub fn streaming_wav_header(spec: StreamSpec) -> Bytes {
    let block_align = spec.channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = spec.sample_rate * block_align as u32;

    let mut header = Vec::with_capacity(44);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&UNKNOWN_SIZE.to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes()); // PCM
    header.extend_from_slice(&spec.channels.to_le_bytes());
    header.extend_from_slice(&spec.sample_rate.to_le_bytes());
    header.extend_from_slice(&byte_rate.to_le_bytes());
    header.extend_from_slice(&block_align.to_le_bytes());
    header.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header.extend_from_slice(b"data");
    header.extend_from_slice(&UNKNOWN_SIZE.to_le_bytes());
    Bytes::from(header)
}

/// Convert one callback buffer of f32 samples to 16-bit little-endian PCM.
pub(crate) fn samples_to_pcm(samples: &[f32]) -> Bytes {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        out.extend_from_slice(&((clamped * i16::MAX as f32) as i16).to_le_bytes());
    }
    Bytes::from(out)
}

/// Basic facts about a WAV payload chosen for upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

/// Inspect a WAV payload before upload.
///
/// Returns `None` when the payload does not parse as WAV; other audio
/// containers are still accepted by the backend, so this is advisory only.
pub fn probe_wav(data: &[u8]) -> Option<WavInfo> {
    let reader = hound::WavReader::new(std::io::Cursor::new(data)).ok()?;
    let spec = reader.spec();
    Some(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        duration_secs: reader.duration() as f64 / spec.sample_rate as f64,
    })
}
