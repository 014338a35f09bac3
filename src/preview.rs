//! On-disk preview of a finished take.
//!
//! After a recording stops, the finalized blob is written to a temporary
//! file so the user can play it back before uploading. The file is the only
//! resource held for a finished take; removal is tied to drop so that every
//! exit path — a new take, teardown, an error — releases it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use echonote_core::AudioBlob;
use tracing::{debug, warn};

/// A finished take written out for playback.
#[derive(Debug)]
pub struct PreviewFile {
    path: PathBuf,
}

impl PreviewFile {
    /// Write `blob` to `filename` under the system temp directory.
    pub fn write(blob: &AudioBlob, filename: &str) -> Result<Self> {
        let path = std::env::temp_dir().join(filename);
        fs::write(&path, blob.data())
            .with_context(|| format!("failed to write preview file at {}", path.display()))?;
        debug!(path = %path.display(), bytes = blob.len(), "preview written");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreviewFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "failed to remove preview file: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use echonote_core::RecorderSession;

    use super::*;

    fn blob() -> AudioBlob {
        let mut session = RecorderSession::new();
        session.begin();
        session.push_chunk(Bytes::from_static(b"preview bytes"));
        session.finish();
        session.blob().unwrap().clone()
    }

    #[test]
    fn test_write_then_drop_removes_file() {
        let preview = PreviewFile::write(&blob(), "echonote-test-preview.wav").unwrap();
        let path = preview.path().to_path_buf();
        assert_eq!(fs::read(&path).unwrap(), b"preview bytes");

        drop(preview);
        assert!(!path.exists());
    }
}
