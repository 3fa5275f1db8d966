use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::asset::Thumbnail;

/// Outcome applied when the asynchronous write-completion callback fires.
///
/// The underlying movie write cannot be aborted synchronously, so `cancel`
/// is a two-phase commit: flip the pending outcome now, act on it when the
/// platform confirms finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOutcome {
    Keep,
    Discard,
}

/// One in-flight recording. At most one exists at a time.
#[derive(Debug)]
pub struct RecordingSession {
    /// Unique, collision-resistant destination path.
    pub output_path: PathBuf,
    pub started: Instant,
    pub started_at: String,
    /// Monotonic counter, ticked once per second while active.
    pub elapsed_secs: u64,
    pub pending: PendingOutcome,
}

impl RecordingSession {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            started: Instant::now(),
            started_at: chrono::Utc::now().to_rfc3339(),
            elapsed_secs: 0,
            pending: PendingOutcome::Keep,
        }
    }
}

/// What the platform hands back once a movie write is finalized.
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub path: PathBuf,
    pub duration_secs: f64,
    /// Poster-frame preview, when the backend can derive one.
    pub thumbnail: Option<Thumbnail>,
}

/// Metadata written as a JSON sidecar next to each kept recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub duration_secs: f64,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn new(file_path: &str, duration_secs: f64, checksum: &str, created_at: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            duration_secs,
            checksum: checksum.to_string(),
            created_at: created_at.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_kept() {
        let session = RecordingSession::new(PathBuf::from("/tmp/r.mp4"));
        assert_eq!(session.pending, PendingOutcome::Keep);
        assert_eq!(session.elapsed_secs, 0);
    }
}
