use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::models::recording::RecordingMetadata;

/// App-private subdirectory recordings are written into.
pub const VIDEOS_SUBDIR: &str = "Videos";

/// Build a unique destination path for a new recording.
///
/// `recording_<UTC stamp>_<uuid>.mp4` under `<base>/Videos/`; the UUID
/// component makes same-second starts collision-resistant.
pub fn unique_output_path(base: &Path) -> Result<PathBuf, CaptureError> {
    let dir = base.join(VIDEOS_SUBDIR);
    fs::create_dir_all(&dir)
        .map_err(|e| CaptureError::StorageError(format!("failed to create videos directory: {}", e)))?;

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let token = uuid::Uuid::new_v4().simple();
    Ok(dir.join(format!("recording_{}_{}.mp4", stamp, token)))
}

/// Compute SHA-256 hex digest of a file.
pub fn file_checksum(path: &Path) -> Result<String, CaptureError> {
    let data = fs::read(path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Delete a recording file, tolerating its absence.
pub fn remove_file_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("failed to delete {}: {}", path.display(), e),
    }
}

/// Write recording metadata as a JSON sidecar file.
///
/// The sidecar lives alongside the recording, with the media extension
/// replaced by `metadata.json`.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<(), CaptureError> {
    let metadata_path = recording_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let metadata_path = recording_path.with_extension("metadata.json");
    let json = fs::read_to_string(&metadata_path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: RecordingMetadata = serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}
