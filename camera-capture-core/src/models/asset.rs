use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of media carried by a captured asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Where the asset's media lives.
///
/// Images are carried in-process; videos are always a filesystem path and
/// never held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// Bounded-size derived preview. `rgba` is tightly packed RGBA8, at most
/// `MAX_EDGE` pixels on the longer side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    pub const MAX_EDGE: u32 = 256;

    pub fn is_bounded(&self) -> bool {
        self.width.max(self.height) <= Self::MAX_EDGE
            && self.rgba.len() == (self.width * self.height * 4) as usize
    }
}

/// A completed capture handed to the History collaborator.
///
/// The core constructs one per kept recording or still frame and transfers
/// ownership immediately; it retains nothing past the handoff.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedAsset {
    pub id: String,
    pub kind: MediaKind,
    pub payload: AssetPayload,
    pub created_at: String,
    pub thumbnail: Option<Thumbnail>,
    /// Video assets only.
    pub duration_secs: Option<f64>,
}

impl CapturedAsset {
    pub fn image(bytes: Vec<u8>, thumbnail: Option<Thumbnail>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MediaKind::Image,
            payload: AssetPayload::Bytes(bytes),
            created_at: chrono::Utc::now().to_rfc3339(),
            thumbnail,
            duration_secs: None,
        }
    }

    pub fn video(path: PathBuf, duration_secs: f64, thumbnail: Option<Thumbnail>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MediaKind::Video,
            payload: AssetPayload::File(path),
            created_at: chrono::Utc::now().to_rfc3339(),
            thumbnail,
            duration_secs: Some(duration_secs),
        }
    }
}
