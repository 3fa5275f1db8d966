use std::path::Path;

use crate::models::asset::CapturedAsset;
use crate::models::error::CaptureError;

/// Receives ownership of completed captures.
///
/// Called exactly once per kept recording or still frame; never for
/// cancelled recordings.
pub trait HistorySink: Send + Sync {
    fn add_captured_asset(&self, asset: CapturedAsset);
}

/// Read-only view of the user's recording settings.
pub trait SettingsSource: Send + Sync {
    fn recording_enabled(&self) -> bool;

    fn auto_record_on_session_start(&self) -> bool;

    /// Auto-record is a dependent setting: enabling it force-enables
    /// recording even if the plain flag is off.
    fn recording_allowed(&self) -> bool {
        self.recording_enabled() || self.auto_record_on_session_start()
    }
}

/// The user's permanent media library.
///
/// Save failures are non-fatal; the local copy is retained either way.
pub trait MediaLibrary: Send + Sync {
    fn save_video(&self, path: &Path) -> Result<(), CaptureError>;
}
