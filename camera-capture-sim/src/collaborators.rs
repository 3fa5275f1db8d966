use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    AuthorizationState, CaptureError, CapturedAsset, HistorySink, MediaLibrary,
    RecordingMetadata, SessionDelegate, SessionPhase, SettingsSource,
};

/// History collaborator that keeps every handed-off asset in memory.
#[derive(Default)]
pub struct MemoryHistory {
    assets: Mutex<Vec<CapturedAsset>>,
}

impl MemoryHistory {
    pub fn assets(&self) -> Vec<CapturedAsset> {
        self.assets.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.lock().is_empty()
    }
}

impl HistorySink for MemoryHistory {
    fn add_captured_asset(&self, asset: CapturedAsset) {
        self.assets.lock().push(asset);
    }
}

/// Settings collaborator backed by flippable flags.
pub struct ToggleSettings {
    recording_enabled: AtomicBool,
    auto_record: AtomicBool,
}

impl ToggleSettings {
    pub fn new(recording_enabled: bool, auto_record: bool) -> Self {
        Self {
            recording_enabled: AtomicBool::new(recording_enabled),
            auto_record: AtomicBool::new(auto_record),
        }
    }

    pub fn set_recording_enabled(&self, enabled: bool) {
        self.recording_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_auto_record(&self, auto: bool) {
        self.auto_record.store(auto, Ordering::SeqCst);
    }
}

impl SettingsSource for ToggleSettings {
    fn recording_enabled(&self) -> bool {
        self.recording_enabled.load(Ordering::SeqCst)
    }

    fn auto_record_on_session_start(&self) -> bool {
        self.auto_record.load(Ordering::SeqCst)
    }
}

/// Media library that counts saves and can be scripted to fail.
#[derive(Default)]
pub struct MemoryLibrary {
    fail: AtomicBool,
    saves: Mutex<Vec<std::path::PathBuf>>,
}

impl MemoryLibrary {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }
}

impl MediaLibrary for MemoryLibrary {
    fn save_video(&self, path: &Path) -> Result<(), CaptureError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CaptureError::StorageError("library unavailable".into()));
        }
        self.saves.lock().push(path.to_path_buf());
        Ok(())
    }
}

/// Delegate that records every notification for later assertion.
#[derive(Default)]
pub struct CollectingDelegate {
    pub phases: Mutex<Vec<SessionPhase>>,
    pub authorizations: Mutex<Vec<AuthorizationState>>,
    pub ticks: Mutex<Vec<u64>>,
    pub finished: Mutex<Vec<RecordingMetadata>>,
    pub mirror_changes: Mutex<Vec<bool>>,
    pub errors: Mutex<Vec<CaptureError>>,
}

impl SessionDelegate for CollectingDelegate {
    fn on_authorization_changed(&self, state: AuthorizationState) {
        self.authorizations.lock().push(state);
    }

    fn on_phase_changed(&self, phase: SessionPhase) {
        self.phases.lock().push(phase);
    }

    fn on_recording_tick(&self, elapsed_secs: u64) {
        self.ticks.lock().push(elapsed_secs);
    }

    fn on_recording_finished(&self, metadata: &RecordingMetadata) {
        self.finished.lock().push(metadata.clone());
    }

    fn on_mirror_changed(&self, mirrored: bool) {
        self.mirror_changes.lock().push(mirrored);
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }
}

/// Convenience bundle for wiring a `CaptureManager` in tests.
pub struct SimCollaborators {
    pub history: Arc<MemoryHistory>,
    pub settings: Arc<ToggleSettings>,
    pub library: Arc<MemoryLibrary>,
    pub delegate: Arc<CollectingDelegate>,
}

impl SimCollaborators {
    pub fn new(recording_enabled: bool, auto_record: bool) -> Self {
        Self {
            history: Arc::new(MemoryHistory::default()),
            settings: Arc::new(ToggleSettings::new(recording_enabled, auto_record)),
            library: Arc::new(MemoryLibrary::default()),
            delegate: Arc::new(CollectingDelegate::default()),
        }
    }
}
