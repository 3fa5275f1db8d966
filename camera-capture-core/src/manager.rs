use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::lifecycle::coordinator::{AppLifecycleEvent, LifecycleCoordinator};
use crate::mirror::external::ExternalDisplayMirror;
use crate::models::asset::CapturedAsset;
use crate::models::config::{CameraPosition, CaptureConfiguration};
use crate::models::error::CaptureError;
use crate::models::state::{AuthorizationState, SessionPhase};
use crate::recording::controller::RecordingController;
use crate::session::core::SessionCore;
use crate::session::permissions::PermissionGatekeeper;
use crate::traits::backend::{CaptureBackend, InputKind, NormalizedPoint, ScreenHandle};
use crate::traits::collaborators::{HistorySink, MediaLibrary, SettingsSource};
use crate::traits::delegate::SessionDelegate;

/// The single long-lived capture instance an app constructs and injects
/// into whatever owns its UI layer.
///
/// Composes the permission gatekeeper, session core, recording controller,
/// external-display mirror, and lifecycle coordinator, and wires the
/// cross-cutting rules between them: the recording gate on camera
/// switches, the orientation handed to the mirror, and the auto-record
/// hook on explicit session start.
pub struct CaptureManager {
    backend: Arc<dyn CaptureBackend>,
    gatekeeper: Arc<PermissionGatekeeper>,
    core: SessionCore,
    recorder: RecordingController,
    mirror: ExternalDisplayMirror,
    lifecycle: Mutex<LifecycleCoordinator>,
    settings: Arc<dyn SettingsSource>,
    history: Arc<dyn HistorySink>,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
}

impl CaptureManager {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        settings: Arc<dyn SettingsSource>,
        history: Arc<dyn HistorySink>,
        library: Arc<dyn MediaLibrary>,
    ) -> Self {
        let gatekeeper = Arc::new(PermissionGatekeeper::new(Arc::clone(&backend)));
        let recorder = RecordingController::new(
            backend.create_movie_output(),
            Arc::clone(&settings),
            Arc::clone(&history),
            library,
        );
        let core = SessionCore::new(
            Arc::clone(&backend),
            Arc::clone(&gatekeeper),
            recorder.active_flag(),
        );
        let mirror = ExternalDisplayMirror::new(Arc::clone(&backend));

        Self {
            backend,
            gatekeeper,
            core,
            recorder,
            mirror,
            lifecycle: Mutex::new(LifecycleCoordinator::new(Duration::from_millis(500))),
            settings,
            history,
            delegate: Mutex::new(None),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        self.gatekeeper.set_delegate(Arc::clone(&delegate));
        self.core.set_delegate(Arc::clone(&delegate));
        self.recorder.set_delegate(Arc::clone(&delegate));
        self.mirror.set_delegate(Arc::clone(&delegate));
        *self.delegate.lock() = Some(delegate);
    }

    // --- Authorization ---

    pub fn authorization(&self) -> AuthorizationState {
        self.gatekeeper.authorization()
    }

    pub fn check_authorization(&self) -> AuthorizationState {
        self.gatekeeper.check_authorization()
    }

    // --- Session ---

    pub fn configure(&self, config: CaptureConfiguration) -> Result<(), CaptureError> {
        self.recorder.set_output_directory(config.output_directory.clone());
        self.mirror.set_orientation(config.orientation);
        self.lifecycle.lock().set_resume_delay(config.foreground_resume_delay);
        self.core.configure(config)
    }

    /// Start the session. Once running, auto-record kicks in when the
    /// settings say so; the lifecycle resume path deliberately bypasses
    /// this hook.
    pub fn start(&self) -> Result<(), CaptureError> {
        let settings = Arc::clone(&self.settings);
        let recorder = self.recorder.clone();
        self.core.start_with(
            Duration::ZERO,
            Some(Box::new(move || {
                if settings.auto_record_on_session_start() {
                    if let Err(e) = recorder.start_recording() {
                        log::warn!("auto-record on session start failed: {}", e);
                    }
                }
            })),
        )
    }

    pub fn stop(&self) -> Result<(), CaptureError> {
        self.core.stop()
    }

    pub fn phase(&self) -> SessionPhase {
        self.core.phase()
    }

    pub fn current_position(&self) -> CameraPosition {
        self.core.current_position()
    }

    pub fn input_snapshot(&self) -> Vec<(String, InputKind)> {
        self.core.input_snapshot()
    }

    pub fn switch_camera(&self) -> Result<CameraPosition, CaptureError> {
        self.core.switch_camera()
    }

    // --- Zoom / focus ---

    pub fn zoom_scale(&self) -> f32 {
        self.core.zoom_scale()
    }

    pub fn set_zoom(&self, scale: f32) -> Result<f32, CaptureError> {
        self.core.set_zoom(scale)
    }

    pub fn begin_zoom_gesture(&self) {
        self.core.begin_zoom_gesture()
    }

    pub fn update_zoom_gesture(&self, delta: f32) -> Result<f32, CaptureError> {
        self.core.update_zoom_gesture(delta)
    }

    pub fn end_zoom_gesture(&self) {
        self.core.end_zoom_gesture()
    }

    pub fn focus_at(&self, point: NormalizedPoint) -> Result<(), CaptureError> {
        self.core.focus_at(point)
    }

    // --- Recording ---

    pub fn start_recording(&self) -> Result<(), CaptureError> {
        self.recorder.start_recording()
    }

    pub fn stop_recording(&self) -> Result<(), CaptureError> {
        self.recorder.stop_recording()
    }

    pub fn cancel_recording(&self) -> Result<(), CaptureError> {
        self.recorder.cancel_recording()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recording_elapsed_secs(&self) -> u64 {
        self.recorder.elapsed_secs()
    }

    /// Async still capture; the resulting image asset is handed straight
    /// to History.
    pub fn capture_photo(&self) {
        let history = Arc::clone(&self.history);
        let delegate = self.delegate.lock().clone();
        self.backend.capture_still(Box::new(move |result| match result {
            Ok(frame) => {
                history.add_captured_asset(CapturedAsset::image(frame.bytes, frame.thumbnail));
            }
            Err(e) => {
                log::warn!("still capture failed: {}", e);
                if let Some(delegate) = delegate {
                    delegate.on_error(&e);
                }
            }
        }));
    }

    // --- External display ---

    pub fn screen_connected(&self, screen: ScreenHandle) -> Result<(), CaptureError> {
        self.mirror.screen_connected(screen)
    }

    pub fn screen_disconnected(&self, screen_id: &str) {
        self.mirror.screen_disconnected(screen_id)
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror.is_mirrored()
    }

    // --- App lifecycle ---

    pub fn handle_lifecycle_event(&self, event: AppLifecycleEvent) {
        self.lifecycle.lock().handle(event, &self.core, &self.recorder);
    }
}
