use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::{
    CameraPosition, CaptureConfiguration, FrontZoomPolicy, ResolutionPreset,
};
use crate::models::error::CaptureError;
use crate::models::state::SessionPhase;
use crate::session::input_selector::InputSelector;
use crate::session::permissions::PermissionGatekeeper;
use crate::traits::backend::{
    CameraDevice, CaptureBackend, CapturePipeline, InputKind, NormalizedPoint,
};
use crate::traits::delegate::SessionDelegate;

/// Mutable runtime state, protected by `parking_lot::Mutex`.
struct CoreShared {
    phase: SessionPhase,
    position: CameraPosition,
    zoom_scale: f32,
    /// Scale captured at pinch-gesture start; gesture deltas multiply
    /// against this, not the live scale, to avoid compounding drift.
    zoom_gesture_base: Option<f32>,
    /// Bumped on every focus tap; a settle timer only fires if its
    /// generation is still current.
    focus_generation: u64,
    video_input_id: Option<String>,
    audio_input_id: Option<String>,
}

impl CoreShared {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Unconfigured,
            position: CameraPosition::Back,
            zoom_scale: 1.0,
            zoom_gesture_base: None,
            focus_generation: 0,
            video_input_id: None,
            audio_input_id: None,
        }
    }
}

fn publish_phase(
    shared: &Mutex<CoreShared>,
    delegate: &Option<Arc<dyn SessionDelegate>>,
    phase: SessionPhase,
) {
    shared.lock().phase = phase;
    if let Some(delegate) = delegate {
        delegate.on_phase_changed(phase);
    }
}

/// Clears the reconfiguration-in-flight flag on every exit path.
struct ReconfigureGuard<'a>(&'a AtomicBool);

impl Drop for ReconfigureGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the capture pipeline state machine: configuration, start/stop,
/// camera switch, and focus/exposure/zoom control.
///
/// Phases: `unconfigured → configuring → ready → running ⇄ stopped`.
/// All input-side pipeline mutation is serialized through this type;
/// attached outputs (recording, mirror) never touch input configuration.
/// Blocking hardware start/stop runs on named background threads, with the
/// phase change published afterwards.
pub struct SessionCore {
    backend: Arc<dyn CaptureBackend>,
    gatekeeper: Arc<PermissionGatekeeper>,
    selector: InputSelector,
    pipeline: Arc<Mutex<Box<dyn CapturePipeline>>>,
    /// Active device handle, shared with the focus settle timer. `None`
    /// while unconfigured or torn down; timers fire into it gracefully.
    device: Arc<Mutex<Option<Box<dyn CameraDevice>>>>,
    shared: Arc<Mutex<CoreShared>>,
    config: Mutex<Option<CaptureConfiguration>>,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
    /// Serializes `configure`/`switch_camera`; a second command while one
    /// is in flight is rejected, never interleaved.
    reconfiguring: AtomicBool,
    /// A hardware start is in flight.
    transition_pending: Arc<AtomicBool>,
    /// A hardware stop is in flight. A start issued meanwhile waits for it
    /// to finish, so a stop closely followed by a start lands as running.
    stop_pending: Arc<AtomicBool>,
    /// Set by the recording controller while a recording is active; camera
    /// switches are rejected while it holds.
    recording_gate: Arc<AtomicBool>,
}

impl SessionCore {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        gatekeeper: Arc<PermissionGatekeeper>,
        recording_gate: Arc<AtomicBool>,
    ) -> Self {
        let pipeline = backend.create_pipeline();
        Self {
            selector: InputSelector::new(Arc::clone(&backend)),
            backend,
            gatekeeper,
            pipeline: Arc::new(Mutex::new(pipeline)),
            device: Arc::new(Mutex::new(None)),
            shared: Arc::new(Mutex::new(CoreShared::new())),
            config: Mutex::new(None),
            delegate: Mutex::new(None),
            reconfiguring: AtomicBool::new(false),
            transition_pending: Arc::new(AtomicBool::new(false)),
            stop_pending: Arc::new(AtomicBool::new(false)),
            recording_gate,
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.lock().phase
    }

    pub fn current_position(&self) -> CameraPosition {
        self.shared.lock().position
    }

    pub fn zoom_scale(&self) -> f32 {
        self.shared.lock().zoom_scale
    }

    pub fn configuration(&self) -> Option<CaptureConfiguration> {
        self.config.lock().clone()
    }

    /// Ids and kinds of the inputs currently attached to the pipeline.
    pub fn input_snapshot(&self) -> Vec<(String, InputKind)> {
        self.pipeline.lock().inputs()
    }

    fn set_phase(&self, phase: SessionPhase) {
        publish_phase(&self.shared, &self.delegate.lock().clone(), phase);
    }

    /// Apply `config`, fully tearing down any existing inputs first.
    ///
    /// Valid from `Unconfigured`/`Ready`/`Stopped` and idempotent; repeated
    /// calls never accumulate stale inputs. Preset mismatch falls through
    /// the preference list and never fails configuration on its own.
    pub fn configure(&self, config: CaptureConfiguration) -> Result<(), CaptureError> {
        self.gatekeeper.require_authorized()?;

        if self.reconfiguring.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::ReconfigurationInProgress);
        }
        let _guard = ReconfigureGuard(&self.reconfiguring);

        if !self.phase().can_configure() {
            return Err(CaptureError::ConfigurationFailed(
                "configure only valid from unconfigured, ready, or stopped".into(),
            ));
        }
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        self.set_phase(SessionPhase::Configuring);

        let mut pipeline = self.pipeline.lock();
        pipeline.begin_configuration();

        // Tear down everything from any previous pass.
        for (id, _) in pipeline.inputs() {
            pipeline.remove_input(&id);
        }
        *self.device.lock() = None;
        {
            let mut shared = self.shared.lock();
            shared.video_input_id = None;
            shared.audio_input_id = None;
        }

        let (device, input) = match self.selector.select(config.position) {
            Ok(pair) => pair,
            Err(e) => {
                pipeline.commit_configuration();
                drop(pipeline);
                self.set_phase(SessionPhase::Unconfigured);
                return Err(e.into());
            }
        };

        let preset = config
            .preset_preference
            .iter()
            .copied()
            .find(|p| device.supports_preset(*p))
            .unwrap_or(ResolutionPreset::High);
        if !pipeline.set_preset(preset) && !pipeline.set_preset(ResolutionPreset::High) {
            log::warn!("pipeline rejected every preset, keeping its default");
        }

        let video_id = input.id().to_string();
        if let Err(e) = pipeline.add_input(input) {
            pipeline.commit_configuration();
            drop(pipeline);
            self.set_phase(SessionPhase::Unconfigured);
            return Err(e);
        }

        let mut audio_id = None;
        if config.enable_audio_capture {
            match self.backend.default_audio_input() {
                Ok(audio) => {
                    let id = audio.id().to_string();
                    match pipeline.add_input(audio) {
                        Ok(()) => audio_id = Some(id),
                        Err(e) => log::warn!("audio input rejected, continuing without: {}", e),
                    }
                }
                Err(e) => log::warn!("no audio input available: {}", e),
            }
        }

        pipeline.commit_configuration();
        drop(pipeline);

        {
            let mut shared = self.shared.lock();
            shared.position = config.position;
            shared.zoom_scale = 1.0;
            shared.zoom_gesture_base = None;
            shared.video_input_id = Some(video_id);
            shared.audio_input_id = audio_id;
        }
        *self.device.lock() = Some(device);
        *self.config.lock() = Some(config);

        self.set_phase(SessionPhase::Ready);
        Ok(())
    }

    /// Start the session. Idempotent; the blocking hardware call runs on a
    /// background thread and the `Running` phase is published afterwards.
    pub fn start(&self) -> Result<(), CaptureError> {
        self.start_with(Duration::ZERO, None)
    }

    /// Start after a deliberate delay (foreground resume path).
    pub fn start_after(&self, delay: Duration) -> Result<(), CaptureError> {
        self.start_with(delay, None)
    }

    pub(crate) fn start_with(
        &self,
        delay: Duration,
        on_started: Option<Box<dyn FnOnce() + Send>>,
    ) -> Result<(), CaptureError> {
        let phase = self.phase();
        if phase.is_running() && !self.stop_pending.load(Ordering::SeqCst) {
            return Ok(());
        }
        if !matches!(
            phase,
            SessionPhase::Ready | SessionPhase::Stopped | SessionPhase::Running
        ) {
            return Err(CaptureError::ConfigurationFailed(
                "session not configured".into(),
            ));
        }
        if self.transition_pending.swap(true, Ordering::SeqCst) {
            // A start is already in flight.
            return Ok(());
        }

        let pipeline = Arc::clone(&self.pipeline);
        let shared = Arc::clone(&self.shared);
        let transition = Arc::clone(&self.transition_pending);
        let stop_pending = Arc::clone(&self.stop_pending);
        let delegate = self.delegate.lock().clone();

        thread::Builder::new()
            .name("capture-start".into())
            .spawn(move || {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                // An in-flight stop must land first, so a stop closely
                // followed by this start still ends up running.
                while stop_pending.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(5));
                }

                let mut pipeline = pipeline.lock();
                if pipeline.is_running() {
                    transition.store(false, Ordering::SeqCst);
                    return;
                }
                let result = pipeline.start_running();
                drop(pipeline);

                transition.store(false, Ordering::SeqCst);
                match result {
                    Ok(()) => {
                        publish_phase(&shared, &delegate, SessionPhase::Running);
                        if let Some(on_started) = on_started {
                            on_started();
                        }
                    }
                    Err(e) => {
                        log::error!("hardware start failed: {}", e);
                        if let Some(delegate) = delegate {
                            delegate.on_error(&e);
                        }
                    }
                }
            })
            .expect("failed to spawn capture-start thread");

        Ok(())
    }

    /// Stop the session. Idempotent; hardware stop runs off-thread.
    pub fn stop(&self) -> Result<(), CaptureError> {
        let phase = self.phase();
        if !phase.is_running() && !self.transition_pending.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self.stop_pending.swap(true, Ordering::SeqCst) {
            // A stop is already in flight.
            return Ok(());
        }

        let pipeline = Arc::clone(&self.pipeline);
        let shared = Arc::clone(&self.shared);
        let stop_pending = Arc::clone(&self.stop_pending);
        let delegate = self.delegate.lock().clone();

        thread::Builder::new()
            .name("capture-stop".into())
            .spawn(move || {
                let mut pipeline = pipeline.lock();
                if pipeline.is_running() {
                    pipeline.stop_running();
                }
                drop(pipeline);

                let was_stopped = shared.lock().phase == SessionPhase::Stopped;
                if !was_stopped {
                    publish_phase(&shared, &delegate, SessionPhase::Stopped);
                }
                stop_pending.store(false, Ordering::SeqCst);
            })
            .expect("failed to spawn capture-stop thread");

        Ok(())
    }

    /// Atomically swap to the opposite camera.
    ///
    /// On success zoom resets to 1.0 (zoom ranges differ per lens); on
    /// failure the selector restores the previous input and the position is
    /// unchanged. Rejected while a recording is in flight.
    pub fn switch_camera(&self) -> Result<CameraPosition, CaptureError> {
        self.gatekeeper.require_authorized()?;

        if self.recording_gate.load(Ordering::SeqCst) {
            log::warn!("camera switch ignored while recording");
            return Err(CaptureError::AlreadyRecording);
        }

        if self.reconfiguring.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::ReconfigurationInProgress);
        }
        let _guard = ReconfigureGuard(&self.reconfiguring);

        let (current, video_id) = {
            let shared = self.shared.lock();
            let id = shared.video_input_id.clone().ok_or_else(|| {
                CaptureError::ConfigurationFailed("no active video input".into())
            })?;
            (shared.position, id)
        };
        let target = current.opposite();

        let mut pipeline = self.pipeline.lock();
        pipeline.begin_configuration();
        let switched = self.selector.switch(&mut **pipeline, &video_id, target);
        pipeline.commit_configuration();
        drop(pipeline);

        let (device, new_id) = switched?;

        {
            let mut shared = self.shared.lock();
            shared.position = target;
            shared.zoom_scale = 1.0;
            shared.zoom_gesture_base = None;
            shared.video_input_id = Some(new_id);
        }
        *self.device.lock() = Some(device);

        if let Err(e) = self.with_locked_device(|d| d.set_zoom(1.0)) {
            log::warn!("zoom reset after switch abandoned: {}", e);
        }

        Ok(target)
    }

    /// Set the zoom scale, clamped to `[1.0, device max]`. Returns the
    /// scale actually applied. A no-op on the front camera unless the
    /// configured policy allows it.
    pub fn set_zoom(&self, requested: f32) -> Result<f32, CaptureError> {
        let position = self.current_position();
        let policy = self
            .configuration()
            .map(|c| c.front_zoom_policy)
            .unwrap_or(FrontZoomPolicy::Disabled);
        if position == CameraPosition::Front && policy == FrontZoomPolicy::Disabled {
            log::debug!("zoom ignored on front camera");
            return Ok(self.zoom_scale());
        }

        let applied = self.with_locked_device(|device| {
            let clamped = requested.clamp(1.0, device.max_zoom());
            device.set_zoom(clamped);
            clamped
        })?;

        self.shared.lock().zoom_scale = applied;
        Ok(applied)
    }

    /// Capture the live scale as the base for an incoming pinch gesture.
    pub fn begin_zoom_gesture(&self) {
        let mut shared = self.shared.lock();
        shared.zoom_gesture_base = Some(shared.zoom_scale);
    }

    /// Apply a pinch delta against the gesture-start scale.
    pub fn update_zoom_gesture(&self, delta: f32) -> Result<f32, CaptureError> {
        let base = {
            let shared = self.shared.lock();
            shared.zoom_gesture_base.unwrap_or(shared.zoom_scale)
        };
        self.set_zoom(base * delta)
    }

    pub fn end_zoom_gesture(&self) {
        self.shared.lock().zoom_gesture_base = None;
    }

    /// Single-shot focus + exposure at `point`, reverting to continuous
    /// auto after the configured settle delay. A second tap before the
    /// timer fires restarts the clock from the new point; a timer firing
    /// after teardown is a no-op.
    pub fn focus_at(&self, point: NormalizedPoint) -> Result<(), CaptureError> {
        self.with_locked_device(|device| device.set_focus_point(point))?;

        let generation = {
            let mut shared = self.shared.lock();
            shared.focus_generation += 1;
            shared.focus_generation
        };
        let settle = self
            .configuration()
            .map(|c| c.focus_settle_delay)
            .unwrap_or(Duration::from_secs(2));

        let shared = Arc::clone(&self.shared);
        let device = Arc::clone(&self.device);

        thread::Builder::new()
            .name("focus-settle".into())
            .spawn(move || {
                thread::sleep(settle);
                if shared.lock().focus_generation != generation {
                    return; // superseded by a later tap
                }
                let mut slot = device.lock();
                let Some(device) = slot.as_deref_mut() else {
                    return; // device torn down, nothing to revert
                };
                match device.lock_for_configuration() {
                    Ok(()) => {
                        device.set_continuous_focus();
                        device.unlock();
                    }
                    Err(e) => log::warn!("focus settle revert abandoned: {}", e),
                }
            })
            .expect("failed to spawn focus-settle thread");

        Ok(())
    }

    /// Runs `f` with the device configuration lock held; the device is
    /// unlocked on every exit path. Lock failures abandon the change and
    /// leave the prior configuration intact.
    fn with_locked_device<R>(
        &self,
        f: impl FnOnce(&mut dyn CameraDevice) -> R,
    ) -> Result<R, CaptureError> {
        let mut slot = self.device.lock();
        let device = slot
            .as_deref_mut()
            .ok_or_else(|| CaptureError::ConfigurationFailed("no active device".into()))?;
        device.lock_for_configuration()?;
        let out = f(device);
        device.unlock();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use approx::assert_relative_eq;
    use parking_lot::Mutex;

    use crate::models::error::DeviceError;
    use crate::models::state::AuthorizationState;
    use crate::traits::backend::{
        AccessCompletion, CaptureInput, MirrorSurface, MovieOutput, PhotoCompletion,
        RotationAngle, ScreenHandle,
    };

    use super::*;

    #[derive(Default)]
    struct DeviceProbe {
        zoom: f32,
        locked: bool,
        focus: Option<FocusProbe>,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum FocusProbe {
        SingleShot(f32, f32),
        Continuous,
    }

    struct FakeDevice {
        position: CameraPosition,
        max_zoom: f32,
        supported: Vec<ResolutionPreset>,
        probe: Arc<Mutex<DeviceProbe>>,
    }

    impl CameraDevice for FakeDevice {
        fn id(&self) -> &str {
            "fake-device"
        }
        fn position(&self) -> CameraPosition {
            self.position
        }
        fn max_zoom(&self) -> f32 {
            self.max_zoom
        }
        fn supports_preset(&self, preset: ResolutionPreset) -> bool {
            self.supported.contains(&preset)
        }
        fn lock_for_configuration(&mut self) -> Result<(), CaptureError> {
            self.probe.lock().locked = true;
            Ok(())
        }
        fn unlock(&mut self) {
            self.probe.lock().locked = false;
        }
        fn set_zoom(&mut self, scale: f32) {
            self.probe.lock().zoom = scale;
        }
        fn set_focus_point(&mut self, point: NormalizedPoint) {
            self.probe.lock().focus = Some(FocusProbe::SingleShot(point.x, point.y));
        }
        fn set_continuous_focus(&mut self) {
            self.probe.lock().focus = Some(FocusProbe::Continuous);
        }
    }

    struct FakeInput {
        id: String,
        kind: InputKind,
        position: Option<CameraPosition>,
    }

    impl CaptureInput for FakeInput {
        fn id(&self) -> &str {
            &self.id
        }
        fn kind(&self) -> InputKind {
            self.kind
        }
        fn position(&self) -> Option<CameraPosition> {
            self.position
        }
    }

    #[derive(Default)]
    struct PipelineProbe {
        preset: Option<ResolutionPreset>,
        start_calls: usize,
    }

    /// One-shot gate holding the next video-input add until released, so a
    /// test can observe a reconfiguration mid-flight.
    struct AddGate {
        armed: AtomicBool,
        entered: Barrier,
        release: Barrier,
    }

    impl Default for AddGate {
        fn default() -> Self {
            Self {
                armed: AtomicBool::new(false),
                entered: Barrier::new(2),
                release: Barrier::new(2),
            }
        }
    }

    struct FakePipeline {
        inputs: Vec<Box<dyn CaptureInput>>,
        running: bool,
        probe: Arc<Mutex<PipelineProbe>>,
        gate: Arc<AddGate>,
    }

    impl CapturePipeline for FakePipeline {
        fn begin_configuration(&mut self) {}
        fn commit_configuration(&mut self) {}
        fn set_preset(&mut self, preset: ResolutionPreset) -> bool {
            self.probe.lock().preset = Some(preset);
            true
        }
        fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), CaptureError> {
            if input.kind() == InputKind::Video && self.gate.armed.swap(false, Ordering::SeqCst) {
                self.gate.entered.wait();
                self.gate.release.wait();
            }
            self.inputs.push(input);
            Ok(())
        }
        fn remove_input(&mut self, id: &str) -> Option<Box<dyn CaptureInput>> {
            let index = self.inputs.iter().position(|i| i.id() == id)?;
            Some(self.inputs.remove(index))
        }
        fn inputs(&self) -> Vec<(String, InputKind)> {
            self.inputs.iter().map(|i| (i.id().to_string(), i.kind())).collect()
        }
        fn start_running(&mut self) -> Result<(), CaptureError> {
            self.probe.lock().start_calls += 1;
            self.running = true;
            Ok(())
        }
        fn stop_running(&mut self) {
            self.running = false;
        }
        fn is_running(&self) -> bool {
            self.running
        }
    }

    struct FakeBackend {
        back_probe: Arc<Mutex<DeviceProbe>>,
        front_probe: Arc<Mutex<DeviceProbe>>,
        pipeline_probe: Arc<Mutex<PipelineProbe>>,
        back_supported: Vec<ResolutionPreset>,
        input_seq: Mutex<u32>,
        gate: Arc<AddGate>,
    }

    impl FakeBackend {
        fn new(back_supported: Vec<ResolutionPreset>) -> Self {
            Self {
                back_probe: Arc::new(Mutex::new(DeviceProbe::default())),
                front_probe: Arc::new(Mutex::new(DeviceProbe::default())),
                pipeline_probe: Arc::new(Mutex::new(PipelineProbe::default())),
                back_supported,
                input_seq: Mutex::new(0),
                gate: Arc::new(AddGate::default()),
            }
        }
    }

    impl CaptureBackend for FakeBackend {
        fn authorization_status(&self) -> AuthorizationState {
            AuthorizationState::Authorized
        }
        fn request_access(&self, completion: AccessCompletion) {
            completion(true);
        }
        fn default_device(&self, position: CameraPosition) -> Option<Box<dyn CameraDevice>> {
            let (probe, max_zoom, supported) = match position {
                CameraPosition::Back => {
                    (Arc::clone(&self.back_probe), 8.0, self.back_supported.clone())
                }
                CameraPosition::Front => (
                    Arc::clone(&self.front_probe),
                    4.0,
                    vec![ResolutionPreset::High],
                ),
            };
            Some(Box::new(FakeDevice { position, max_zoom, supported, probe }))
        }
        fn create_input(
            &self,
            device: &dyn CameraDevice,
        ) -> Result<Box<dyn CaptureInput>, DeviceError> {
            let mut seq = self.input_seq.lock();
            *seq += 1;
            Ok(Box::new(FakeInput {
                id: format!("video-{}-{:?}", *seq, device.position()),
                kind: InputKind::Video,
                position: Some(device.position()),
            }))
        }
        fn default_audio_input(&self) -> Result<Box<dyn CaptureInput>, DeviceError> {
            let mut seq = self.input_seq.lock();
            *seq += 1;
            Ok(Box::new(FakeInput {
                id: format!("audio-{}", *seq),
                kind: InputKind::Audio,
                position: None,
            }))
        }
        fn create_pipeline(&self) -> Box<dyn CapturePipeline> {
            Box::new(FakePipeline {
                inputs: Vec::new(),
                running: false,
                probe: Arc::clone(&self.pipeline_probe),
                gate: Arc::clone(&self.gate),
            })
        }
        fn create_movie_output(&self) -> Box<dyn MovieOutput> {
            unimplemented!("not exercised")
        }
        fn capture_still(&self, _: PhotoCompletion) {}
        fn create_mirror_surface(
            &self,
            _: &ScreenHandle,
            _: RotationAngle,
        ) -> Result<Box<dyn MirrorSurface>, CaptureError> {
            Err(CaptureError::MirrorFailed("unsupported".into()))
        }
    }

    fn core_with(backend: Arc<FakeBackend>) -> SessionCore {
        let gatekeeper = Arc::new(PermissionGatekeeper::new(
            Arc::clone(&backend) as Arc<dyn CaptureBackend>
        ));
        SessionCore::new(
            backend as Arc<dyn CaptureBackend>,
            gatekeeper,
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn repeated_configure_never_accumulates_inputs() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));

        for _ in 0..5 {
            core.configure(CaptureConfiguration::default()).unwrap();
        }

        let inputs = core.input_snapshot();
        let videos = inputs.iter().filter(|(_, k)| *k == InputKind::Video).count();
        let audios = inputs.iter().filter(|(_, k)| *k == InputKind::Audio).count();
        assert_eq!(videos, 1);
        assert_eq!(audios, 1);
        assert_eq!(core.phase(), SessionPhase::Ready);
    }

    #[test]
    fn preset_preference_first_supported_wins() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd720]));
        let core = core_with(Arc::clone(&backend));

        core.configure(CaptureConfiguration {
            preset_preference: vec![
                ResolutionPreset::Uhd2160,
                ResolutionPreset::Hd1080,
                ResolutionPreset::Hd720,
            ],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(backend.pipeline_probe.lock().preset, Some(ResolutionPreset::Hd720));
    }

    #[test]
    fn unsupported_preference_falls_back_to_high() {
        let backend = Arc::new(FakeBackend::new(vec![]));
        let core = core_with(Arc::clone(&backend));

        core.configure(CaptureConfiguration {
            preset_preference: vec![ResolutionPreset::Uhd2160],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(backend.pipeline_probe.lock().preset, Some(ResolutionPreset::High));
    }

    #[test]
    fn zoom_clamps_to_device_range() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration::default()).unwrap();

        assert_relative_eq!(core.set_zoom(0.2).unwrap(), 1.0);
        assert_relative_eq!(core.set_zoom(99.0).unwrap(), 8.0);
        assert_relative_eq!(backend.back_probe.lock().zoom, 8.0);
        assert!(!backend.back_probe.lock().locked);
    }

    #[test]
    fn gesture_zoom_multiplies_against_gesture_start_scale() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration::default()).unwrap();

        core.set_zoom(2.0).unwrap();
        core.begin_zoom_gesture();
        assert_relative_eq!(core.update_zoom_gesture(1.5).unwrap(), 3.0);
        // Same base, not the live scale: no compounding.
        assert_relative_eq!(core.update_zoom_gesture(2.0).unwrap(), 4.0);
        core.end_zoom_gesture();
    }

    #[test]
    fn front_zoom_disabled_by_default_policy() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration {
            position: CameraPosition::Front,
            ..Default::default()
        })
        .unwrap();

        assert_relative_eq!(core.set_zoom(3.0).unwrap(), 1.0);
        assert_relative_eq!(backend.front_probe.lock().zoom, 0.0); // untouched
    }

    #[test]
    fn front_zoom_policy_can_allow() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration {
            position: CameraPosition::Front,
            front_zoom_policy: FrontZoomPolicy::Allowed,
            ..Default::default()
        })
        .unwrap();

        assert_relative_eq!(core.set_zoom(3.0).unwrap(), 3.0);
        assert_relative_eq!(backend.front_probe.lock().zoom, 3.0);
    }

    #[test]
    fn switch_resets_zoom_and_flips_position() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration::default()).unwrap();

        core.set_zoom(5.0).unwrap();
        let target = core.switch_camera().unwrap();
        assert_eq!(target, CameraPosition::Front);
        assert_eq!(core.current_position(), CameraPosition::Front);
        assert_relative_eq!(core.zoom_scale(), 1.0);
        assert_relative_eq!(backend.front_probe.lock().zoom, 1.0);

        let inputs = core.input_snapshot();
        let videos = inputs.iter().filter(|(_, k)| *k == InputKind::Video).count();
        assert_eq!(videos, 1);
    }

    #[test]
    fn switch_rejected_while_recording() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let gatekeeper = Arc::new(PermissionGatekeeper::new(
            Arc::clone(&backend) as Arc<dyn CaptureBackend>
        ));
        let gate = Arc::new(AtomicBool::new(false));
        let core = SessionCore::new(
            Arc::clone(&backend) as Arc<dyn CaptureBackend>,
            gatekeeper,
            Arc::clone(&gate),
        );
        core.configure(CaptureConfiguration::default()).unwrap();

        gate.store(true, Ordering::SeqCst);
        assert!(matches!(core.switch_camera(), Err(CaptureError::AlreadyRecording)));
        assert_eq!(core.current_position(), CameraPosition::Back);

        gate.store(false, Ordering::SeqCst);
        assert!(core.switch_camera().is_ok());
    }

    #[test]
    fn focus_settles_back_to_continuous() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration {
            focus_settle_delay: Duration::from_millis(30),
            ..Default::default()
        })
        .unwrap();

        core.focus_at(NormalizedPoint::new(0.5, 0.5)).unwrap();
        assert_eq!(
            backend.back_probe.lock().focus,
            Some(FocusProbe::SingleShot(0.5, 0.5))
        );

        thread::sleep(Duration::from_millis(200));
        assert_eq!(backend.back_probe.lock().focus, Some(FocusProbe::Continuous));
        assert!(!backend.back_probe.lock().locked);
    }

    #[test]
    fn second_tap_restarts_settle_from_new_point() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(Arc::clone(&backend));
        core.configure(CaptureConfiguration {
            focus_settle_delay: Duration::from_millis(80),
            ..Default::default()
        })
        .unwrap();

        core.focus_at(NormalizedPoint::new(0.2, 0.2)).unwrap();
        thread::sleep(Duration::from_millis(30));
        core.focus_at(NormalizedPoint::new(0.8, 0.8)).unwrap();

        // First timer expires here, but its generation is stale.
        thread::sleep(Duration::from_millis(60));
        assert_eq!(
            backend.back_probe.lock().focus,
            Some(FocusProbe::SingleShot(0.8, 0.8))
        );

        thread::sleep(Duration::from_millis(150));
        assert_eq!(backend.back_probe.lock().focus, Some(FocusProbe::Continuous));
    }

    #[test]
    fn concurrent_reconfiguration_is_rejected_not_interleaved() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = Arc::new(core_with(Arc::clone(&backend)));
        core.configure(CaptureConfiguration::default()).unwrap();

        // Hold the switch open at its video-input add.
        backend.gate.armed.store(true, Ordering::SeqCst);
        let switcher = {
            let core = Arc::clone(&core);
            thread::spawn(move || core.switch_camera())
        };
        backend.gate.entered.wait();

        assert!(matches!(
            core.configure(CaptureConfiguration::default()),
            Err(CaptureError::ReconfigurationInProgress)
        ));
        assert!(matches!(
            core.switch_camera(),
            Err(CaptureError::ReconfigurationInProgress)
        ));

        backend.gate.release.wait();
        assert_eq!(switcher.join().unwrap().unwrap(), CameraPosition::Front);

        // The guard is released once the switch lands.
        core.configure(CaptureConfiguration::default()).unwrap();
    }

    #[test]
    fn start_unconfigured_is_an_error() {
        let backend = Arc::new(FakeBackend::new(vec![ResolutionPreset::Hd1080]));
        let core = core_with(backend);
        assert!(matches!(
            core.start(),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }
}
