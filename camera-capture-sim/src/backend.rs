use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::{
    AccessCompletion, AuthorizationState, CameraDevice, CameraPosition, CaptureBackend,
    CaptureError, CaptureInput, CapturePipeline, CapturedFrame, DeviceError, InputKind,
    MirrorSurface, MovieOutput, PhotoCompletion, ResolutionPreset, RotationAngle, ScreenHandle,
    Thumbnail,
};

use crate::device::{SimCameraDevice, SimDeviceState};
use crate::display::{SimMirrorSurface, SimSurfaceProbe};
use crate::movie::SimMovieOutput;
use crate::pipeline::{SimInput, SimPipeline, SimPipelineState};

/// Deterministic in-memory capture backend.
///
/// Devices, pipeline, movie output, and mirror surfaces all expose probes
/// so a test can observe state after ownership moves into the core.
/// Failure modes (missing device, rejected input binding, write failure,
/// denied permission) are scripted per test.
pub struct SimBackend {
    authorization: Mutex<AuthorizationState>,
    grant_on_request: AtomicBool,
    devices: Mutex<HashMap<CameraPosition, Arc<Mutex<SimDeviceState>>>>,
    missing_positions: Mutex<Vec<CameraPosition>>,
    back_presets: Vec<ResolutionPreset>,
    front_presets: Vec<ResolutionPreset>,
    pipeline_state: Arc<Mutex<SimPipelineState>>,
    reject_next_add: Arc<Mutex<Option<CameraPosition>>>,
    finish_delay: Duration,
    fail_finish: Arc<AtomicBool>,
    write_empty_file: Arc<AtomicBool>,
    fail_still_capture: AtomicBool,
    surfaces: Mutex<Vec<SimSurfaceProbe>>,
    input_seq: Mutex<u32>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            authorization: Mutex::new(AuthorizationState::Authorized),
            grant_on_request: AtomicBool::new(true),
            devices: Mutex::new(HashMap::new()),
            missing_positions: Mutex::new(Vec::new()),
            back_presets: vec![ResolutionPreset::Hd1080, ResolutionPreset::Hd720],
            front_presets: vec![ResolutionPreset::Hd720],
            pipeline_state: Arc::new(Mutex::new(SimPipelineState::default())),
            reject_next_add: Arc::new(Mutex::new(None)),
            finish_delay: Duration::from_millis(20),
            fail_finish: Arc::new(AtomicBool::new(false)),
            write_empty_file: Arc::new(AtomicBool::new(false)),
            fail_still_capture: AtomicBool::new(false),
            surfaces: Mutex::new(Vec::new()),
            input_seq: Mutex::new(0),
        }
    }

    // --- Scripting ---

    pub fn with_authorization(self, state: AuthorizationState, grant_on_request: bool) -> Self {
        *self.authorization.lock() = state;
        self.grant_on_request.store(grant_on_request, Ordering::SeqCst);
        self
    }

    pub fn with_finish_delay(mut self, delay: Duration) -> Self {
        self.finish_delay = delay;
        self
    }

    /// Remove the device at `position` from the simulated hardware.
    pub fn remove_position(&self, position: CameraPosition) {
        self.missing_positions.lock().push(position);
    }

    /// Make the next video-input add for `position` fail, as if the device
    /// were claimed by another process.
    pub fn reject_next_video_input(&self, position: CameraPosition) {
        *self.reject_next_add.lock() = Some(position);
    }

    pub fn fail_next_finish(&self, fail: bool) {
        self.fail_finish.store(fail, Ordering::SeqCst);
    }

    pub fn write_empty_files(&self, empty: bool) {
        self.write_empty_file.store(empty, Ordering::SeqCst);
    }

    pub fn fail_still_capture(&self, fail: bool) {
        self.fail_still_capture.store(fail, Ordering::SeqCst);
    }

    // --- Probes ---

    pub fn device_state(&self, position: CameraPosition) -> Arc<Mutex<SimDeviceState>> {
        Arc::clone(
            self.devices
                .lock()
                .entry(position)
                .or_insert_with(|| Arc::new(Mutex::new(SimDeviceState::default()))),
        )
    }

    pub fn pipeline_state(&self) -> SimPipelineState {
        self.pipeline_state.lock().clone()
    }

    /// Probes for every mirror surface ever created, in creation order.
    pub fn surface_probes(&self) -> Vec<SimSurfaceProbe> {
        self.surfaces.lock().clone()
    }

    fn presets_for(&self, position: CameraPosition) -> Vec<ResolutionPreset> {
        match position {
            CameraPosition::Back => self.back_presets.clone(),
            CameraPosition::Front => self.front_presets.clone(),
        }
    }

    fn next_input_id(&self, prefix: &str) -> String {
        let mut seq = self.input_seq.lock();
        *seq += 1;
        format!("{}-{}", prefix, *seq)
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for SimBackend {
    fn authorization_status(&self) -> AuthorizationState {
        *self.authorization.lock()
    }

    fn request_access(&self, completion: AccessCompletion) {
        let granted = self.grant_on_request.load(Ordering::SeqCst);
        *self.authorization.lock() = if granted {
            AuthorizationState::Authorized
        } else {
            AuthorizationState::Denied
        };
        completion(granted);
    }

    fn default_device(&self, position: CameraPosition) -> Option<Box<dyn CameraDevice>> {
        if self.missing_positions.lock().contains(&position) {
            return None;
        }
        let max_zoom = match position {
            CameraPosition::Back => 8.0,
            CameraPosition::Front => 4.0,
        };
        Some(Box::new(SimCameraDevice {
            id: format!("sim-camera-{:?}", position).to_lowercase(),
            position,
            max_zoom,
            supported: self.presets_for(position),
            state: self.device_state(position),
        }))
    }

    fn create_input(&self, device: &dyn CameraDevice) -> Result<Box<dyn CaptureInput>, DeviceError> {
        Ok(Box::new(SimInput {
            id: self.next_input_id("video"),
            kind: InputKind::Video,
            position: Some(device.position()),
        }))
    }

    fn default_audio_input(&self) -> Result<Box<dyn CaptureInput>, DeviceError> {
        Ok(Box::new(SimInput {
            id: self.next_input_id("audio"),
            kind: InputKind::Audio,
            position: None,
        }))
    }

    fn create_pipeline(&self) -> Box<dyn CapturePipeline> {
        Box::new(SimPipeline::new(
            Arc::clone(&self.pipeline_state),
            Arc::clone(&self.reject_next_add),
        ))
    }

    fn create_movie_output(&self) -> Box<dyn MovieOutput> {
        Box::new(SimMovieOutput::new(
            self.finish_delay,
            Arc::clone(&self.fail_finish),
            Arc::clone(&self.write_empty_file),
        ))
    }

    fn capture_still(&self, completion: PhotoCompletion) {
        if self.fail_still_capture.load(Ordering::SeqCst) {
            completion(Err(CaptureError::RecordingFailed("still capture failed".into())));
            return;
        }
        completion(Ok(CapturedFrame {
            bytes: vec![0x7f; 1024],
            thumbnail: Some(Thumbnail {
                width: 16,
                height: 9,
                rgba: vec![0u8; 16 * 9 * 4],
            }),
        }));
    }

    fn create_mirror_surface(
        &self,
        screen: &ScreenHandle,
        rotation: RotationAngle,
    ) -> Result<Box<dyn MirrorSurface>, CaptureError> {
        if !self.pipeline_state.lock().running {
            log::debug!("mirror surface created on a stopped pipeline");
        }
        let (surface, probe) = SimMirrorSurface::new(screen.id.clone(), rotation);
        self.surfaces.lock().push(probe);
        Ok(Box::new(surface))
    }
}
