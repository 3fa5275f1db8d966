use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    CameraDevice, CameraPosition, CaptureError, NormalizedPoint, ResolutionPreset,
};

/// Focus/exposure state observable through a device probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusState {
    Continuous,
    SingleShot { x: f32, y: f32 },
}

/// Inspectable state shared between a `SimCameraDevice` and the test that
/// holds its probe.
#[derive(Debug, Clone)]
pub struct SimDeviceState {
    pub zoom: f32,
    pub locked: bool,
    pub focus: FocusState,
    pub lock_failures_remaining: u32,
}

impl Default for SimDeviceState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            locked: false,
            focus: FocusState::Continuous,
            lock_failures_remaining: 0,
        }
    }
}

/// Simulated physical camera.
pub struct SimCameraDevice {
    pub(crate) id: String,
    pub(crate) position: CameraPosition,
    pub(crate) max_zoom: f32,
    pub(crate) supported: Vec<ResolutionPreset>,
    pub(crate) state: Arc<Mutex<SimDeviceState>>,
}

impl CameraDevice for SimCameraDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> CameraPosition {
        self.position
    }

    fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    fn supports_preset(&self, preset: ResolutionPreset) -> bool {
        preset == ResolutionPreset::High || self.supported.contains(&preset)
    }

    fn lock_for_configuration(&mut self) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        if state.lock_failures_remaining > 0 {
            state.lock_failures_remaining -= 1;
            return Err(CaptureError::DeviceLockFailed("device busy".into()));
        }
        state.locked = true;
        Ok(())
    }

    fn unlock(&mut self) {
        self.state.lock().locked = false;
    }

    fn set_zoom(&mut self, scale: f32) {
        self.state.lock().zoom = scale;
    }

    fn set_focus_point(&mut self, point: NormalizedPoint) {
        self.state.lock().focus = FocusState::SingleShot { x: point.x, y: point.y };
    }

    fn set_continuous_focus(&mut self) {
        self.state.lock().focus = FocusState::Continuous;
    }
}
