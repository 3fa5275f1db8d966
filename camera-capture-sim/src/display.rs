use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{MirrorSurface, RotationAngle};

/// Probe a test holds to observe a surface after ownership moved into the
/// mirror component.
#[derive(Clone)]
pub struct SimSurfaceProbe {
    pub screen_id: String,
    pub alive: Arc<AtomicBool>,
    pub rotation: Arc<Mutex<RotationAngle>>,
}

/// Simulated mirror surface on an external screen.
pub struct SimMirrorSurface {
    screen_id: String,
    alive: Arc<AtomicBool>,
    rotation: Arc<Mutex<RotationAngle>>,
}

impl SimMirrorSurface {
    pub(crate) fn new(screen_id: String, rotation: RotationAngle) -> (Self, SimSurfaceProbe) {
        let alive = Arc::new(AtomicBool::new(true));
        let rotation = Arc::new(Mutex::new(rotation));
        let probe = SimSurfaceProbe {
            screen_id: screen_id.clone(),
            alive: Arc::clone(&alive),
            rotation: Arc::clone(&rotation),
        };
        (Self { screen_id, alive, rotation }, probe)
    }
}

impl MirrorSurface for SimMirrorSurface {
    fn screen_id(&self) -> &str {
        &self.screen_id
    }

    fn set_rotation(&mut self, angle: RotationAngle) {
        *self.rotation.lock() = angle;
    }

    fn tear_down(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
