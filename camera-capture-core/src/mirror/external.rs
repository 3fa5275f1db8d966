use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::OrientationMode;
use crate::models::error::CaptureError;
use crate::traits::backend::{CaptureBackend, MirrorSurface, RotationAngle, ScreenHandle};
use crate::traits::delegate::SessionDelegate;

/// Rotation applied to the mirror surface for a given orientation mode.
/// External displays are conventionally landscape, so a portrait feed is
/// rotated a quarter turn.
pub fn mirror_rotation(orientation: OrientationMode) -> RotationAngle {
    match orientation {
        OrientationMode::Landscape => RotationAngle::Deg0,
        OrientationMode::Portrait => RotationAngle::Deg90,
    }
}

/// Owns the secondary output surface mirroring the capture pipeline onto a
/// detected external screen.
///
/// The surface is a second sink on the same live pipeline as the primary
/// preview, not a re-encode, and carries no UI chrome. Strict invariant:
/// at most one live surface; an old surface is always torn down before a
/// new one is built.
pub struct ExternalDisplayMirror {
    backend: Arc<dyn CaptureBackend>,
    surface: Mutex<Option<Box<dyn MirrorSurface>>>,
    attached_screen: Mutex<Option<ScreenHandle>>,
    orientation: Mutex<OrientationMode>,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
}

impl ExternalDisplayMirror {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            surface: Mutex::new(None),
            attached_screen: Mutex::new(None),
            orientation: Mutex::new(OrientationMode::Portrait),
            delegate: Mutex::new(None),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    /// Re-applies the transform to a live surface when the configured
    /// orientation changes.
    pub fn set_orientation(&self, orientation: OrientationMode) {
        *self.orientation.lock() = orientation;
        if let Some(surface) = self.surface.lock().as_mut() {
            surface.set_rotation(mirror_rotation(orientation));
        }
    }

    pub fn is_mirrored(&self) -> bool {
        self.surface.lock().as_ref().map(|s| s.is_live()).unwrap_or(false)
    }

    pub fn attached_screen(&self) -> Option<ScreenHandle> {
        self.attached_screen.lock().clone()
    }

    /// Handle a screen/scene connect notification. Supersedes any existing
    /// mirror: the old surface comes down before the new one goes up.
    pub fn screen_connected(&self, screen: ScreenHandle) -> Result<(), CaptureError> {
        self.tear_down_surface();

        let rotation = mirror_rotation(*self.orientation.lock());
        match self.backend.create_mirror_surface(&screen, rotation) {
            Ok(surface) => {
                log::info!("mirroring to external screen {}", screen.id);
                *self.surface.lock() = Some(surface);
                *self.attached_screen.lock() = Some(screen);
                self.notify(true);
                Ok(())
            }
            Err(e) => {
                *self.attached_screen.lock() = None;
                log::warn!("mirror surface creation failed: {}", e);
                if let Some(delegate) = self.delegate.lock().clone() {
                    delegate.on_error(&e);
                }
                Err(e)
            }
        }
    }

    /// Handle a screen disconnect. Tears down immediately and reports
    /// unmirrored; the primary preview is unaffected.
    pub fn screen_disconnected(&self, screen_id: &str) {
        let matches = self
            .attached_screen
            .lock()
            .as_ref()
            .map(|s| s.id == screen_id)
            .unwrap_or(false);
        if !matches {
            return;
        }

        self.tear_down_surface();
        *self.attached_screen.lock() = None;
        self.notify(false);
    }

    fn tear_down_surface(&self) {
        if let Some(mut surface) = self.surface.lock().take() {
            log::debug!("tearing down mirror surface on {}", surface.screen_id());
            surface.tear_down();
        }
    }

    fn notify(&self, mirrored: bool) {
        if let Some(delegate) = self.delegate.lock().clone() {
            delegate.on_mirror_changed(mirrored);
        }
    }
}
