use std::path::Path;

use crate::models::asset::Thumbnail;
use crate::models::config::{CameraPosition, ResolutionPreset};
use crate::models::error::{CaptureError, DeviceError};
use crate::models::recording::FinishedRecording;
use crate::models::state::AuthorizationState;

/// A point in normalized device coordinates, both axes in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    /// Clamps both axes into the unit square.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// Rotation applied to a mirror surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAngle {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// An externally connected screen, identity plus pixel bounds.
///
/// The core holds this as a relation only; the surface bound to it is the
/// owned resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenHandle {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

/// A physical camera device handle.
///
/// Zoom and focus setters require the configuration lock to be held; the
/// session core guarantees the device is unlocked on every exit path.
pub trait CameraDevice: Send {
    fn id(&self) -> &str;

    fn position(&self) -> CameraPosition;

    /// Upper zoom bound for this lens. Always >= 1.0.
    fn max_zoom(&self) -> f32;

    fn supports_preset(&self, preset: ResolutionPreset) -> bool;

    fn lock_for_configuration(&mut self) -> Result<(), CaptureError>;

    fn unlock(&mut self);

    fn set_zoom(&mut self, scale: f32);

    /// Single-shot auto focus + exposure at `point`.
    fn set_focus_point(&mut self, point: NormalizedPoint);

    /// Revert to continuous auto focus + exposure.
    fn set_continuous_focus(&mut self);
}

/// Kind of a pipeline input binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Video,
    Audio,
}

/// An input binding attached to the capture pipeline.
pub trait CaptureInput: Send {
    fn id(&self) -> &str;

    fn kind(&self) -> InputKind;

    /// Camera position for video inputs, `None` for audio.
    fn position(&self) -> Option<CameraPosition>;
}

/// The platform capture pipeline: inputs plus consuming outputs.
///
/// Interleaved input mutation on a live pipeline is undefined behavior in
/// the underlying capture APIs; the session core serializes all access and
/// wraps mutations in `begin_configuration`/`commit_configuration`.
pub trait CapturePipeline: Send {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    /// Returns false if the hardware rejects the preset; the pipeline keeps
    /// its previous preset in that case.
    fn set_preset(&mut self, preset: ResolutionPreset) -> bool;

    fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), CaptureError>;

    fn remove_input(&mut self, id: &str) -> Option<Box<dyn CaptureInput>>;

    /// Ids and kinds of the currently attached inputs.
    fn inputs(&self) -> Vec<(String, InputKind)>;

    /// Blocking hardware start. Callers run this off the control plane.
    fn start_running(&mut self) -> Result<(), CaptureError>;

    /// Blocking hardware stop.
    fn stop_running(&mut self);

    fn is_running(&self) -> bool;
}

/// Completion for an async authorization request. `true` means granted.
pub type AccessCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Completion for an async movie-write finalization. Fires on a backend
/// thread, possibly well after the stop/cancel request.
pub type RecordingCompletion =
    Box<dyn FnOnce(Result<FinishedRecording, CaptureError>) + Send + 'static>;

/// A still frame delivered by an async photo capture.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub bytes: Vec<u8>,
    pub thumbnail: Option<Thumbnail>,
}

/// Completion for an async still capture.
pub type PhotoCompletion = Box<dyn FnOnce(Result<CapturedFrame, CaptureError>) + Send + 'static>;

/// File-backed movie recording output attached to the pipeline.
pub trait MovieOutput: Send {
    fn is_recording(&self) -> bool;

    fn start_writing(&mut self, path: &Path) -> Result<(), CaptureError>;

    /// Requests finalization. The write cannot be aborted once started;
    /// `completion` fires later once the platform confirms the file state.
    fn finish_writing(&mut self, completion: RecordingCompletion);
}

/// A secondary rendering sink on an external display, reading the same live
/// pipeline as the primary preview. No re-encode, no UI chrome.
pub trait MirrorSurface: Send {
    fn screen_id(&self) -> &str;

    fn set_rotation(&mut self, angle: RotationAngle);

    fn tear_down(&mut self);

    fn is_live(&self) -> bool;
}

/// Platform backend factory and authorization source.
///
/// Implemented by real platform layers (AVFoundation, V4L2) and by the
/// simulation backend in `camera-capture-sim`.
pub trait CaptureBackend: Send + Sync {
    fn authorization_status(&self) -> AuthorizationState;

    /// Issues the platform permission prompt. The completion fires exactly
    /// once, possibly synchronously.
    fn request_access(&self, completion: AccessCompletion);

    /// Resolve the default physical device at `position`.
    fn default_device(&self, position: CameraPosition) -> Option<Box<dyn CameraDevice>>;

    /// Build an input binding for a resolved device.
    fn create_input(&self, device: &dyn CameraDevice) -> Result<Box<dyn CaptureInput>, DeviceError>;

    /// Default microphone input binding.
    fn default_audio_input(&self) -> Result<Box<dyn CaptureInput>, DeviceError>;

    fn create_pipeline(&self) -> Box<dyn CapturePipeline>;

    fn create_movie_output(&self) -> Box<dyn MovieOutput>;

    /// Async still capture from the running pipeline.
    fn capture_still(&self, completion: PhotoCompletion);

    /// Build a full-bounds mirror surface on `screen`, bound to the same
    /// live pipeline as the primary preview.
    fn create_mirror_surface(
        &self,
        screen: &ScreenHandle,
        rotation: RotationAngle,
    ) -> Result<Box<dyn MirrorSurface>, CaptureError>;
}
