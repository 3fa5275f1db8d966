//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Owns the live capture session state machine, recording lifecycle,
//! external-display mirroring, and app-lifecycle coordination. Platform
//! backends (AVFoundation, V4L2, the simulation backend in
//! `camera-capture-sim`) implement the `CaptureBackend` trait family and
//! plug into the generic `CaptureManager`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CaptureBackend family, SessionDelegate, collaborators
//! ├── models/       ← CaptureError, SessionPhase, CaptureConfiguration, CapturedAsset, …
//! ├── session/      ← PermissionGatekeeper, InputSelector, SessionCore
//! ├── recording/    ← RecordingController, file storage + metadata sidecars
//! ├── mirror/       ← ExternalDisplayMirror
//! ├── lifecycle/    ← LifecycleCoordinator
//! └── manager.rs    ← CaptureManager (single long-lived composed instance)
//! ```
//!
//! ## Concurrency model
//!
//! A single-threaded control plane issues commands; blocking hardware
//! start/stop, recording finalization, the elapsed ticker, and the focus
//! settle timer run on named background threads. Reconfiguration commands
//! are serialized and never interleaved.

pub mod lifecycle;
pub mod manager;
pub mod mirror;
pub mod models;
pub mod recording;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use lifecycle::coordinator::{AppLifecycleEvent, LifecycleCoordinator};
pub use manager::CaptureManager;
pub use mirror::external::ExternalDisplayMirror;
pub use models::asset::{AssetPayload, CapturedAsset, MediaKind, Thumbnail};
pub use models::config::{
    CameraPosition, CaptureConfiguration, FrontZoomPolicy, OrientationMode, ResolutionPreset,
};
pub use models::error::{CaptureError, DeviceError};
pub use models::recording::{FinishedRecording, PendingOutcome, RecordingMetadata, RecordingSession};
pub use models::state::{AuthorizationState, SessionPhase};
pub use recording::controller::RecordingController;
pub use session::core::SessionCore;
pub use session::input_selector::InputSelector;
pub use session::permissions::PermissionGatekeeper;
pub use traits::backend::{
    AccessCompletion, CameraDevice, CaptureBackend, CaptureInput, CapturePipeline, CapturedFrame,
    InputKind, MirrorSurface, MovieOutput, NormalizedPoint, PhotoCompletion,
    RecordingCompletion, RotationAngle, ScreenHandle,
};
pub use traits::collaborators::{HistorySink, MediaLibrary, SettingsSource};
pub use traits::delegate::SessionDelegate;
