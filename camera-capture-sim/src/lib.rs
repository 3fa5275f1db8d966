//! # camera-capture-sim
//!
//! Deterministic simulation backend for camera-capture-core.
//!
//! Provides:
//! - `SimBackend`: full `CaptureBackend` implementation with scripted
//!   failure modes and inspection probes
//! - `SimCameraDevice` / `SimPipeline` / `SimMovieOutput` /
//!   `SimMirrorSurface`: the hardware stand-ins
//! - in-memory collaborators (`MemoryHistory`, `ToggleSettings`,
//!   `MemoryLibrary`, `CollectingDelegate`) for wiring a `CaptureManager`
//!   under test
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_capture_core::CaptureManager;
//! use camera_capture_sim::{SimBackend, SimCollaborators};
//!
//! let backend = Arc::new(SimBackend::new());
//! let c = SimCollaborators::new(true, false);
//! let manager = CaptureManager::new(backend, c.settings, c.history, c.library);
//! ```
//!
//! The movie output writes real files and defers finalization to a
//! background thread, so the two-phase cancel path behaves as it does
//! against platform capture APIs.

pub mod backend;
pub mod collaborators;
pub mod device;
pub mod display;
pub mod movie;
pub mod pipeline;

pub use backend::SimBackend;
pub use collaborators::{
    CollectingDelegate, MemoryHistory, MemoryLibrary, SimCollaborators, ToggleSettings,
};
pub use device::{FocusState, SimDeviceState};
pub use display::SimSurfaceProbe;
pub use pipeline::SimPipelineState;
