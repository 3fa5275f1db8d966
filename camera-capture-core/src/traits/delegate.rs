use crate::models::error::CaptureError;
use crate::models::recording::RecordingMetadata;
use crate::models::state::{AuthorizationState, SessionPhase};

/// Event delegate for session notifications.
///
/// Methods are called from whichever thread completes the work: hardware
/// start/stop threads, the recording ticker, or write-finalize callbacks.
/// Implementations should marshal to the UI thread if needed.
pub trait SessionDelegate: Send + Sync {
    /// Called exactly once when an undetermined authorization resolves, and
    /// never again afterwards.
    fn on_authorization_changed(&self, state: AuthorizationState);

    fn on_phase_changed(&self, phase: SessionPhase);

    /// Called once per second while a recording is active.
    fn on_recording_tick(&self, elapsed_secs: u64);

    /// Called when a kept recording is finalized and handed to History.
    fn on_recording_finished(&self, metadata: &RecordingMetadata);

    /// Called when an external mirror surface comes up or goes down.
    fn on_mirror_changed(&self, mirrored: bool);

    /// Called for surfaced errors, including non-fatal ones such as a
    /// failed permanent-library save.
    fn on_error(&self, error: &CaptureError);
}
