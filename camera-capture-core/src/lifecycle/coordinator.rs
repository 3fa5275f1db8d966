use std::time::Duration;

use crate::recording::controller::RecordingController;
use crate::session::core::SessionCore;

/// App foreground/background transitions as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleEvent {
    WillResignActive,
    DidBecomeActive,
}

/// Drives safe suspension and resumption of the capture session across
/// app-lifecycle interruptions.
///
/// Backgrounding stops (never cancels) an in-flight recording so the
/// footage is preserved, then suspends the session. Foregrounding resumes
/// the session after a short delay. Recording is never auto-resumed; the
/// user restarts it explicitly.
pub struct LifecycleCoordinator {
    was_running: bool,
    was_recording: bool,
    resume_delay: Duration,
}

impl LifecycleCoordinator {
    pub fn new(resume_delay: Duration) -> Self {
        Self {
            was_running: false,
            was_recording: false,
            resume_delay,
        }
    }

    pub fn set_resume_delay(&mut self, delay: Duration) {
        self.resume_delay = delay;
    }

    pub fn was_recording(&self) -> bool {
        self.was_recording
    }

    pub fn handle(
        &mut self,
        event: AppLifecycleEvent,
        core: &SessionCore,
        recorder: &RecordingController,
    ) {
        match event {
            AppLifecycleEvent::WillResignActive => self.suspend(core, recorder),
            AppLifecycleEvent::DidBecomeActive => self.resume(core),
        }
    }

    fn suspend(&mut self, core: &SessionCore, recorder: &RecordingController) {
        self.was_recording = recorder.is_recording();
        if self.was_recording {
            log::info!("backgrounding: stopping in-flight recording");
            if let Err(e) = recorder.stop_recording() {
                log::warn!("recording stop on background failed: {}", e);
            }
        }

        self.was_running = core.phase().is_running();
        if self.was_running {
            if let Err(e) = core.stop() {
                log::warn!("session stop on background failed: {}", e);
            }
        }
    }

    fn resume(&mut self, core: &SessionCore) {
        if self.was_running {
            // Let the app settle before touching hardware again.
            if let Err(e) = core.start_after(self.resume_delay) {
                log::warn!("session resume failed: {}", e);
            }
        }
        // Recording is never resumed automatically.
        self.was_running = false;
        self.was_recording = false;
    }
}
