use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::asset::CapturedAsset;
use crate::models::error::CaptureError;
use crate::models::recording::{PendingOutcome, RecordingMetadata, RecordingSession};
use crate::recording::storage;
use crate::traits::backend::MovieOutput;
use crate::traits::collaborators::{HistorySink, MediaLibrary, SettingsSource};
use crate::traits::delegate::SessionDelegate;

/// Owns start/stop/cancel of media capture to a file, elapsed timing, and
/// the keep-vs-discard decision at completion.
///
/// Cancel is two-phase: the underlying write cannot be aborted, so
/// `cancel_recording` flips the pending outcome and the decision is acted
/// on whenever the finalize callback fires. At most one recording exists
/// at a time.
///
/// All fields are shared; clones observe the same recording.
#[derive(Clone)]
pub struct RecordingController {
    output: Arc<Mutex<Box<dyn MovieOutput>>>,
    session: Arc<Mutex<Option<RecordingSession>>>,
    /// Also consumed by the session core as the switch-camera gate.
    active: Arc<AtomicBool>,
    settings: Arc<dyn SettingsSource>,
    history: Arc<dyn HistorySink>,
    library: Arc<dyn MediaLibrary>,
    delegate: Arc<Mutex<Option<Arc<dyn SessionDelegate>>>>,
    output_directory: Arc<Mutex<PathBuf>>,
}

impl RecordingController {
    pub fn new(
        output: Box<dyn MovieOutput>,
        settings: Arc<dyn SettingsSource>,
        history: Arc<dyn HistorySink>,
        library: Arc<dyn MediaLibrary>,
    ) -> Self {
        Self {
            output: Arc::new(Mutex::new(output)),
            session: Arc::new(Mutex::new(None)),
            active: Arc::new(AtomicBool::new(false)),
            settings,
            history,
            library,
            delegate: Arc::new(Mutex::new(None)),
            output_directory: Arc::new(Mutex::new(PathBuf::from("."))),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    pub fn set_output_directory(&self, directory: PathBuf) {
        *self.output_directory.lock() = directory;
    }

    pub fn is_recording(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.session.lock().as_ref().map(|s| s.elapsed_secs).unwrap_or(0)
    }

    /// Shared flag the session core consults to reject camera switches
    /// while a recording is in flight.
    pub fn active_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    /// Begin writing to a fresh, collision-resistant path under `Videos/`.
    ///
    /// Enforces the settings gate itself rather than relying on the UI to
    /// have disabled the control.
    pub fn start_recording(&self) -> Result<(), CaptureError> {
        if !self.settings.recording_allowed() {
            log::info!("recording request ignored: disabled in settings");
            return Err(CaptureError::RecordingDisabled);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        let path = match storage::unique_output_path(&self.output_directory.lock()) {
            Ok(path) => path,
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        if let Err(e) = self.output.lock().start_writing(&path) {
            self.active.store(false, Ordering::SeqCst);
            return Err(e);
        }

        *self.session.lock() = Some(RecordingSession::new(path));
        self.start_elapsed_ticker();
        Ok(())
    }

    /// Request normal finalization; the file is kept and handed to History
    /// once the platform confirms the write.
    pub fn stop_recording(&self) -> Result<(), CaptureError> {
        if !self.is_recording() {
            return Ok(());
        }
        self.finish();
        Ok(())
    }

    /// Flag the pending result for deletion, then request finalization.
    /// When the callback fires the file is deleted and no handoff occurs.
    pub fn cancel_recording(&self) -> Result<(), CaptureError> {
        if !self.is_recording() {
            return Ok(());
        }
        if let Some(session) = self.session.lock().as_mut() {
            session.pending = PendingOutcome::Discard;
        }
        self.finish();
        Ok(())
    }

    fn finish(&self) {
        let session = Arc::clone(&self.session);
        let active = Arc::clone(&self.active);
        let history = Arc::clone(&self.history);
        let library = Arc::clone(&self.library);
        let delegate = Arc::clone(&self.delegate);

        self.output.lock().finish_writing(Box::new(move |result| {
            let taken = session.lock().take();
            active.store(false, Ordering::SeqCst);
            let Some(recorded) = taken else {
                log::warn!("finalize callback fired with no active recording");
                return;
            };
            let delegate = delegate.lock().clone();

            match result {
                Err(e) => {
                    // A failed write never stops the live session; delete
                    // the partial file and surface the error.
                    storage::remove_file_if_exists(&recorded.output_path);
                    log::error!("recording failed: {}", e);
                    if let Some(delegate) = delegate {
                        delegate.on_error(&e);
                    }
                }
                Ok(finished) => match recorded.pending {
                    PendingOutcome::Discard => {
                        storage::remove_file_if_exists(&finished.path);
                        log::info!("recording discarded at {}", finished.path.display());
                    }
                    PendingOutcome::Keep => {
                        Self::hand_off(finished, &recorded, history, library, delegate);
                    }
                },
            }
        }));
    }

    fn hand_off(
        finished: crate::models::recording::FinishedRecording,
        recorded: &RecordingSession,
        history: Arc<dyn HistorySink>,
        library: Arc<dyn MediaLibrary>,
        delegate: Option<Arc<dyn SessionDelegate>>,
    ) {
        // A successfully handed-off asset never references a zero-byte or
        // half-written file.
        let size = fs::metadata(&finished.path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            storage::remove_file_if_exists(&finished.path);
            let e = CaptureError::RecordingFailed("finalized file is empty".into());
            log::error!("{}", e);
            if let Some(delegate) = delegate {
                delegate.on_error(&e);
            }
            return;
        }

        let checksum = storage::file_checksum(&finished.path).unwrap_or_else(|e| {
            log::warn!("checksum skipped: {}", e);
            String::new()
        });
        let metadata = RecordingMetadata::new(
            &finished.path.to_string_lossy(),
            finished.duration_secs,
            &checksum,
            &recorded.started_at,
        );
        if let Err(e) = storage::write_metadata(&metadata, &finished.path) {
            log::warn!("metadata sidecar not written: {}", e);
        }

        history.add_captured_asset(CapturedAsset::video(
            finished.path.clone(),
            finished.duration_secs,
            finished.thumbnail.clone(),
        ));
        if let Some(delegate) = &delegate {
            delegate.on_recording_finished(&metadata);
        }

        // Library save failure is non-fatal: notify, keep the local copy.
        if let Err(e) = library.save_video(&finished.path) {
            log::warn!("library save failed, local copy retained: {}", e);
            if let Some(delegate) = delegate {
                delegate.on_error(&CaptureError::LibrarySaveFailed(e.to_string()));
            }
        }
    }

    /// One-second-resolution elapsed counter, visible through the delegate.
    /// The thread exits on its own once the recording is gone.
    fn start_elapsed_ticker(&self) {
        let session = Arc::clone(&self.session);
        let delegate = Arc::clone(&self.delegate);

        thread::Builder::new()
            .name("recording-ticker".into())
            .spawn(move || loop {
                thread::sleep(Duration::from_secs(1));

                let elapsed = {
                    let mut slot = session.lock();
                    let Some(recorded) = slot.as_mut() else { break };
                    let elapsed = recorded.started.elapsed().as_secs();
                    if elapsed == recorded.elapsed_secs {
                        continue;
                    }
                    recorded.elapsed_secs = elapsed;
                    elapsed
                };

                if let Some(delegate) = delegate.lock().clone() {
                    delegate.on_recording_tick(elapsed);
                }
            })
            .expect("failed to spawn recording-ticker thread");
    }
}
