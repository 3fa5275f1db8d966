use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use camera_capture_core::{
    CaptureError, FinishedRecording, MovieOutput, RecordingCompletion, Thumbnail,
};

struct ActiveWrite {
    path: PathBuf,
    started: Instant,
}

/// Simulated movie file output.
///
/// `start_writing` creates the file with real bytes; `finish_writing`
/// mimics the platform's deferred finalization by firing the completion on
/// a background thread after `finish_delay`, exercising the two-phase
/// cancel path in the recording controller.
pub struct SimMovieOutput {
    active: Arc<Mutex<Option<ActiveWrite>>>,
    finish_delay: Duration,
    fail_finish: Arc<AtomicBool>,
    write_empty_file: Arc<AtomicBool>,
}

impl SimMovieOutput {
    pub(crate) fn new(
        finish_delay: Duration,
        fail_finish: Arc<AtomicBool>,
        write_empty_file: Arc<AtomicBool>,
    ) -> Self {
        Self {
            active: Arc::new(Mutex::new(None)),
            finish_delay,
            fail_finish,
            write_empty_file,
        }
    }
}

impl MovieOutput for SimMovieOutput {
    fn is_recording(&self) -> bool {
        self.active.lock().is_some()
    }

    fn start_writing(&mut self, path: &Path) -> Result<(), CaptureError> {
        if self.active.lock().is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        let payload: &[u8] = if self.write_empty_file.load(Ordering::SeqCst) {
            &[]
        } else {
            &[0x42; 4096]
        };
        fs::write(path, payload).map_err(|e| CaptureError::RecordingFailed(e.to_string()))?;
        *self.active.lock() = Some(ActiveWrite {
            path: path.to_path_buf(),
            started: Instant::now(),
        });
        Ok(())
    }

    fn finish_writing(&mut self, completion: RecordingCompletion) {
        let Some(write) = self.active.lock().take() else {
            completion(Err(CaptureError::RecordingFailed("no write in progress".into())));
            return;
        };
        let delay = self.finish_delay;
        let fail = self.fail_finish.load(Ordering::SeqCst);

        thread::Builder::new()
            .name("sim-movie-finalize".into())
            .spawn(move || {
                thread::sleep(delay);
                if fail {
                    completion(Err(CaptureError::RecordingFailed("simulated write failure".into())));
                } else {
                    completion(Ok(FinishedRecording {
                        path: write.path,
                        duration_secs: write.started.elapsed().as_secs_f64(),
                        thumbnail: Some(Thumbnail {
                            width: 16,
                            height: 9,
                            rgba: vec![0u8; 16 * 9 * 4],
                        }),
                    }));
                }
            })
            .expect("failed to spawn sim-movie-finalize thread");
    }
}
