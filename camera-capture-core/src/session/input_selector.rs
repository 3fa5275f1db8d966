use std::sync::Arc;

use crate::models::config::CameraPosition;
use crate::models::error::DeviceError;
use crate::traits::backend::{CameraDevice, CaptureBackend, CaptureInput, CapturePipeline};

/// Resolves a physical device for a requested position and builds its input
/// binding. Owns the rollback logic for mid-session switches.
pub struct InputSelector {
    backend: Arc<dyn CaptureBackend>,
}

impl InputSelector {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self { backend }
    }

    /// Resolve the device at `position` and bind it as an input.
    pub fn select(
        &self,
        position: CameraPosition,
    ) -> Result<(Box<dyn CameraDevice>, Box<dyn CaptureInput>), DeviceError> {
        let device = self
            .backend
            .default_device(position)
            .ok_or(DeviceError::NoDeviceFound)?;
        let input = self.backend.create_input(device.as_ref())?;
        Ok((device, input))
    }

    /// Swap the active video input for one at `target`.
    ///
    /// Strict invariant: on any failure the previous input stays (or is
    /// restored) on the pipeline, so the session is never left without an
    /// active video input. The caller wraps this in a configuration pass.
    pub fn switch(
        &self,
        pipeline: &mut dyn CapturePipeline,
        previous_input_id: &str,
        target: CameraPosition,
    ) -> Result<(Box<dyn CameraDevice>, String), DeviceError> {
        // Resolve the replacement before touching the pipeline.
        let (device, input) = self.select(target)?;
        let new_id = input.id().to_string();

        let previous = pipeline.remove_input(previous_input_id);
        match pipeline.add_input(input) {
            Ok(()) => Ok((device, new_id)),
            Err(e) => {
                if let Some(previous) = previous {
                    if let Err(restore) = pipeline.add_input(previous) {
                        // Should be unreachable: the slot we just vacated.
                        log::error!("failed to restore previous input: {}", restore);
                    }
                }
                log::warn!("camera switch to {:?} failed: {}", target, e);
                Err(DeviceError::InputCreationFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use crate::models::config::ResolutionPreset;
    use crate::models::error::CaptureError;
    use crate::models::state::AuthorizationState;
    use crate::traits::backend::{
        AccessCompletion, InputKind, MirrorSurface, MovieOutput, NormalizedPoint, PhotoCompletion,
        RotationAngle, ScreenHandle,
    };

    use super::*;

    struct FakeDevice(CameraPosition);

    impl CameraDevice for FakeDevice {
        fn id(&self) -> &str {
            "fake-device"
        }
        fn position(&self) -> CameraPosition {
            self.0
        }
        fn max_zoom(&self) -> f32 {
            4.0
        }
        fn supports_preset(&self, _: ResolutionPreset) -> bool {
            true
        }
        fn lock_for_configuration(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }
        fn unlock(&mut self) {}
        fn set_zoom(&mut self, _: f32) {}
        fn set_focus_point(&mut self, _: NormalizedPoint) {}
        fn set_continuous_focus(&mut self) {}
    }

    struct FakeInput {
        id: String,
        position: CameraPosition,
    }

    impl CaptureInput for FakeInput {
        fn id(&self) -> &str {
            &self.id
        }
        fn kind(&self) -> InputKind {
            InputKind::Video
        }
        fn position(&self) -> Option<CameraPosition> {
            Some(self.position)
        }
    }

    /// Pipeline that rejects every add after the first `fail_after` ones.
    struct FlakyPipeline {
        inputs: Vec<Box<dyn CaptureInput>>,
        adds: usize,
        fail_after: usize,
    }

    impl CapturePipeline for FlakyPipeline {
        fn begin_configuration(&mut self) {}
        fn commit_configuration(&mut self) {}
        fn set_preset(&mut self, _: ResolutionPreset) -> bool {
            true
        }
        fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), CaptureError> {
            // Restoration of a previously attached input always succeeds.
            let restoring = input.id() == "previous";
            if !restoring && self.adds >= self.fail_after {
                return Err(CaptureError::ConfigurationFailed("device claimed".into()));
            }
            self.adds += 1;
            self.inputs.push(input);
            Ok(())
        }
        fn remove_input(&mut self, id: &str) -> Option<Box<dyn CaptureInput>> {
            let index = self.inputs.iter().position(|i| i.id() == id)?;
            Some(self.inputs.remove(index))
        }
        fn inputs(&self) -> Vec<(String, InputKind)> {
            self.inputs.iter().map(|i| (i.id().to_string(), i.kind())).collect()
        }
        fn start_running(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }
        fn stop_running(&mut self) {}
        fn is_running(&self) -> bool {
            false
        }
    }

    struct FakeBackend {
        missing: Mutex<Option<CameraPosition>>,
    }

    impl CaptureBackend for FakeBackend {
        fn authorization_status(&self) -> AuthorizationState {
            AuthorizationState::Authorized
        }
        fn request_access(&self, completion: AccessCompletion) {
            completion(true);
        }
        fn default_device(&self, position: CameraPosition) -> Option<Box<dyn CameraDevice>> {
            if *self.missing.lock() == Some(position) {
                return None;
            }
            Some(Box::new(FakeDevice(position)))
        }
        fn create_input(
            &self,
            device: &dyn CameraDevice,
        ) -> Result<Box<dyn CaptureInput>, DeviceError> {
            Ok(Box::new(FakeInput {
                id: format!("input-{:?}", device.position()),
                position: device.position(),
            }))
        }
        fn default_audio_input(&self) -> Result<Box<dyn CaptureInput>, DeviceError> {
            Err(DeviceError::NoDeviceFound)
        }
        fn create_pipeline(&self) -> Box<dyn CapturePipeline> {
            unimplemented!("not exercised")
        }
        fn create_movie_output(&self) -> Box<dyn MovieOutput> {
            unimplemented!("not exercised")
        }
        fn capture_still(&self, _: PhotoCompletion) {}
        fn create_mirror_surface(
            &self,
            _: &ScreenHandle,
            _: RotationAngle,
        ) -> Result<Box<dyn MirrorSurface>, CaptureError> {
            Err(CaptureError::MirrorFailed("unsupported".into()))
        }
    }

    #[test]
    fn select_missing_device_reports_no_device() {
        let backend = Arc::new(FakeBackend {
            missing: Mutex::new(Some(CameraPosition::Front)),
        });
        let selector = InputSelector::new(backend as Arc<dyn CaptureBackend>);

        assert!(matches!(
            selector.select(CameraPosition::Front),
            Err(DeviceError::NoDeviceFound)
        ));
        assert!(selector.select(CameraPosition::Back).is_ok());
    }

    #[test]
    fn failed_switch_restores_previous_input() {
        let backend = Arc::new(FakeBackend {
            missing: Mutex::new(None),
        });
        let selector = InputSelector::new(backend as Arc<dyn CaptureBackend>);

        let mut pipeline = FlakyPipeline {
            inputs: vec![Box::new(FakeInput {
                id: "previous".into(),
                position: CameraPosition::Back,
            })],
            adds: 1,
            fail_after: 1, // next non-restore add fails
        };

        let result = selector.switch(&mut pipeline, "previous", CameraPosition::Front);
        assert!(matches!(result, Err(DeviceError::InputCreationFailed(_))));

        // Never left without a video input.
        let inputs = pipeline.inputs();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].0, "previous");
    }

    #[test]
    fn successful_switch_replaces_input() {
        let backend = Arc::new(FakeBackend {
            missing: Mutex::new(None),
        });
        let selector = InputSelector::new(backend as Arc<dyn CaptureBackend>);

        let mut pipeline = FlakyPipeline {
            inputs: vec![Box::new(FakeInput {
                id: "previous".into(),
                position: CameraPosition::Back,
            })],
            adds: 1,
            fail_after: usize::MAX,
        };

        let (device, new_id) = selector
            .switch(&mut pipeline, "previous", CameraPosition::Front)
            .unwrap();
        assert_eq!(device.position(), CameraPosition::Front);

        let inputs = pipeline.inputs();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].0, new_id);
    }
}
