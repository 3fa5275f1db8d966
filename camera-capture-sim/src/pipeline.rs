use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    CameraPosition, CaptureError, CaptureInput, CapturePipeline, InputKind, ResolutionPreset,
};

/// Input binding produced by the sim backend.
pub struct SimInput {
    pub(crate) id: String,
    pub(crate) kind: InputKind,
    pub(crate) position: Option<CameraPosition>,
}

impl CaptureInput for SimInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InputKind {
        self.kind
    }

    fn position(&self) -> Option<CameraPosition> {
        self.position
    }
}

/// Counters and flags a test can observe after driving the session.
#[derive(Debug, Default, Clone)]
pub struct SimPipelineState {
    pub start_calls: usize,
    pub stop_calls: usize,
    pub running: bool,
    pub preset: Option<ResolutionPreset>,
    /// Depth of begin/commit nesting observed; mutations outside a
    /// configuration pass are a bug in the caller.
    pub config_depth: u32,
    pub unguarded_mutations: usize,
}

/// Simulated capture pipeline. Rejects adds when scripted to, so tests can
/// exercise the switch rollback path.
pub struct SimPipeline {
    inputs: Vec<Box<dyn CaptureInput>>,
    state: Arc<Mutex<SimPipelineState>>,
    reject_next_add: Arc<Mutex<Option<CameraPosition>>>,
}

impl SimPipeline {
    pub(crate) fn new(
        state: Arc<Mutex<SimPipelineState>>,
        reject_next_add: Arc<Mutex<Option<CameraPosition>>>,
    ) -> Self {
        Self {
            inputs: Vec::new(),
            state,
            reject_next_add,
        }
    }
}

impl CapturePipeline for SimPipeline {
    fn begin_configuration(&mut self) {
        self.state.lock().config_depth += 1;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.state.lock();
        state.config_depth = state.config_depth.saturating_sub(1);
    }

    fn set_preset(&mut self, preset: ResolutionPreset) -> bool {
        self.state.lock().preset = Some(preset);
        true
    }

    fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), CaptureError> {
        {
            let mut state = self.state.lock();
            if state.config_depth == 0 {
                state.unguarded_mutations += 1;
            }
        }
        let mut reject = self.reject_next_add.lock();
        if input.kind() == InputKind::Video && input.position() == *reject {
            *reject = None;
            return Err(CaptureError::ConfigurationFailed("device claimed elsewhere".into()));
        }
        self.inputs.push(input);
        Ok(())
    }

    fn remove_input(&mut self, id: &str) -> Option<Box<dyn CaptureInput>> {
        {
            let mut state = self.state.lock();
            if state.config_depth == 0 {
                state.unguarded_mutations += 1;
            }
        }
        let index = self.inputs.iter().position(|i| i.id() == id)?;
        Some(self.inputs.remove(index))
    }

    fn inputs(&self) -> Vec<(String, InputKind)> {
        self.inputs.iter().map(|i| (i.id().to_string(), i.kind())).collect()
    }

    fn start_running(&mut self) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        state.start_calls += 1;
        state.running = true;
        Ok(())
    }

    fn stop_running(&mut self) {
        let mut state = self.state.lock();
        state.stop_calls += 1;
        state.running = false;
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }
}
