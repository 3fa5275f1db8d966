use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::state::AuthorizationState;
use crate::traits::backend::CaptureBackend;
use crate::traits::delegate::SessionDelegate;

/// Tracks and requests capture-device authorization.
///
/// Gates all downstream configuration: `require_authorized` is the single
/// entry point the session core consults before touching hardware. An
/// undetermined state triggers exactly one async platform request; the
/// result arrives as a single state change through the delegate, never by
/// polling.
pub struct PermissionGatekeeper {
    backend: Arc<dyn CaptureBackend>,
    state: Arc<Mutex<AuthorizationState>>,
    request_issued: AtomicBool,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
}

impl PermissionGatekeeper {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        let initial = backend.authorization_status();
        Self {
            backend,
            state: Arc::new(Mutex::new(initial)),
            request_issued: AtomicBool::new(false),
            delegate: Mutex::new(None),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    pub fn authorization(&self) -> AuthorizationState {
        *self.state.lock()
    }

    /// Current state; kicks off the one-time platform request when still
    /// undetermined. The completion may fire synchronously, so no internal
    /// lock is held across the backend call.
    pub fn check_authorization(&self) -> AuthorizationState {
        let current = *self.state.lock();
        if current != AuthorizationState::Undetermined {
            return current;
        }

        if !self.request_issued.swap(true, Ordering::SeqCst) {
            let state = Arc::clone(&self.state);
            let delegate = self.delegate.lock().clone();
            self.backend.request_access(Box::new(move |granted| {
                let resolved = if granted {
                    AuthorizationState::Authorized
                } else {
                    AuthorizationState::Denied
                };
                *state.lock() = resolved;
                log::info!("capture authorization resolved: {:?}", resolved);
                if let Some(delegate) = delegate {
                    delegate.on_authorization_changed(resolved);
                }
            }));
        }

        *self.state.lock()
    }

    /// Distinguishable "not authorized" signal for callers attempting to
    /// configure before authorization is granted.
    pub fn require_authorized(&self) -> Result<(), CaptureError> {
        if self.authorization().is_authorized() {
            Ok(())
        } else {
            Err(CaptureError::NotAuthorized)
        }
    }
}
