/// Capture-device authorization.
///
/// `Undetermined` transitions exactly once to `Authorized` or `Denied`;
/// `Denied` is terminal for the process lifetime; the user must change
/// the system-level permission outside the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    Undetermined,
    Authorized,
    Denied,
}

impl AuthorizationState {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Session phase machine.
///
/// Transitions:
/// ```text
/// unconfigured → configuring → ready → running ⇄ stopped
/// ```
/// `configure` is valid from `Unconfigured`, `Ready`, and `Stopped`;
/// `start`/`stop` are idempotent within `Running`/`Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unconfigured,
    Configuring,
    Ready,
    Running,
    Stopped,
}

impl SessionPhase {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether a fresh `configure` pass may begin from this phase.
    pub fn can_configure(self) -> bool {
        matches!(self, Self::Unconfigured | Self::Ready | Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_entry_phases() {
        assert!(SessionPhase::Unconfigured.can_configure());
        assert!(SessionPhase::Ready.can_configure());
        assert!(SessionPhase::Stopped.can_configure());
        assert!(!SessionPhase::Configuring.can_configure());
        assert!(!SessionPhase::Running.can_configure());
    }

    #[test]
    fn authorization_helpers() {
        assert!(AuthorizationState::Authorized.is_authorized());
        assert!(!AuthorizationState::Undetermined.is_authorized());
        assert!(!AuthorizationState::Denied.is_authorized());
    }
}
