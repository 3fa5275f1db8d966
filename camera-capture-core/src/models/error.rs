use thiserror::Error;

/// Errors from resolving a physical device or binding it as an input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no capture device at requested position")]
    NoDeviceFound,

    #[error("input creation failed: {0}")]
    InputCreationFailed(String),
}

/// Errors that can occur during capture session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture not authorized")]
    NotAuthorized,

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("reconfiguration already in progress")]
    ReconfigurationInProgress,

    #[error("device lock failed: {0}")]
    DeviceLockFailed(String),

    #[error("recording already in progress")]
    AlreadyRecording,

    #[error("recording disabled in settings")]
    RecordingDisabled,

    #[error("recording failed: {0}")]
    RecordingFailed(String),

    #[error("library save failed: {0}")]
    LibrarySaveFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("mirror surface failed: {0}")]
    MirrorFailed(String),
}
