use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Framing orientation for the capture pipeline and the mirror transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationMode {
    Portrait,
    Landscape,
}

/// Physical camera position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
}

impl CameraPosition {
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Resolution preset for the capture pipeline.
///
/// Configuration carries an ordered preference list; the first preset the
/// hardware supports wins, with `High` as the final generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPreset {
    Uhd2160,
    Hd1080,
    Hd720,
    Vga480,
    /// Generic "best available" preset. Every device supports it.
    High,
}

/// Whether zoom is honored on the front-facing camera.
///
/// The shipped behavior disables front zoom; kept as a policy so the
/// restriction can be lifted without touching the session core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontZoomPolicy {
    Disabled,
    Allowed,
}

/// Desired capture pipeline, immutable per configuration pass.
///
/// Replaced wholesale on reconfiguration; the session core never mutates a
/// configuration in place.
#[derive(Debug, Clone)]
pub struct CaptureConfiguration {
    pub orientation: OrientationMode,

    pub position: CameraPosition,

    /// Ordered resolution preference, first-supported-wins.
    pub preset_preference: Vec<ResolutionPreset>,

    pub front_zoom_policy: FrontZoomPolicy,

    /// Attach a microphone input alongside the video input.
    pub enable_audio_capture: bool,

    /// App-private directory; recordings land under its `Videos/` subpath.
    pub output_directory: PathBuf,

    /// Delay before a manual focus/exposure override reverts to continuous.
    pub focus_settle_delay: Duration,

    /// Delay before the session is resumed after returning to foreground.
    pub foreground_resume_delay: Duration,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.focus_settle_delay.is_zero() {
            return Err("focus settle delay must be non-zero".into());
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err("output directory must not be empty".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            orientation: OrientationMode::Portrait,
            position: CameraPosition::Back,
            preset_preference: vec![
                ResolutionPreset::Hd1080,
                ResolutionPreset::Hd720,
                ResolutionPreset::High,
            ],
            front_zoom_policy: FrontZoomPolicy::Disabled,
            enable_audio_capture: true,
            output_directory: PathBuf::from("."),
            focus_settle_delay: Duration::from_secs(2),
            foreground_resume_delay: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert!(CaptureConfiguration::default().validate().is_ok());
    }

    #[test]
    fn zero_settle_delay_rejected() {
        let config = CaptureConfiguration {
            focus_settle_delay: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn position_opposite_round_trips() {
        assert_eq!(CameraPosition::Front.opposite(), CameraPosition::Back);
        assert_eq!(CameraPosition::Back.opposite().opposite(), CameraPosition::Back);
    }
}
