use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors loading a [`SessionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Camera parameters. Speeds are per frame, not per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub spawn: Vec3,
    pub speed: f32,
    /// Radians of yaw/pitch per pixel of pointer movement.
    pub sensitivity: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub pitch_limit_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(0.0, 33.0, -4.0),
            speed: 0.1,
            sensitivity: 0.003,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            pitch_limit_degrees: 89.0,
        }
    }
}

/// Point light flicker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    /// Upper bound of the per-frame phase advance.
    pub step: f32,
    pub seed: u64,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            seed: 0x7164_6577_6174_6572,
        }
    }
}

/// Session-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// World-space Y of the water plane.
    pub water_height: f32,
    /// Offscreen reflection target size, independent of the window.
    pub reflection_size: [u32; 2],
    /// Wave factor increment per frame, wrapped modulo 1.
    pub wave_speed: f32,
    pub camera: CameraConfig,
    pub flicker: FlickerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            water_height: 13.0,
            reflection_size: [512, 512],
            wave_speed: 0.0003,
            camera: CameraConfig::default(),
            flicker: FlickerConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [w, h] = self.reflection_size;
        if w == 0 || h == 0 {
            return Err(ConfigError::Invalid(format!(
                "reflection_size must be non-zero, got {w}x{h}"
            )));
        }
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got {} / {}",
                cam.near, cam.far
            )));
        }
        if !(cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_y_degrees out of range: {}",
                cam.fov_y_degrees
            )));
        }
        if !(0.0..=90.0).contains(&cam.pitch_limit_degrees) {
            return Err(ConfigError::Invalid(format!(
                "pitch_limit_degrees out of range: {}",
                cam.pitch_limit_degrees
            )));
        }
        Ok(())
    }
}
