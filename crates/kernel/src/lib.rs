//! Session kernel: camera, flat scene graph and per-frame animated state.
//!
//! # Invariants
//! - Exactly one camera per session, owned by the [`Session`].
//! - Scene entries are drawn in insertion order and never removed.
//! - Derived matrices are valid only after an explicit recompute.

pub mod camera;
pub mod config;
pub mod effects;
pub mod scene;
pub mod session;

pub use camera::Camera;
pub use config::{CameraConfig, ConfigError, FlickerConfig, SessionConfig};
pub use effects::{FlickerChannel, LightRig, WaveFactor, flicker_intensity};
pub use scene::{LightIntensity, Material, PointLight, SceneEntry, SceneGraph};
pub use session::{LightSample, Session, SkyBackdrop, WaterSurface};
