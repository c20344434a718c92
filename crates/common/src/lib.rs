//! Shared types used across the tidewater crates.
//!
//! Nothing in here touches the GPU. Resource handles are plain newtypes the
//! renderer backend hands out and later resolves.

mod error;
mod handles;
mod types;

pub use error::ResourceError;
pub use handles::{GpuMeshHandle, ProgramHandle, SurfaceHandle, TextureHandle};
pub use types::Transform;

pub fn crate_info() -> &'static str {
    "tidewater-common v0.1.0"
}
