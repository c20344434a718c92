//! Rendering adapter: the renderer capability and planar reflection.
//!
//! # Invariants
//! - The orchestration reaches the graphics API only through [`Renderer`].
//! - The reflection pass finishes before the water draw that samples it.
//! - The camera leaves every frame with exactly the pitch and position it
//!   had after input was applied.

pub mod programs;
mod recording;
mod reflection;
mod renderer;
pub mod setup;

pub use recording::{Command, RecordingRenderer};
pub use reflection::{FrameReport, MirroredView, ReflectionRenderer};
pub use renderer::{
    DrawCall, FrameUniforms, ObjectUniforms, OffscreenTarget, ProgramSource, RenderPass, Renderer,
    WaterUniforms,
};
pub use setup::{SetupError, build_session};

pub fn crate_info() -> &'static str {
    "tidewater-render v0.1.0"
}
