//! wgpu render backend for tidewater.
//!
//! Implements the [`tidewater_render::Renderer`] capability. Draws are
//! recorded per target while a frame is open and encoded into one command
//! buffer on `end_frame`, so the reflection pass is always submitted ahead
//! of the water draw that samples it.
//!
//! # Invariants
//! - Offscreen targets share the surface format, so one pipeline serves
//!   every target.
//! - Each target is cleared the first time it is bound in a frame.

mod gpu;
mod layout;

pub use gpu::WgpuRenderer;
