//! Input collaborator: platform events become one [`InputFrame`] per frame.
//!
//! # Invariants
//! - The camera never sees raw platform events, only the accumulated frame.
//! - Pointer deltas are consumed by [`InputAccumulator::take_frame`]; held
//!   keys persist until released.

pub mod action;
mod accumulator;

pub use accumulator::{InputAccumulator, InputFrame};
pub use action::{Key, MoveIntent};
