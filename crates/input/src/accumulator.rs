use glam::Vec2;

use crate::action::{Key, MoveIntent};

/// Everything the camera consumes for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub intent: MoveIntent,
    /// Pointer movement in pixels since the previous frame.
    pub pointer_delta: Vec2,
}

/// Collects input events between frames.
#[derive(Debug, Clone, Default)]
pub struct InputAccumulator {
    held: MoveIntent,
    pointer: Vec2,
}

impl InputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: Key, pressed: bool) {
        if self.held.is_held(key) != pressed {
            tracing::trace!(?key, pressed, "movement key");
        }
        self.held.set(key, pressed);
    }

    pub fn pointer(&mut self, dx: f32, dy: f32) {
        self.pointer += Vec2::new(dx, dy);
    }

    /// Release every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held = MoveIntent::default();
    }

    pub fn held(&self) -> MoveIntent {
        self.held
    }

    /// Snapshot the frame's input and reset the pointer delta.
    pub fn take_frame(&mut self) -> InputFrame {
        InputFrame {
            intent: self.held,
            pointer_delta: std::mem::take(&mut self.pointer),
        }
    }
}
