/// A movement key, independent of the physical key bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
}

impl Key {
    /// Default WASD binding for a key label such as `"w"` or `"KeyW"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.strip_prefix("Key").unwrap_or(label);
        match label {
            "w" | "W" => Some(Self::Forward),
            "s" | "S" => Some(Self::Backward),
            "a" | "A" => Some(Self::Left),
            "d" | "D" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Movement intent flags for one frame.
///
/// Forward and backward may both be held; the camera resolves that case
/// by honouring forward only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Forward => self.forward = held,
            Key::Backward => self.backward = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.forward,
            Key::Backward => self.backward,
            Key::Left => self.left,
            Key::Right => self.right,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
