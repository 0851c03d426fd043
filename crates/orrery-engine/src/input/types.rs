/// Keyboard key identifier.
///
/// Intentionally minimal: the lessons only steer the camera and quit.
/// The runtime maps platform keycodes into these variants; unsupported keys
/// carry a stable platform code via `Key::Unknown(u32)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    W,
    A,
    S,
    D,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Held movement controls, derived from the key set.
///
/// This is the engine-facing shape of the original "button mask": explicit
/// booleans rather than bitflags, matching how the rest of the input state
/// is stored.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Movement {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl Movement {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when the event is a key-repeat.
        repeat: bool,
    },

    /// Cursor moved, in physical pixels.
    CursorMoved { x: f32, y: f32 },

    /// Cursor left the window surface.
    CursorLeft,

    /// Window focus change.
    Focused(bool),
}
