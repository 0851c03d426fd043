use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState, Movement};

/// Current input state for the window.
///
/// Holds "is down" information plus the current and previous-frame cursor
/// positions. The camera reads the per-frame cursor delta; the runtime calls
/// [`InputState::end_frame`] after each frame to roll the baseline forward.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Cursor position in physical pixels, if the cursor is over the window.
    pub cursor_pos: Option<(f32, f32)>,

    /// Cursor position at the end of the previous frame.
    prev_cursor: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // On focus loss, clear the "down" set. Avoids stuck
                    // movement keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::CursorMoved { x, y } => {
                if self.cursor_pos.is_none() {
                    // First sighting of the cursor: also seed the baseline so
                    // the first frame does not report a huge delta.
                    self.prev_cursor = Some((x, y));
                }
                self.cursor_pos = Some((x, y));
            }

            InputEvent::CursorLeft => {
                self.cursor_pos = None;
                self.prev_cursor = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(key);
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
        }
    }

    /// Rolls the cursor baseline forward. Call once per frame, after update.
    pub fn end_frame(&mut self) {
        self.prev_cursor = self.cursor_pos;
    }

    /// Returns true while `key` is held.
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Cursor movement since the previous frame, in physical pixels.
    ///
    /// Zero when the cursor position is unknown on either side of the frame.
    pub fn cursor_delta(&self) -> (f32, f32) {
        match (self.prev_cursor, self.cursor_pos) {
            (Some((px, py)), Some((cx, cy))) => (cx - px, cy - py),
            _ => (0.0, 0.0),
        }
    }

    /// Derives the held movement controls from the key set.
    ///
    /// WASD and the arrow keys are equivalent.
    pub fn movement(&self) -> Movement {
        Movement {
            forward: self.key_down(Key::W) || self.key_down(Key::ArrowUp),
            back: self.key_down(Key::S) || self.key_down(Key::ArrowDown),
            left: self.key_down(Key::A) || self.key_down(Key::ArrowLeft),
            right: self.key_down(Key::D) || self.key_down(Key::ArrowRight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: &mut InputState, key: Key) {
        state.apply_event(InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        });
    }

    fn release(state: &mut InputState, key: Key) {
        state.apply_event(InputEvent::Key {
            key,
            state: KeyState::Released,
            repeat: false,
        });
    }

    #[test]
    fn key_press_and_release_track_held_set() {
        let mut state = InputState::default();
        press(&mut state, Key::W);
        assert!(state.key_down(Key::W));
        release(&mut state, Key::W);
        assert!(!state.key_down(Key::W));
    }

    #[test]
    fn movement_maps_wasd_and_arrows() {
        let mut state = InputState::default();
        press(&mut state, Key::W);
        press(&mut state, Key::ArrowLeft);

        let mv = state.movement();
        assert!(mv.forward);
        assert!(mv.left);
        assert!(!mv.back);
        assert!(!mv.right);
        assert!(mv.any());
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut state = InputState::default();
        press(&mut state, Key::D);
        state.apply_event(InputEvent::Focused(false));
        assert!(!state.key_down(Key::D));
        assert!(!state.movement().any());
    }

    #[test]
    fn cursor_delta_spans_one_frame() {
        let mut state = InputState::default();

        // First sighting seeds the baseline: no spurious initial delta.
        state.apply_event(InputEvent::CursorMoved { x: 100.0, y: 50.0 });
        assert_eq!(state.cursor_delta(), (0.0, 0.0));

        state.apply_event(InputEvent::CursorMoved { x: 104.0, y: 47.0 });
        assert_eq!(state.cursor_delta(), (4.0, -3.0));

        state.end_frame();
        assert_eq!(state.cursor_delta(), (0.0, 0.0));
    }

    #[test]
    fn cursor_leaving_resets_delta_tracking() {
        let mut state = InputState::default();
        state.apply_event(InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        state.apply_event(InputEvent::CursorLeft);
        assert_eq!(state.cursor_delta(), (0.0, 0.0));

        // Re-entering must not produce a jump from the stale position.
        state.apply_event(InputEvent::CursorMoved { x: 500.0, y: 500.0 });
        assert_eq!(state.cursor_delta(), (0.0, 0.0));
    }
}
