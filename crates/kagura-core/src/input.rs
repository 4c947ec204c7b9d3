//! Input snapshot collector.
//!
//! Turns the platform layer's raw key/mouse state into the fixed-shape
//! [`InputState`] snapshot written into the logic module once per frame.
//! The click edge is computed here: `mouse_clicked` is true in the snapshot
//! of the frame the button went down and false afterwards, however long the
//! button stays held.

use kagura_module_api::{InputState, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Action,
}

#[derive(Default)]
pub struct InputCollector {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    action: bool,

    mouse_x: f32,
    mouse_y: f32,
    mouse_down: bool,
    prev_mouse_down: bool,
}

impl InputCollector {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn on_key(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Up => self.up = pressed,
            Key::Down => self.down = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Action => self.action = pressed,
        }
    }

    #[inline]
    pub fn on_mouse_moved(&mut self, x: f32, y: f32) {
        self.mouse_x = x;
        self.mouse_y = y;
    }

    #[inline]
    pub fn on_mouse_button(&mut self, down: bool) {
        self.mouse_down = down;
    }

    /// Produces this frame's snapshot and consumes the click edge.
    pub fn snapshot(&mut self) -> InputState {
        let clicked = self.mouse_down && !self.prev_mouse_down;
        self.prev_mouse_down = self.mouse_down;

        InputState {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
            action: self.action,
            mouse_pos: Vec2::new(self.mouse_x, self.mouse_y),
            mouse_clicked: clicked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_edge_fires_for_exactly_one_frame() {
        let mut input = InputCollector::new();

        input.on_mouse_button(true);
        assert!(input.snapshot().mouse_clicked);
        // Still held: no repeat.
        assert!(!input.snapshot().mouse_clicked);
        assert!(!input.snapshot().mouse_clicked);

        input.on_mouse_button(false);
        assert!(!input.snapshot().mouse_clicked);

        // Release and press again produces a fresh edge.
        input.on_mouse_button(true);
        assert!(input.snapshot().mouse_clicked);
    }

    #[test]
    fn keys_and_mouse_position_pass_through() {
        let mut input = InputCollector::new();
        input.on_key(Key::Left, true);
        input.on_key(Key::Action, true);
        input.on_mouse_moved(120.0, 48.0);

        let snap = input.snapshot();
        assert!(snap.left && snap.action);
        assert!(!snap.right && !snap.up && !snap.down);
        assert_eq!(snap.mouse_pos, Vec2::new(120.0, 48.0));
    }
}
