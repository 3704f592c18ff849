//! Keyboard and mouse input state.
//!
//! The host owns the event loop: it calls [`Input::press`] and
//! [`Input::release`] as events arrive and updates [`CursorPosition`]. The
//! [`App`](crate::app::App) clears the per-frame sets after every update.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: went down this frame
/// - `just_released`: went up this frame
#[derive(Debug, Clone)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Feed a press event. Holding an already-pressed input doesn't fire
    /// `just_pressed` again.
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    /// Feed a release event.
    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Press and release within the same frame.
    pub fn tap(&mut self, input: T) {
        self.press(input);
        self.release(input);
    }

    /// Clear per-frame state.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse cursor position in window pixels (origin top-left, Y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

impl CursorPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_fires_just_pressed_once() {
        let mut keys = Input::<KeyCode>::new();
        keys.press(KeyCode::KeyA);
        assert!(keys.pressed(KeyCode::KeyA));
        assert!(keys.just_pressed(KeyCode::KeyA));

        keys.clear_just();
        keys.press(KeyCode::KeyA);
        assert!(keys.pressed(KeyCode::KeyA));
        assert!(!keys.just_pressed(KeyCode::KeyA));
    }

    #[test]
    fn tap_registers_both_edges() {
        let mut buttons = Input::<MouseButton>::new();
        buttons.tap(MouseButton::Left);
        assert!(buttons.just_pressed(MouseButton::Left));
        assert!(buttons.just_released(MouseButton::Left));
        assert!(!buttons.pressed(MouseButton::Left));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut keys = Input::<KeyCode>::new();
        keys.release(KeyCode::KeyS);
        assert!(!keys.just_released(KeyCode::KeyS));
    }
}
