//! Input state
//!
//! Hosts translate device events into [`KeyCode`]/[`MouseButton`] calls on the
//! engine; this module only keeps the resulting state for extensions to query.

use std::collections::HashSet;

use crate::foundation::math::Vec2;

/// Input manager
#[derive(Debug, Default)]
pub struct InputManager {
    keys_down: HashSet<KeyCode>,
    left_down: bool,
    right_down: bool,
    mouse_position: Vec2,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left_down = pressed,
            MouseButton::Right => self.right_down = pressed,
            MouseButton::Middle => {}
        }
    }

    /// Handle mouse movement (screen space, y down)
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        self.mouse_position = Vec2::new(x, y);
    }

    /// Whether `key` is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Last pointer position
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Snapshot of the pointer for message payloads
    pub fn mouse_context(&self) -> MouseContext {
        MouseContext {
            left_down: self.left_down,
            right_down: self.right_down,
            position: self.mouse_position,
        }
    }
}

/// Pointer state carried by `MOUSE_DOWN`/`MOUSE_UP`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseContext {
    /// Left button held
    pub left_down: bool,
    /// Right button held
    pub right_down: bool,
    /// Pointer position (screen space, y down)
    pub position: Vec2,
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Left, true);
        assert!(input.is_key_down(KeyCode::Left));
        input.handle_key_input(KeyCode::Left, false);
        assert!(!input.is_key_down(KeyCode::Left));
    }

    #[test]
    fn test_mouse_context_snapshot() {
        let mut input = InputManager::new();
        input.handle_mouse_move(12.0, 40.0);
        input.handle_mouse_button(MouseButton::Left, true);

        let context = input.mouse_context();
        assert!(context.left_down);
        assert!(!context.right_down);
        assert_eq!(context.position, Vec2::new(12.0, 40.0));
    }
}
