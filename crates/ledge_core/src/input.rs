//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every tick the key is
//!   down. Horizontal movement reads this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   tick the transition happened, cleared by `end_frame()`. Jump and dash are
//!   one-shot actions and read these, so holding jump never re-fires it.

use serde::Deserialize;
use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Left,
    Right,
    Up,
    Jump,
    Dash,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseBtn {
    Left,
    Right,
}

/// What the player asked for during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// -1.0, 0.0 or 1.0.
    pub move_x: f32,
    pub jump: bool,
    pub dash: bool,
}

/// Held buttons plus the press/release edges seen since the last
/// `clear_edges`.
#[derive(Debug, Clone)]
struct ButtonSet<T> {
    held: HashSet<T>,
    pressed: HashSet<T>,
    released: HashSet<T>,
}

impl<T: Copy + Eq + Hash> ButtonSet<T> {
    fn press(&mut self, button: T) {
        if self.held.insert(button) {
            self.pressed.insert(button);
        }
    }

    fn release(&mut self, button: T) {
        if self.held.remove(&button) {
            self.released.insert(button);
        }
    }

    fn clear_edges(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }
}

impl<T> Default for ButtonSet<T> {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            released: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: ButtonSet<Key>,
    mouse: ButtonSet<MouseBtn>,
    /// Pointer in screen pixels.
    pub mouse_position: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.keys.press(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys.release(key);
    }

    /// Bring the held set in line with `keys`, generating the press and
    /// release edges a live keyboard would have produced.
    pub fn sync_held(&mut self, keys: &[Key]) {
        let gone: Vec<Key> = self
            .keys
            .held
            .iter()
            .copied()
            .filter(|key| !keys.contains(key))
            .collect();
        for key in gone {
            self.keys.release(key);
        }
        for &key in keys {
            self.keys.press(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        self.mouse.press(btn);
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        self.mouse.release(btn);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.keys.pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.keys.released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse.held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse.pressed.contains(&btn)
    }

    pub fn is_mouse_just_released(&self, btn: MouseBtn) -> bool {
        self.mouse.released.contains(&btn)
    }

    pub fn player_intent(&self) -> PlayerIntent {
        let axis = |key: Key| f32::from(u8::from(self.is_held(key)));
        PlayerIntent {
            move_x: axis(Key::Right) - axis(Key::Left),
            jump: self.is_just_pressed(Key::Jump) || self.is_just_pressed(Key::Up),
            dash: self.is_just_pressed(Key::Dash),
        }
    }

    /// Drop this tick's edges. Call once per simulation tick, after the tick
    /// has read them.
    pub fn end_frame(&mut self) {
        self.keys.clear_edges();
        self.mouse.clear_edges();
    }
}
