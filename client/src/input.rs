//! Keyboard polling into control vectors and one-shot commands.

use macroquad::prelude::{is_key_down, KeyCode};
use shared::InputVector;

/// One-shot actions triggered on key press, not while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Restart,
    Quit,
}

const COMMAND_KEYS: [(KeyCode, Command); 3] = [
    (KeyCode::P, Command::TogglePause),
    (KeyCode::R, Command::Restart),
    (KeyCode::Escape, Command::Quit),
];

/// Samples movement keys every frame and edge-detects command keys.
#[derive(Debug, Default)]
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_command_keys: [bool; 3],
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the real keyboard. Needs a live macroquad window.
    pub fn poll(&mut self) -> (InputVector, Vec<Command>) {
        self.update(is_key_down)
    }

    /// Builds this frame's control vector and newly pressed commands from any
    /// key-state source. Arrows and WASD both steer; Space or Shift boosts.
    pub fn update(&mut self, held: impl Fn(KeyCode) -> bool) -> (InputVector, Vec<Command>) {
        let input = InputVector {
            up: held(KeyCode::W) || held(KeyCode::Up),
            down: held(KeyCode::S) || held(KeyCode::Down),
            left: held(KeyCode::A) || held(KeyCode::Left),
            right: held(KeyCode::D) || held(KeyCode::Right),
            boost: held(KeyCode::Space) || held(KeyCode::LeftShift),
        };

        let mut commands = Vec::new();
        for (i, (key, command)) in COMMAND_KEYS.iter().enumerate() {
            let down = held(*key);
            if down && !self.prev_command_keys[i] {
                commands.push(*command);
            }
            self.prev_command_keys[i] = down;
        }

        (input, commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(down: &[KeyCode]) -> impl Fn(KeyCode) -> bool + '_ {
        move |key| down.contains(&key)
    }

    #[test]
    fn test_movement_keys() {
        let mut manager = InputManager::new();

        let (input, commands) = manager.update(keys(&[KeyCode::W, KeyCode::Right, KeyCode::Space]));

        assert!(input.up && input.right && input.boost);
        assert!(!input.down && !input.left);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_no_keys_is_idle() {
        let mut manager = InputManager::new();
        let (input, _) = manager.update(keys(&[]));
        assert_eq!(input, InputVector::IDLE);
    }

    #[test]
    fn test_commands_fire_on_press_only() {
        let mut manager = InputManager::new();

        let (_, first) = manager.update(keys(&[KeyCode::P]));
        let (_, held) = manager.update(keys(&[KeyCode::P]));
        let (_, released) = manager.update(keys(&[]));
        let (_, again) = manager.update(keys(&[KeyCode::P, KeyCode::R]));

        assert_eq!(first, vec![Command::TogglePause]);
        assert!(held.is_empty());
        assert!(released.is_empty());
        assert_eq!(again, vec![Command::TogglePause, Command::Restart]);
    }

    #[test]
    fn test_escape_quits() {
        let mut manager = InputManager::new();
        let (_, commands) = manager.update(keys(&[KeyCode::Escape]));
        assert_eq!(commands, vec![Command::Quit]);
    }
}
