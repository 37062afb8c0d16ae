//! # Input Module
//!
//! Keyboard decoding for player interactions.
//!
//! Key mapping is a pure function of the [`KeyCode`], so it can be tested without a window;
//! [`InputHandler::poll`] is the only part that touches macroquad's input state.

use crate::game::CheatKey;
use crate::Direction;
use macroquad::prelude::{get_last_key_pressed, KeyCode};

/// Player input types that can be processed by the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Move (or attack) one tile
    Move(Direction),
    /// Quit the game
    Quit,
    /// Confirm; leaves the end screens
    Confirm,
}

/// Input handler for processing player commands.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl, yubn)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Direction, InputHandler, PlayerInput};
    /// use macroquad::prelude::KeyCode;
    ///
    /// let input = InputHandler::new();
    /// assert_eq!(input.map_key(KeyCode::K), Some(PlayerInput::Move(Direction::North)));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Returns the key pressed this frame, if any.
    pub fn poll(&self) -> Option<KeyCode> {
        get_last_key_pressed()
    }

    /// Maps a key to a player input.
    pub fn map_key(&self, key: KeyCode) -> Option<PlayerInput> {
        let step = |direction| Some(PlayerInput::Move(direction));

        match key {
            KeyCode::Escape | KeyCode::Q => Some(PlayerInput::Quit),
            KeyCode::Enter | KeyCode::KpEnter | KeyCode::Space => Some(PlayerInput::Confirm),

            KeyCode::Up | KeyCode::W => step(Direction::North),
            KeyCode::Down | KeyCode::S => step(Direction::South),
            KeyCode::Left | KeyCode::A => step(Direction::West),
            KeyCode::Right | KeyCode::D => step(Direction::East),

            _ if !self.vi_keys_enabled => None,

            KeyCode::K => step(Direction::North),
            KeyCode::J => step(Direction::South),
            KeyCode::H => step(Direction::West),
            KeyCode::L => step(Direction::East),
            KeyCode::Y => step(Direction::Northwest),
            KeyCode::U => step(Direction::Northeast),
            KeyCode::B => step(Direction::Southwest),
            KeyCode::N => step(Direction::Southeast),

            _ => None,
        }
    }
}

/// How a key takes part in the cheat code.
pub fn cheat_key(key: KeyCode) -> CheatKey {
    match key {
        KeyCode::Up => CheatKey::Up,
        KeyCode::Down => CheatKey::Down,
        KeyCode::Left => CheatKey::Left,
        KeyCode::Right => CheatKey::Right,
        KeyCode::B => CheatKey::B,
        KeyCode::A => CheatKey::A,
        _ => CheatKey::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys_agree() {
        let input = InputHandler::new();
        for (keys, direction) in [
            ([KeyCode::Up, KeyCode::W, KeyCode::K], Direction::North),
            ([KeyCode::Down, KeyCode::S, KeyCode::J], Direction::South),
            ([KeyCode::Left, KeyCode::A, KeyCode::H], Direction::West),
            ([KeyCode::Right, KeyCode::D, KeyCode::L], Direction::East),
        ] {
            for key in keys {
                assert_eq!(input.map_key(key), Some(PlayerInput::Move(direction)));
            }
        }
    }

    #[test]
    fn test_diagonals() {
        let input = InputHandler::new();
        assert_eq!(
            input.map_key(KeyCode::Y),
            Some(PlayerInput::Move(Direction::Northwest))
        );
        assert_eq!(
            input.map_key(KeyCode::N),
            Some(PlayerInput::Move(Direction::Southeast))
        );
    }

    #[test]
    fn test_vi_keys_can_be_disabled() {
        let input = InputHandler {
            vi_keys_enabled: false,
        };
        assert_eq!(input.map_key(KeyCode::H), None);
        assert_eq!(input.map_key(KeyCode::B), None);
        assert_eq!(
            input.map_key(KeyCode::A),
            Some(PlayerInput::Move(Direction::West))
        );
    }

    #[test]
    fn test_quit_and_confirm() {
        let input = InputHandler::new();
        assert_eq!(input.map_key(KeyCode::Q), Some(PlayerInput::Quit));
        assert_eq!(input.map_key(KeyCode::Escape), Some(PlayerInput::Quit));
        assert_eq!(input.map_key(KeyCode::Space), Some(PlayerInput::Confirm));
        assert_eq!(input.map_key(KeyCode::F5), None);
    }

    #[test]
    fn test_cheat_keys() {
        assert_eq!(cheat_key(KeyCode::Up), CheatKey::Up);
        assert_eq!(cheat_key(KeyCode::B), CheatKey::B);
        assert_eq!(cheat_key(KeyCode::W), CheatKey::Other);
    }
}
