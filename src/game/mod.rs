//! # Game Module
//!
//! Core game state management, the entity pool and the visibility engine.
//!
//! This module contains the fundamental building blocks of a Codecrawl run:
//! - Grid positions and movement directions
//! - The entity pool (player, enemies, potions)
//! - Field of view and line of sight
//! - The hazard trap of each level
//! - The turn engine ([`GameState`])

pub mod entities;
pub mod hazard;
pub mod state;
pub mod visibility;

pub use entities::*;
pub use hazard::*;
pub use state::*;
pub use visibility::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the dungeon grid.
///
/// # Examples
///
/// ```
/// use codecrawl::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Chebyshev distance to another position.
    ///
    /// This is the number of 8-directional steps between the two tiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, -4);
    /// assert_eq!(pos1.chebyshev_distance(pos2), 4);
    /// ```
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// Returns true if `other` is one of the 8 tiles surrounding this one.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.chebyshev_distance(other) == 1
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Directions for movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::Northeast => Position::new(1, -1),
            Direction::Northwest => Position::new(-1, -1),
            Direction::Southeast => Position::new(1, 1),
            Direction::Southwest => Position::new(-1, 1),
        }
    }

    /// Converts a position delta to a direction.
    ///
    /// Returns None if the delta is not a single step.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Direction, Position};
    ///
    /// assert_eq!(Direction::from_delta(Position::new(1, 1)), Some(Direction::Southeast));
    /// assert_eq!(Direction::from_delta(Position::new(0, 2)), None);
    /// ```
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::Northeast),
            (-1, -1) => Some(Direction::Northwest),
            (1, 1) => Some(Direction::Southeast),
            (-1, 1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// Returns all 8 directions.
    pub fn all() -> [Direction; 8] {
        [
            Direction::Northwest,
            Direction::North,
            Direction::Northeast,
            Direction::West,
            Direction::East,
            Direction::Southwest,
            Direction::South,
            Direction::Southeast,
        ]
    }
}
