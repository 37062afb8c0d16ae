//! # Generation Module
//!
//! Procedural content generation: the random stream, dungeon layout and spawn tables.
//!
//! This module provides the foundation for building levels. Everything here is a pure
//! function of its inputs and the [`RandomStream`] it is handed, so the same seed always
//! yields the same level.

pub mod dungeon;
pub mod encounters;
pub mod rng;

pub use dungeon::*;
pub use encounters::*;
pub use rng::*;

use crate::game::Position;
use crate::{config, CrawlError, CrawlResult};
use serde::{Deserialize, Serialize};

/// Configuration for dungeon generation.
///
/// Defaults reproduce the standard game; tests and configuration files may tune them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Recursion depth of the BSP split
    pub bsp_depth: u32,
    /// Minimum room size
    pub min_room_size: i32,
    /// Maximum room size
    pub max_room_size: i32,
    /// Smallest dungeon width that will be generated
    pub min_width: i32,
    /// Smallest dungeon height that will be generated
    pub min_height: i32,
}

impl GenerationConfig {
    /// Creates the standard generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.bsp_depth, 4);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new() -> Self {
        Self {
            bsp_depth: config::BSP_DEPTH,
            min_room_size: config::MIN_ROOM_SIZE,
            max_room_size: config::MAX_ROOM_SIZE,
            min_width: config::MIN_DUNGEON_WIDTH,
            min_height: config::MIN_DUNGEON_HEIGHT,
        }
    }

    /// Clamps requested dimensions to the smallest playable size.
    pub fn clamp_dimensions(&self, width: i32, height: i32) -> (i32, i32) {
        (width.max(self.min_width), height.max(self.min_height))
    }

    /// Checks that the values describe a generator that can produce rooms.
    pub fn validate(&self) -> CrawlResult<()> {
        if self.min_room_size < 1 {
            return Err(CrawlError::InvalidConfig(format!(
                "min_room_size must be positive, got {}",
                self.min_room_size
            )));
        }
        if self.max_room_size < self.min_room_size {
            return Err(CrawlError::InvalidConfig(format!(
                "max_room_size {} is smaller than min_room_size {}",
                self.max_room_size, self.min_room_size
            )));
        }
        let smallest_leaf = self.min_room_size + 2;
        if self.min_width < smallest_leaf || self.min_height < smallest_leaf {
            return Err(CrawlError::InvalidConfig(format!(
                "minimum dungeon size {}x{} cannot hold a {}x{} room",
                self.min_width, self.min_height, self.min_room_size, self.min_room_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents a rectangular room in the dungeon.
///
/// Rooms are carved entirely to floor; the walls around them are the untouched rock of
/// the BSP leaf that owns the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Top-left corner of the room
    pub top_left: Position,
    /// Width of the room
    pub width: i32,
    /// Height of the room
    pub height: i32,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Position, Room};
    ///
    /// let room = Room::new(Position::new(5, 5), 10, 8);
    /// assert_eq!(room.width, 10);
    /// assert_eq!(room.height, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// ```
    pub fn new(top_left: Position, width: i32, height: i32) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width - 1,
            self.top_left.y + self.height - 1,
        )
    }

    /// Gets the center position of the room (integer division).
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width / 2,
            self.top_left.y + self.height / 2,
        )
    }

    /// Gets the area of the room in tiles.
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Checks if a position is inside this room.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Position, Room};
    ///
    /// let room = Room::new(Position::new(5, 5), 10, 8);
    /// assert!(room.contains(Position::new(7, 7)));
    /// assert!(!room.contains(Position::new(20, 20)));
    /// ```
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width
            && pos.y < self.top_left.y + self.height
    }

    /// Checks if a position is inside the room and off its outermost ring.
    pub fn contains_interior(&self, pos: Position) -> bool {
        pos.x > self.top_left.x
            && pos.y > self.top_left.y
            && pos.x < self.top_left.x + self.width - 1
            && pos.y < self.top_left.y + self.height - 1
    }

    /// Checks if this room overlaps with another room.
    pub fn overlaps(&self, other: &Room) -> bool {
        !(self.top_left.x >= other.top_left.x + other.width
            || other.top_left.x >= self.top_left.x + self.width
            || self.top_left.y >= other.top_left.y + other.height
            || other.top_left.y >= self.top_left.y + self.height)
    }

    /// Gets all positions within this room.
    pub fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.area().max(0) as usize);

        for y in self.top_left.y..(self.top_left.y + self.height) {
            for x in self.top_left.x..(self.top_left.x + self.width) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }
}

/// Trait for procedural generators.
///
/// Generation never fails: degenerate inputs are clamped and unsatisfiable pieces are
/// dropped. [`Generator::validate`] checks the structural guarantees after the fact.
pub trait Generator<T> {
    /// Generates content for a `width` x `height` area, drawing from `rng`.
    fn generate(
        &self,
        width: i32,
        height: i32,
        rng: &mut RandomStream,
        background: Option<usize>,
    ) -> T;

    /// Validates that the generated content meets its guarantees.
    fn validate(&self, content: &T) -> CrawlResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates the random stream for a run.
    pub fn create_rng(seed: u64) -> RandomStream {
        RandomStream::new(seed)
    }

    /// Dungeon dimensions for a view of the given size.
    ///
    /// Rows reserved for the status bar are taken off the height before clamping.
    pub fn dungeon_dimensions(
        config: &GenerationConfig,
        view_width: i32,
        view_height: i32,
    ) -> (i32, i32) {
        config.clamp_dimensions(view_width, view_height - crate::config::UI_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new();
        assert_eq!(config.bsp_depth, 4);
        assert_eq!(config.min_room_size, 6);
        assert_eq!(config.max_room_size, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generation_config_rejects_inverted_sizes() {
        let config = GenerationConfig {
            max_room_size: 3,
            ..GenerationConfig::new()
        };
        assert!(matches!(
            config.validate(),
            Err(CrawlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_clamp_dimensions() {
        let config = GenerationConfig::new();
        assert_eq!(config.clamp_dimensions(10, 5), (40, 20));
        assert_eq!(config.clamp_dimensions(120, 50), (120, 50));
        assert_eq!(utils::dungeon_dimensions(&config, 80, 43), (80, 40));
        assert_eq!(utils::dungeon_dimensions(&config, 80, 22), (80, 20));
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(Position::new(5, 5), 10, 8);

        assert_eq!(room.bottom_right(), Position::new(14, 12));
        assert_eq!(room.center(), Position::new(10, 9));
        assert_eq!(room.area(), 80);

        assert!(room.contains(Position::new(5, 5))); // Top-left corner
        assert!(room.contains(Position::new(14, 12))); // Bottom-right corner
        assert!(!room.contains(Position::new(4, 5))); // Outside left
        assert!(!room.contains(Position::new(15, 12))); // Outside right

        assert!(room.contains_interior(Position::new(6, 6)));
        assert!(!room.contains_interior(Position::new(5, 6)));
        assert!(!room.contains_interior(Position::new(14, 6)));
    }

    #[test]
    fn test_room_overlap() {
        let room1 = Room::new(Position::new(5, 5), 10, 8);
        let room2 = Room::new(Position::new(10, 8), 6, 6);
        let room3 = Room::new(Position::new(20, 20), 5, 5);

        assert!(room1.overlaps(&room2));
        assert!(room2.overlaps(&room1));
        assert!(!room1.overlaps(&room3));
        assert!(!room3.overlaps(&room1));
    }

    #[test]
    fn test_room_positions() {
        let room = Room::new(Position::new(2, 3), 4, 3);
        let positions = room.positions();
        assert_eq!(positions.len(), 12);
        assert!(positions.iter().all(|&pos| room.contains(pos)));
    }
}
