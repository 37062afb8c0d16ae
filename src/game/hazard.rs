//! # Hazard Trap
//!
//! One merge-conflict trap is hidden on every level. Stepping on it the first time hurts and
//! sets the surrounding code on fire; the fire then burns anyone standing in it.

use crate::{Dungeon, Position, RandomStream};
use std::collections::HashSet;

/// Number of extra burning tiles picked around the core when the trap goes off.
pub const SPREAD_TILES: usize = 7;

/// Horizontal reach of the core the spread grows from.
const CORE_HALF_WIDTH: i32 = 2;

/// Vertical reach of the core the spread grows from.
const CORE_HALF_HEIGHT: i32 = 1;

/// The hazard trap of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardTrap {
    /// Trap tile
    pub position: Position,
    /// Set once the player first steps on the trap
    pub triggered: bool,
    /// Tiles on fire: the 3x3 block around the trap plus the spread
    pub burning: HashSet<Position>,
    /// Extra burning tiles around the core, in the order they were picked
    pub spread: Vec<Position>,
    /// Advances on every player step while something burns; drives the fire animation
    pub animation_step: u32,
}

impl HazardTrap {
    /// Creates an armed trap.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            triggered: false,
            burning: HashSet::new(),
            spread: Vec::new(),
            animation_step: 0,
        }
    }

    /// A trap that is not on the map yet. Its position is never walkable.
    pub fn unplaced() -> Self {
        Self::new(Position::new(-1, -1))
    }

    pub fn is_at(&self, pos: Position) -> bool {
        self.position == pos
    }

    pub fn is_burning(&self, pos: Position) -> bool {
        self.burning.contains(&pos)
    }

    /// Sets the trap off: marks the 3x3 block around it and spreads the fire.
    ///
    /// Returns false without touching anything if it was already triggered.
    pub fn trigger(&mut self, dungeon: &Dungeon, rng: &mut RandomStream) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = true;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let pos = self.position + Position::new(dx, dy);
                if dungeon.is_valid_position(pos) {
                    self.burning.insert(pos);
                }
            }
        }

        let mut candidates = self.spread_candidates(dungeon);
        rng.shuffle(&mut candidates);
        candidates.truncate(SPREAD_TILES);
        self.burning.extend(candidates.iter().copied());
        self.spread = candidates;
        true
    }

    /// Walkable tiles touching the 5x3 core, in row-major discovery order without repeats.
    fn spread_candidates(&self, dungeon: &Dungeon) -> Vec<Position> {
        let in_core = |pos: Position| {
            (pos.x - self.position.x).abs() <= CORE_HALF_WIDTH
                && (pos.y - self.position.y).abs() <= CORE_HALF_HEIGHT
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for dy in -CORE_HALF_HEIGHT..=CORE_HALF_HEIGHT {
            for dx in -CORE_HALF_WIDTH..=CORE_HALF_WIDTH {
                let core = self.position + Position::new(dx, dy);
                for neighbour in core.adjacent_positions() {
                    if in_core(neighbour) || !dungeon.is_walkable(neighbour) {
                        continue;
                    }
                    if seen.insert(neighbour) {
                        candidates.push(neighbour);
                    }
                }
            }
        }
        candidates
    }

    /// Steps the fire animation if anything is burning.
    pub fn advance_animation(&mut self) {
        if !self.burning.is_empty() {
            self.animation_step = self.animation_step.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_marks_block_and_spread() {
        let dungeon = Dungeon::open_floor(30, 20);
        let mut rng = RandomStream::new(8);
        let mut trap = HazardTrap::new(Position::new(15, 10));

        assert!(trap.trigger(&dungeon, &mut rng));
        assert!(trap.triggered);
        assert_eq!(trap.spread.len(), SPREAD_TILES);
        assert_eq!(trap.burning.len(), 9 + SPREAD_TILES);

        for dy in -1..=1 {
            for dx in -1..=1 {
                assert!(trap.is_burning(Position::new(15 + dx, 10 + dy)));
            }
        }
        for pos in &trap.spread {
            let dx = (pos.x - 15).abs();
            let dy = (pos.y - 10).abs();
            assert!(dx == 3 || dy == 2, "{:?} should border the core", pos);
            assert!(dx <= 3 && dy <= 2);
        }
    }

    #[test]
    fn test_second_trigger_is_noop() {
        let dungeon = Dungeon::open_floor(30, 20);
        let mut rng = RandomStream::new(8);
        let mut trap = HazardTrap::new(Position::new(15, 10));
        trap.trigger(&dungeon, &mut rng);

        let draws = rng.draws();
        let before = trap.clone();
        assert!(!trap.trigger(&dungeon, &mut rng));
        assert_eq!(trap, before);
        assert_eq!(rng.draws(), draws);
    }

    #[test]
    fn test_spread_limited_to_walkable_tiles() {
        let mut dungeon = Dungeon::new(30, 20, None);
        let room = crate::Room::new(Position::new(12, 9), 7, 3);
        dungeon.carve_room(&room);
        let mut rng = RandomStream::new(1);
        let mut trap = HazardTrap::new(Position::new(15, 10));
        trap.trigger(&dungeon, &mut rng);

        // Only columns 12 and 18 of rows 9..=11 touch the core and are floor
        assert_eq!(trap.spread.len(), 6);
        assert!(trap.spread.iter().all(|&pos| dungeon.is_walkable(pos)));
    }

    #[test]
    fn test_trigger_near_edge_stays_in_bounds() {
        let dungeon = Dungeon::open_floor(10, 10);
        let mut rng = RandomStream::new(3);
        let mut trap = HazardTrap::new(Position::new(0, 0));
        trap.trigger(&dungeon, &mut rng);
        assert!(trap
            .burning
            .iter()
            .all(|&pos| dungeon.is_valid_position(pos)));
        assert!(trap.is_burning(Position::new(1, 1)));
    }

    #[test]
    fn test_animation_only_while_burning() {
        let dungeon = Dungeon::open_floor(10, 10);
        let mut rng = RandomStream::new(3);
        let mut trap = HazardTrap::new(Position::new(5, 5));
        trap.advance_animation();
        assert_eq!(trap.animation_step, 0);

        trap.trigger(&dungeon, &mut rng);
        trap.advance_animation();
        trap.advance_animation();
        assert_eq!(trap.animation_step, 2);
    }
}
