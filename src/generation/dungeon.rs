//! # Dungeon Generation
//!
//! Procedural dungeon layout generation using binary space partitioning.
//!
//! The generator recursively splits the map rectangle, carves one room into every leaf
//! that is large enough, and then walks the partition tree bottom-up joining the two
//! halves of every split with an L-shaped corridor. Because each split is joined only after
//! both of its halves are internally connected, every generated room is reachable from
//! every other room.

use crate::game::Position;
use crate::{CrawlError, CrawlResult, GenerationConfig, Generator, RandomStream, Room};
use log::{debug, trace};
use pathfinding::prelude::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single cell of the dungeon grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Solid rock; impassable and opaque
    Wall,
    /// Open floor
    Floor,
    /// The level exit
    Door,
}

impl Tile {
    /// Returns true if entities may stand on this tile.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    /// Returns true if this tile stops rays of sight.
    pub fn blocks_sight(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// A generated level layout: the tile grid and the rooms carved into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    /// Width in tiles
    pub width: i32,
    /// Height in tiles
    pub height: i32,
    /// Tile grid, indexed `[y][x]`
    pub tiles: Vec<Vec<Tile>>,
    /// Rooms in the order they were discovered in the partition tree
    pub rooms: Vec<Room>,
    /// Background text used when drawing the floor; opaque to the game logic
    pub background: Option<usize>,
}

impl Dungeon {
    /// Creates a dungeon of solid wall.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Dungeon, Position, Tile};
    ///
    /// let dungeon = Dungeon::new(10, 5, None);
    /// assert_eq!(dungeon.get_tile(Position::new(9, 4)), Some(Tile::Wall));
    /// assert_eq!(dungeon.get_tile(Position::new(10, 4)), None);
    /// ```
    pub fn new(width: i32, height: i32, background: Option<usize>) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![vec![Tile::Wall; width as usize]; height as usize],
            rooms: Vec::new(),
            background,
        }
    }

    /// Creates a dungeon whose every tile is floor, bordered by nothing.
    ///
    /// Handy for scripted scenarios where the layout does not matter.
    pub fn open_floor(width: i32, height: i32) -> Self {
        let mut dungeon = Self::new(width, height, None);
        for row in &mut dungeon.tiles {
            row.fill(Tile::Floor);
        }
        dungeon
    }

    /// Checks whether a position lies on the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Gets the tile at a position, or None off the grid.
    pub fn get_tile(&self, pos: Position) -> Option<Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some(self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Sets the tile at a position. Positions off the grid are ignored.
    ///
    /// Returns whether the tile was written.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> bool {
        if !self.is_valid_position(pos) {
            return false;
        }
        self.tiles[pos.y as usize][pos.x as usize] = tile;
        true
    }

    /// Returns true if the position is on the grid and not a wall.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(Tile::is_walkable)
    }

    /// The center of the grid, used as the fallback spawn position.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Number of walkable tiles on the grid.
    pub fn walkable_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.is_walkable())
            .count()
    }

    /// Carves a room to floor.
    pub fn carve_room(&mut self, room: &Room) {
        for pos in room.positions() {
            self.set_tile(pos, Tile::Floor);
        }
    }

    /// Carves a horizontal corridor along row `y` between `x1` and `x2` inclusive.
    pub fn carve_horizontal_corridor(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.set_tile(Position::new(x, y), Tile::Floor);
        }
    }

    /// Carves a vertical corridor along column `x` between `y1` and `y2` inclusive.
    pub fn carve_vertical_corridor(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.set_tile(Position::new(x, y), Tile::Floor);
        }
    }

    /// Places the level exit inside the last room, off its outer ring.
    ///
    /// Without rooms the exit falls back to the grid center and no tile is changed.
    pub fn place_door(&mut self, rng: &mut RandomStream) -> Position {
        let Some(room) = self.rooms.last().copied() else {
            return self.center();
        };

        let door = Position::new(
            room.top_left.x + rng.below_i32(room.width - 2) + 1,
            room.top_left.y + rng.below_i32(room.height - 2) + 1,
        );
        self.set_tile(door, Tile::Door);
        door
    }

    /// Walkable 4-neighbours of a position.
    pub fn walkable_neighbours(&self, pos: Position) -> Vec<Position> {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&next| self.is_walkable(next))
            .collect()
    }

    /// Every walkable position reachable from `start` by 4-directional steps.
    ///
    /// Returns an empty set if `start` itself is not walkable.
    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        if !self.is_walkable(start) {
            return HashSet::new();
        }
        bfs_reach(start, |&pos| self.walkable_neighbours(pos)).collect()
    }
}

/// Root of every partition tree.
const ROOT: usize = 0;

/// A region of the partition tree.
///
/// Children are indices into the owning [`BspTree`]'s arena.
#[derive(Debug, Clone)]
struct BspNode {
    origin: Position,
    width: i32,
    height: i32,
    left: Option<usize>,
    right: Option<usize>,
    room: Option<Room>,
}

impl BspNode {
    fn new(origin: Position, width: i32, height: i32) -> Self {
        Self {
            origin,
            width,
            height,
            left: None,
            right: None,
            room: None,
        }
    }

    fn children(&self) -> Option<(usize, usize)> {
        self.left.zip(self.right)
    }
}

/// Binary space partition of the map rectangle, stored as an arena of nodes.
#[derive(Debug, Clone)]
struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    fn new(width: i32, height: i32) -> Self {
        Self {
            nodes: vec![BspNode::new(Position::origin(), width, height)],
        }
    }

    fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.children().is_none())
            .count()
    }

    /// Splits a node and its descendants until `depth` runs out or regions get too small.
    fn split(
        &mut self,
        index: usize,
        depth: u32,
        config: &GenerationConfig,
        rng: &mut RandomStream,
    ) {
        if depth == 0 {
            return;
        }

        let min = config.min_room_size;
        let (origin, width, height) = {
            let node = &self.nodes[index];
            (node.origin, node.width, node.height)
        };

        // Long regions are always cut across their long side
        let mut horizontal = rng.float() > 0.5;
        if width as f32 / height as f32 >= 1.25 {
            horizontal = false;
        } else if height as f32 / width as f32 >= 1.25 {
            horizontal = true;
        }

        let span = if horizontal { height } else { width } - min;
        if span <= min {
            return;
        }
        let offset = rng.below_i32(span - min) + min;

        let (left, right) = if horizontal {
            (
                BspNode::new(origin, width, offset),
                BspNode::new(Position::new(origin.x, origin.y + offset), width, height - offset),
            )
        } else {
            (
                BspNode::new(origin, offset, height),
                BspNode::new(Position::new(origin.x + offset, origin.y), width - offset, height),
            )
        };

        let left_index = self.nodes.len();
        self.nodes.push(left);
        let right_index = self.nodes.len();
        self.nodes.push(right);
        self.nodes[index].left = Some(left_index);
        self.nodes[index].right = Some(right_index);

        self.split(left_index, depth - 1, config, rng);
        self.split(right_index, depth - 1, config, rng);
    }

    /// Places one room in every leaf that can hold it, left subtrees first.
    fn create_rooms(&mut self, index: usize, config: &GenerationConfig, rng: &mut RandomStream) {
        if let Some((left, right)) = self.nodes[index].children() {
            self.create_rooms(left, config, rng);
            self.create_rooms(right, config, rng);
            return;
        }

        let min = config.min_room_size;
        let node = &self.nodes[index];
        if node.width < min + 2 || node.height < min + 2 {
            trace!(
                "Leaf {}x{} at {:?} is too small for a room",
                node.width,
                node.height,
                node.origin
            );
            return;
        }

        let max_width = config.max_room_size.min(node.width - 2).max(min);
        let max_height = config.max_room_size.min(node.height - 2).max(min);

        let room_width = if max_width > min {
            rng.below_i32(max_width - min + 1) + min
        } else {
            min
        };
        let room_height = if max_height > min {
            rng.below_i32(max_height - min + 1) + min
        } else {
            min
        };

        let slack_x = node.width - room_width - 1;
        let room_x = if slack_x > 1 {
            node.origin.x + rng.below_i32(slack_x) + 1
        } else {
            node.origin.x + 1
        };
        let slack_y = node.height - room_height - 1;
        let room_y = if slack_y > 1 {
            node.origin.y + rng.below_i32(slack_y) + 1
        } else {
            node.origin.y + 1
        };

        self.nodes[index].room = Some(Room::new(
            Position::new(room_x, room_y),
            room_width,
            room_height,
        ));
    }

    /// All rooms in pre-order, left subtrees first.
    fn rooms(&self) -> Vec<Room> {
        let mut rooms = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if let Some(room) = node.room {
                rooms.push(room);
            } else if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
        }
        rooms
    }

    /// The first room found below `index`, searching left before right.
    fn first_room(&self, index: usize) -> Option<Room> {
        let node = &self.nodes[index];
        if node.room.is_some() {
            return node.room;
        }
        let (left, right) = node.children()?;
        self.first_room(left).or_else(|| self.first_room(right))
    }

    /// Joins the two halves of every split, deepest splits first.
    fn connect(&self, index: usize, dungeon: &mut Dungeon, rng: &mut RandomStream) {
        let Some((left, right)) = self.nodes[index].children() else {
            return;
        };

        self.connect(left, dungeon, rng);
        self.connect(right, dungeon, rng);

        let (Some(left_room), Some(right_room)) = (self.first_room(left), self.first_room(right))
        else {
            return;
        };

        let from = left_room.center();
        let to = right_room.center();

        if rng.float() > 0.5 {
            dungeon.carve_horizontal_corridor(from.x, to.x, from.y);
            dungeon.carve_vertical_corridor(from.y, to.y, to.x);
        } else {
            dungeon.carve_vertical_corridor(from.y, to.y, from.x);
            dungeon.carve_horizontal_corridor(from.x, to.x, to.y);
        }
    }
}

/// Dungeon generator using binary space partitioning.
///
/// This generator creates dungeons by:
/// 1. Recursively splitting the map into regions
/// 2. Carving one room into every leaf region large enough to hold it
/// 3. Joining sibling regions bottom-up with L-shaped corridors
#[derive(Debug, Clone, Default)]
pub struct BspGenerator {
    /// Size bounds and split depth
    pub config: GenerationConfig,
}

impl BspGenerator {
    /// Creates a generator with the standard configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{BspGenerator, Generator, RandomStream};
    ///
    /// let generator = BspGenerator::new();
    /// let mut rng = RandomStream::new(42);
    /// let dungeon = generator.generate(80, 40, &mut rng, None);
    /// assert!(!dungeon.rooms.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_config(GenerationConfig::new())
    }

    /// Creates a generator with custom bounds.
    pub fn with_config(config: GenerationConfig) -> Self {
        Self { config }
    }
}

impl Generator<Dungeon> for BspGenerator {
    fn generate(
        &self,
        width: i32,
        height: i32,
        rng: &mut RandomStream,
        background: Option<usize>,
    ) -> Dungeon {
        let (width, height) = self.config.clamp_dimensions(width, height);
        let mut dungeon = Dungeon::new(width, height, background);

        let mut tree = BspTree::new(width, height);
        tree.split(ROOT, self.config.bsp_depth, &self.config, rng);
        tree.create_rooms(ROOT, &self.config, rng);

        dungeon.rooms = tree.rooms();
        for room in dungeon.rooms.clone() {
            dungeon.carve_room(&room);
        }
        tree.connect(ROOT, &mut dungeon, rng);

        debug!(
            "{} built a {}x{} dungeon: {} leaves, {} rooms, {} walkable tiles",
            self.generator_type(),
            width,
            height,
            tree.leaf_count(),
            dungeon.rooms.len(),
            dungeon.walkable_count()
        );

        dungeon
    }

    fn validate(&self, dungeon: &Dungeon) -> CrawlResult<()> {
        let Some(first) = dungeon.rooms.first() else {
            return Err(CrawlError::GenerationFailed(
                "Dungeon has no rooms".to_string(),
            ));
        };

        let reachable = dungeon.reachable_from(first.center());
        for (index, room) in dungeon.rooms.iter().enumerate() {
            if !reachable.contains(&room.center()) {
                return Err(CrawlError::GenerationFailed(format!(
                    "Room {} at {:?} is not connected to the first room",
                    index, room.top_left
                )));
            }
        }

        for (y, row) in dungeon.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                if *tile == Tile::Door && !reachable.contains(&pos) {
                    return Err(CrawlError::GenerationFailed(format!(
                        "Door at {:?} is unreachable",
                        pos
                    )));
                }
            }
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "BspGenerator"
    }
}

/// Generates a dungeon with the standard configuration.
pub fn generate_dungeon(
    width: i32,
    height: i32,
    rng: &mut RandomStream,
    background: Option<usize>,
) -> Dungeon {
    BspGenerator::new().generate(width, height, rng, background)
}
