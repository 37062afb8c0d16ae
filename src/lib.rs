//! # Codecrawl
//!
//! A turn-based roguelike whose dungeons are carved out of the repository it is run in.
//!
//! ## Architecture Overview
//!
//! Everything non-deterministic in a run is drawn from one seeded stream, so a given
//! repository always produces the same dungeons, the same monsters and the same potions.
//! The crate is organised around a small deterministic core and a few thin adapters:
//!
//! - **Generation**: the random stream, BSP dungeon generation and the spawn tables
//! - **Game**: positions, entities, field of view and the turn engine ([`GameState`])
//! - **Sources**: scanning a directory for source files and deriving the run seed
//! - **Input / Rendering / Scenes**: macroquad front end that reads the state and feeds
//!   [`GameState::move_player`]
//!
//! ## Determinism
//!
//! The [`GameState`] owns the only [`RandomStream`] of a session. Generation, spawning and
//! the hazard spread all draw from it in a fixed order, which makes every level a pure
//! function of the seed and the view size.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod sources;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use scenes::{SceneManager, SceneTransition, SceneType};
pub use sources::*;

// Explicit re-exports for commonly used types
pub use game::{
    // From entities
    EnemyKind,
    EnemyProfile,
    Entity,
    EntityKind,
    // From hazard
    HazardTrap,
    // From state
    CheatKey,
    CompletionState,
    DeathCause,
    GameState,
    GameStatistics,
    LevelLayout,
    Message,
    MessageTone,
    MoveOutcome,
    SessionConfig,
    // From visibility
    FieldOfView,
    // From mod
    Direction,
    Position,
};

pub use generation::{
    BspGenerator, Dungeon, EncounterTable, GenerationConfig, Generator, RandomStream, Room, Tile,
};

/// Core error type for the Codecrawl engine.
///
/// Play itself never fails; these errors come from the adapters around the core
/// (scanning, configuration, display) and from explicit dungeon validation.
#[derive(thiserror::Error, Debug)]
pub enum CrawlError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A generated dungeon failed validation
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Display setup or rendering failed
    #[error("Display error: {0}")]
    Display(String),
}

/// Result type used throughout the Codecrawl codebase.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default view width in character cells
    pub const DEFAULT_VIEW_WIDTH: i32 = 80;

    /// Default view height in character cells
    pub const DEFAULT_VIEW_HEIGHT: i32 = 43;

    /// Rows reserved below the map for the status bar and message line
    pub const UI_ROWS: i32 = 3;

    /// Smallest dungeon width ever generated
    pub const MIN_DUNGEON_WIDTH: i32 = 40;

    /// Smallest dungeon height ever generated
    pub const MIN_DUNGEON_HEIGHT: i32 = 20;

    /// Seed used when no source files are found
    pub const DEFAULT_SEED: u64 = 42;

    /// Recursion depth of the BSP split
    pub const BSP_DEPTH: u32 = 4;

    /// Minimum room side length
    pub const MIN_ROOM_SIZE: i32 = 6;

    /// Maximum room side length
    pub const MAX_ROOM_SIZE: i32 = 15;

    /// Vision radius of the player in tiles
    pub const VISION_RADIUS: i32 = 7;

    /// Number of levels; reaching the door of the last one wins the game
    pub const MAX_LEVEL: u32 = 5;

    /// Hit points restored by a potion
    pub const POTION_HEAL: u32 = 3;

    /// Damage dealt when the hazard trap is first triggered
    pub const TRAP_DAMAGE: u32 = 2;

    /// Damage dealt by a burning hazard on later contact
    pub const BURN_DAMAGE: u32 = 1;

    /// Attempts made to find a free spawn tile before falling back to the grid center
    pub const SPAWN_ATTEMPTS: u32 = 100;

    /// Minimum number of lines for a source file to be used as background text
    pub const MIN_SOURCE_LINES: usize = 60;

    /// Maximum number of source files kept as backgrounds
    pub const MAX_SOURCE_FILES: usize = 5;
}
