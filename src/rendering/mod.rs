//! # Rendering Module
//!
//! Character-cell rendering of the game state.
//!
//! [`compose_map`] turns a [`GameState`] into a grid of styled cells without touching the
//! screen; [`MacroquadDisplay`] draws those cells with macroquad.

pub mod display;

pub use display::*;

use crate::{CompletionState, GameState, Position, Tile};

/// Glyphs cycled over burning tiles, one per animation step.
const FIRE_GLYPHS: [char; 3] = ['<', '=', '>'];

/// How a cell is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Never seen
    Blank,
    Wall,
    /// Floor, drawn with background text
    Code,
    Door,
    Player,
    Enemy,
    Potion,
    /// Burning hazard area
    Fire,
    /// Explored but out of sight
    Fog,
}

/// One character cell of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub style: CellStyle,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        glyph: ' ',
        style: CellStyle::Blank,
    };

    pub fn new(glyph: char, style: CellStyle) -> Self {
        Self { glyph, style }
    }
}

/// Character drawn for a floor tile: the background text at that spot, or `.`.
fn floor_glyph(state: &GameState, pos: Position) -> char {
    let Some(background) = state.background() else {
        return '.';
    };
    if background.lines.is_empty() {
        return '.';
    }
    let line = &background.lines[pos.y as usize % background.lines.len()];
    match line.chars().nth(pos.x as usize) {
        Some('\t') => ' ',
        Some(c) => c,
        None => '.',
    }
}

/// Builds the map grid, `[y][x]`, with fog of war and every visible entity on top.
pub fn compose_map(state: &GameState) -> Vec<Vec<Cell>> {
    let dungeon = state.dungeon();
    let fov = state.field_of_view();
    let hazard = state.hazard();

    let mut cells = vec![vec![Cell::BLANK; dungeon.width as usize]; dungeon.height as usize];

    for (y, row) in cells.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            if !fov.is_explored(pos) {
                continue;
            }
            let visible = fov.is_visible(pos);

            let (glyph, style) = match dungeon.get_tile(pos) {
                Some(Tile::Wall) => ('#', CellStyle::Wall),
                Some(Tile::Door) => ('>', CellStyle::Door),
                Some(Tile::Floor) | None => (floor_glyph(state, pos), CellStyle::Code),
            };

            *cell = if !visible {
                Cell::new(glyph, CellStyle::Fog)
            } else if hazard.is_burning(pos) {
                let step = hazard.animation_step as usize + x + y;
                Cell::new(FIRE_GLYPHS[step % FIRE_GLYPHS.len()], CellStyle::Fire)
            } else {
                Cell::new(glyph, style)
            };
        }
    }

    let mut place = |pos: Position, glyph: char, style: CellStyle| {
        if dungeon.is_valid_position(pos) && fov.is_visible(pos) {
            cells[pos.y as usize][pos.x as usize] = Cell::new(glyph, style);
        }
    };

    for potion in state.potions() {
        place(potion.position, potion.glyph, CellStyle::Potion);
    }
    for enemy in state.enemies().iter().filter(|enemy| enemy.is_alive()) {
        place(enemy.position, enemy.glyph, CellStyle::Enemy);
    }
    let player = state.player();
    place(player.position, player.glyph, CellStyle::Player);

    cells
}

/// The status bar under the map.
pub fn status_line(state: &GameState) -> String {
    let player = state.player();
    let mut line = format!(
        "HP: {}/{} | Level: {}/{} | Kills: {} | [q]uit",
        player.hp,
        player.max_hp,
        state.level(),
        state.max_level(),
        state.statistics().enemies_killed
    );
    if state.is_invulnerable() {
        line.push_str(" | INVULNERABLE");
    }
    line
}

/// Text of the end screen, or None while the game is running.
pub fn end_screen_lines(state: &GameState) -> Option<Vec<String>> {
    let (title, subtitle, cleared) = match state.completion_state() {
        CompletionState::Playing => return None,
        CompletionState::Victory => (
            "VICTORY!",
            "You've conquered all the dungeons!",
            state.level(),
        ),
        CompletionState::PlayerDied => (
            "GAME OVER",
            "The bugs and scope creeps won...",
            state.level() - 1,
        ),
    };

    Some(vec![
        title.to_string(),
        String::new(),
        subtitle.to_string(),
        String::new(),
        format!("Levels Cleared: {}", cleared),
        format!("Enemies Killed: {}", state.statistics().enemies_killed),
        String::new(),
        "Press ENTER or SPACE to exit".to_string(),
    ])
}
