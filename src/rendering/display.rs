//! # Display Management
//!
//! Draws the character grid with macroquad.

use crate::rendering::{compose_map, end_screen_lines, status_line, Cell, CellStyle};
use crate::{config, CrawlError, CrawlResult, GameState, MessageTone};
use macroquad::prelude::*;

/// Macroquad display manager for the game.
///
/// Every map tile is one character cell. The map is drawn from the top-left corner; the
/// status bar and message line take the rows under it.
pub struct MacroquadDisplay {
    /// Font size in pixels
    pub font_size: f32,
    /// Width of one character cell in pixels
    pub cell_width: f32,
    /// Height of one character cell in pixels
    pub cell_height: f32,
}

impl MacroquadDisplay {
    /// Creates a display whose cells fit `font_size`.
    pub fn new(font_size: f32) -> CrawlResult<Self> {
        if font_size <= 0.0 {
            return Err(CrawlError::Display(format!(
                "font size must be positive, got {}",
                font_size
            )));
        }
        let metrics = measure_text("M", None, font_size as u16, 1.0);
        Ok(Self {
            font_size,
            cell_width: metrics.width.max(1.0),
            cell_height: font_size,
        })
    }

    /// Window size in character cells.
    pub fn view_size(&self) -> (i32, i32) {
        (
            (screen_width() / self.cell_width) as i32,
            (screen_height() / self.cell_height) as i32,
        )
    }

    /// Window size in pixels that holds a `columns` x `rows` view.
    pub fn window_size_for(&self, columns: i32, rows: i32) -> (f32, f32) {
        (
            columns as f32 * self.cell_width,
            rows as f32 * self.cell_height,
        )
    }

    fn color_of(style: CellStyle) -> Color {
        match style {
            CellStyle::Blank => BLACK,
            CellStyle::Wall => WHITE,
            CellStyle::Code => DARKGRAY,
            CellStyle::Door => YELLOW,
            CellStyle::Player => GOLD,
            CellStyle::Enemy => RED,
            CellStyle::Potion => GREEN,
            CellStyle::Fire => ORANGE,
            CellStyle::Fog => Color::new(0.35, 0.35, 0.35, 1.0),
        }
    }

    fn draw_cell(&self, column: usize, row: usize, cell: Cell) {
        if cell.style == CellStyle::Blank || cell.glyph == ' ' {
            return;
        }
        let mut buffer = [0u8; 4];
        draw_text(
            cell.glyph.encode_utf8(&mut buffer),
            column as f32 * self.cell_width,
            (row + 1) as f32 * self.cell_height - self.font_size * 0.2,
            self.font_size,
            Self::color_of(cell.style),
        );
    }

    fn draw_line(&self, row: usize, text: &str, color: Color) {
        draw_text(
            text,
            0.0,
            (row + 1) as f32 * self.cell_height - self.font_size * 0.2,
            self.font_size,
            color,
        );
    }

    /// Renders the map, status bar and message line.
    pub fn render_game(&self, state: &GameState) {
        clear_background(BLACK);

        let (_, view_rows) = self.view_size();
        let map_rows = (view_rows - config::UI_ROWS).max(0) as usize;
        let cells = compose_map(state);

        for (row, line) in cells.iter().take(map_rows).enumerate() {
            for (column, cell) in line.iter().enumerate() {
                self.draw_cell(column, row, *cell);
            }
        }

        let status_row = cells.len().min(map_rows);
        self.draw_line(status_row, &status_line(state), LIGHTGRAY);

        let message = state.message();
        if !message.is_empty() {
            let color = match message.tone() {
                MessageTone::Normal => GREEN,
                MessageTone::Damage => RED,
            };
            self.draw_line(status_row + 1, message.text(), color);
        }
    }

    /// Renders the end screen over the map. Does nothing while the game runs.
    pub fn render_end_screen(&self, state: &GameState) {
        let Some(lines) = end_screen_lines(state) else {
            return;
        };

        let widest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let box_width = (widest + 4) as f32 * self.cell_width;
        let box_height = (lines.len() + 2) as f32 * self.cell_height;
        let left = (screen_width() - box_width) / 2.0;
        let top = (screen_height() - box_height) / 2.0;

        draw_rectangle(left, top, box_width, box_height, BLACK);
        draw_rectangle_lines(left, top, box_width, box_height, 2.0, WHITE);

        for (index, line) in lines.iter().enumerate() {
            let width = line.chars().count() as f32 * self.cell_width;
            draw_text(
                line,
                (screen_width() - width) / 2.0,
                top + (index + 2) as f32 * self.cell_height - self.font_size * 0.2,
                self.font_size,
                WHITE,
            );
        }
    }
}
