//! # Visibility
//!
//! Ray-cast field of view with fog of war, and a line-of-sight test for enemy AI.

use crate::{Dungeon, Position};

/// Angle between two consecutive vision rays, in degrees.
const RAY_STEP_DEGREES: usize = 2;

/// Visible and explored grids for one dungeon.
///
/// `visible` is rebuilt by every [`FieldOfView::compute`]; `explored` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOfView {
    width: i32,
    height: i32,
    visible: Vec<Vec<bool>>,
    explored: Vec<Vec<bool>>,
}

impl FieldOfView {
    /// Creates an empty field of view sized to the dungeon.
    pub fn new(dungeon: &Dungeon) -> Self {
        let row = vec![false; dungeon.width as usize];
        Self {
            width: dungeon.width,
            height: dungeon.height,
            visible: vec![row.clone(); dungeon.height as usize],
            explored: vec![row; dungeon.height as usize],
        }
    }

    /// Recomputes the visible set from `observer`.
    ///
    /// A ray is cast every two degrees. Each ray marks tiles one unit step at a time out to
    /// `radius` and stops at the grid edge or right after marking a wall.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Dungeon, FieldOfView, Position};
    ///
    /// let dungeon = Dungeon::open_floor(40, 20);
    /// let mut fov = FieldOfView::new(&dungeon);
    /// fov.compute(&dungeon, Position::new(20, 10), 7);
    /// assert!(fov.is_visible(Position::new(27, 10)));
    /// assert!(!fov.is_visible(Position::new(28, 10)));
    /// ```
    pub fn compute(&mut self, dungeon: &Dungeon, observer: Position, radius: i32) {
        for row in &mut self.visible {
            row.fill(false);
        }

        for degrees in (0..360).step_by(RAY_STEP_DEGREES) {
            let (dy, dx) = (degrees as f64).to_radians().sin_cos();
            self.cast_ray(dungeon, observer, dx, dy, radius);
        }
    }

    fn cast_ray(
        &mut self,
        dungeon: &Dungeon,
        observer: Position,
        dx: f64,
        dy: f64,
        radius: i32,
    ) {
        let mut x = observer.x as f64;
        let mut y = observer.y as f64;

        for _ in 0..=radius {
            let pos = Position::new((x + 0.5).floor() as i32, (y + 0.5).floor() as i32);
            if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
                break;
            }

            self.visible[pos.y as usize][pos.x as usize] = true;
            self.explored[pos.y as usize][pos.x as usize] = true;

            if dungeon.get_tile(pos).map_or(true, |tile| tile.blocks_sight()) {
                break;
            }

            x += dx;
            y += dy;
        }
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.cell(&self.visible, pos)
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.cell(&self.explored, pos)
    }

    /// Number of tiles ever seen.
    pub fn explored_count(&self) -> usize {
        self.explored.iter().flatten().filter(|&&seen| seen).count()
    }

    fn cell(&self, grid: &[Vec<bool>], pos: Position) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return false;
        }
        grid[pos.y as usize][pos.x as usize]
    }
}

/// Returns true if nothing but walkable tiles lie between `from` and `to`.
///
/// Samples the straight segment once per Chebyshev step, rounding to the nearest tile. The
/// start tile is never tested; the end tile is.
pub fn has_line_of_sight(dungeon: &Dungeon, from: Position, to: Position) -> bool {
    let steps = from.chebyshev_distance(to);
    if steps == 0 {
        return true;
    }

    let x_step = (to.x - from.x) as f64 / steps as f64;
    let y_step = (to.y - from.y) as f64 / steps as f64;
    let mut x = from.x as f64;
    let mut y = from.y as f64;

    for _ in 0..steps {
        x += x_step;
        y += y_step;
        let sample = Position::new((x + 0.5).floor() as i32, (y + 0.5).floor() as i32);
        if !dungeon.is_walkable(sample) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;

    fn walled_room() -> Dungeon {
        let mut dungeon = Dungeon::new(20, 20, None);
        for y in 5..15 {
            for x in 5..15 {
                dungeon.set_tile(Position::new(x, y), Tile::Floor);
            }
        }
        dungeon
    }

    #[test]
    fn test_observer_always_visible() {
        let dungeon = walled_room();
        let mut fov = FieldOfView::new(&dungeon);
        fov.compute(&dungeon, Position::new(10, 10), 7);
        assert!(fov.is_visible(Position::new(10, 10)));
        assert!(fov.is_explored(Position::new(10, 10)));
    }

    #[test]
    fn test_walls_stop_rays() {
        let dungeon = walled_room();
        let mut fov = FieldOfView::new(&dungeon);
        fov.compute(&dungeon, Position::new(10, 10), 7);

        // The wall itself is seen, nothing behind it
        assert!(fov.is_visible(Position::new(4, 10)));
        assert!(!fov.is_visible(Position::new(3, 10)));
        assert!(!fov.is_visible(Position::new(10, 2)));
    }

    #[test]
    fn test_explored_persists() {
        let dungeon = Dungeon::open_floor(60, 20);
        let mut fov = FieldOfView::new(&dungeon);
        fov.compute(&dungeon, Position::new(5, 10), 7);
        assert!(fov.is_visible(Position::new(8, 10)));

        fov.compute(&dungeon, Position::new(50, 10), 7);
        assert!(!fov.is_visible(Position::new(8, 10)));
        assert!(fov.is_explored(Position::new(8, 10)));
        assert!(fov.is_visible(Position::new(50, 10)));
    }

    #[test]
    fn test_queries_out_of_bounds() {
        let dungeon = Dungeon::open_floor(10, 10);
        let mut fov = FieldOfView::new(&dungeon);
        fov.compute(&dungeon, Position::new(0, 0), 7);
        assert!(!fov.is_visible(Position::new(-1, 0)));
        assert!(!fov.is_explored(Position::new(10, 10)));
    }

    #[test]
    fn test_line_of_sight() {
        let mut dungeon = Dungeon::open_floor(20, 20);
        let a = Position::new(2, 10);
        let b = Position::new(12, 10);

        assert!(has_line_of_sight(&dungeon, a, a));
        assert!(has_line_of_sight(&dungeon, a, b));

        dungeon.set_tile(Position::new(7, 10), Tile::Wall);
        assert!(!has_line_of_sight(&dungeon, a, b));
        assert!(!has_line_of_sight(&dungeon, b, a));
        assert!(has_line_of_sight(&dungeon, a, Position::new(2, 2)));
    }
}
