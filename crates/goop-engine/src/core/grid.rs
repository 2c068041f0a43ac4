//! Locked-cell occupancy grid supplied by the host each frame.
//!
//! Cells are stored in row-major order: index = y * cols + x.
//! Row 0 is the top of the tank.

use crate::api::types::GridCell;

/// Boolean occupancy of the tank grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOccupancy {
    /// Width of the grid in cells.
    pub cols: u32,
    /// Height of the grid in cells.
    pub rows: u32,
    cells: Vec<bool>,
}

impl GridOccupancy {
    /// Create an empty grid.
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; (cols * rows) as usize],
        }
    }

    /// Create a grid with the given cells occupied. Out-of-range cells are ignored.
    pub fn from_cells(cols: u32, rows: u32, occupied: &[GridCell]) -> Self {
        let mut grid = Self::new(cols, rows);
        for cell in occupied {
            grid.set(cell.x, cell.y, true);
        }
        grid
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        Some((y as u32 * self.cols + x as u32) as usize)
    }

    /// Whether (x, y) holds locked goop. Out of range is empty.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Set occupancy at (x, y). Out of range is a no-op.
    pub fn set(&mut self, x: i32, y: i32, occupied: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = occupied;
        }
    }

    /// Map a screen column to a grid column through the tank rotation.
    /// The tank wraps horizontally.
    pub fn wrap_column(&self, screen_x: i32, tank_rotation: i32) -> i32 {
        wrap_column(screen_x, tank_rotation, self.cols)
    }

    /// Count of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

/// Grid column of screen column `screen_x` in a tank `cols` wide rotated by
/// `tank_rotation` columns.
pub fn wrap_column(screen_x: i32, tank_rotation: i32, cols: u32) -> i32 {
    if cols == 0 {
        return screen_x;
    }
    (screen_x + tank_rotation).rem_euclid(cols as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let g = GridOccupancy::new(10, 18);
        assert_eq!(g.occupied_count(), 0);
        assert!(!g.is_occupied(0, 0));
    }

    #[test]
    fn set_and_query() {
        let mut g = GridOccupancy::new(5, 5);
        g.set(2, 3, true);
        assert!(g.is_occupied(2, 3));
        assert!(!g.is_occupied(3, 2));
        assert_eq!(g.occupied_count(), 1);
        g.set(2, 3, false);
        assert_eq!(g.occupied_count(), 0);
    }

    #[test]
    fn out_of_range_is_empty_and_ignored() {
        let mut g = GridOccupancy::new(5, 5);
        g.set(-1, 0, true);
        g.set(5, 5, true);
        assert_eq!(g.occupied_count(), 0);
        assert!(!g.is_occupied(-1, 0));
        assert!(!g.is_occupied(0, 99));
    }

    #[test]
    fn from_cells_marks_each() {
        let g = GridOccupancy::from_cells(4, 4, &[GridCell::new(0, 3), GridCell::new(1, 3)]);
        assert!(g.is_occupied(0, 3));
        assert!(g.is_occupied(1, 3));
        assert_eq!(g.occupied_count(), 2);
    }

    #[test]
    fn wrap_column_follows_rotation() {
        let g = GridOccupancy::new(10, 4);
        assert_eq!(g.wrap_column(3, 0), 3);
        assert_eq!(g.wrap_column(8, 4), 2);
        assert_eq!(g.wrap_column(0, -1), 9);
        assert_eq!(wrap_column(11, 3, 12), 2);
        assert_eq!(wrap_column(4, 7, 0), 4);
    }
}
