//! Coupling between the host's falling piece and its soft blob.
//!
//! The piece lives in grid space: integer cell offsets, an integer column and
//! a fractional row. Blob geometry is laid out in tank columns, the same
//! frame as locked goop; the host's screen column is resolved through the
//! tank rotation. Each frame the row advances at the host's fall speed and
//! the blob's home targets are shifted by the same amount in pixels; the
//! vertices catch up through physics. Landing is found on the grid, the same
//! way a ghost piece is computed, and confirmed against the blob's lowest
//! vertices once physics has run. It is only ever reported.

use glam::Vec2;

use crate::api::types::{ActivePieceState, BlobId, GridCell, StepContext};
use crate::core::grid::{wrap_column, GridOccupancy};

/// How far above the resting floor (in cells) the lowest vertex may still
/// be while the piece counts as touching it.
const CONTACT_SLOP: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct FallingPiece {
    pub id: BlobId,
    /// Cell offsets relative to the piece origin.
    pub offsets: Vec<GridCell>,
    /// Screen column of the piece origin, as the host places it.
    pub grid_x: i32,
    /// Tank column of the piece origin: `grid_x` through `rotation`.
    pub column: i32,
    /// Tank rotation `column` was resolved with.
    pub rotation: i32,
    /// Row of the piece origin; fractional while falling.
    pub grid_y: f32,
    /// The row target reached the landing row on the grid.
    pub landed: bool,
    /// Landed, and the blob's lowest vertices have reached the floor.
    pub is_colliding: bool,
}

impl FallingPiece {
    pub fn new(
        id: BlobId,
        offsets: Vec<GridCell>,
        grid_x: i32,
        grid_y: i32,
        rotation: i32,
        cols: u32,
    ) -> Self {
        Self {
            id,
            offsets,
            grid_x,
            column: wrap_column(grid_x, rotation, cols),
            rotation,
            grid_y: grid_y as f32,
            landed: false,
            is_colliding: false,
        }
    }

    /// Pixel position of the piece origin, the topology origin for its blob.
    pub fn origin_px(&self, cell_size: f32, tank_origin: Vec2) -> Vec2 {
        tank_origin + Vec2::new(self.column as f32, self.grid_y) * cell_size
    }

    /// Whether every cell is free with the origin at `row`.
    fn fits_at(&self, grid: &GridOccupancy, row: i32) -> bool {
        self.offsets.iter().all(|c| {
            let y = row + c.y;
            if y >= grid.rows as i32 {
                return false;
            }
            let col = grid.wrap_column(self.column + c.x, 0);
            !grid.is_occupied(col, y)
        })
    }

    /// Lowest whole row the piece origin can reach from its current row.
    pub fn landing_row(&self, grid: &GridOccupancy) -> i32 {
        let base = self.grid_y.floor() as i32;
        let mut drop = 0;
        // The walk is bounded by the tank floor.
        while drop <= grid.rows as i32 && self.fits_at(grid, base + drop + 1) {
            drop += 1;
        }
        base + drop
    }

    /// Re-resolve the tank column for a new tank rotation. Returns the
    /// horizontal shift in pixels. The piece holds still on screen while the
    /// tank turns under it, so the blob moves rigidly by this amount.
    pub fn follow_rotation(&mut self, rotation: i32, cols: u32, cell_size: f32) -> f32 {
        if rotation == self.rotation {
            return 0.0;
        }
        let column = wrap_column(self.grid_x, rotation, cols);
        let dx = column - self.column;
        self.rotation = rotation;
        self.column = column;
        dx as f32 * cell_size
    }

    /// Advance the row by one frame of falling. Returns the vertical home
    /// shift in pixels (zero once resting).
    pub fn advance(&mut self, ctx: &StepContext<'_>, dt: f32, cell_size: f32) -> f32 {
        if cell_size <= 0.0 {
            return 0.0;
        }
        let limit = self.landing_row(ctx.grid) as f32;
        let speed = if ctx.fall_speed.is_finite() { ctx.fall_speed.max(0.0) } else { 0.0 };
        let target = self.grid_y + speed * dt / cell_size;
        let new_y = if target >= limit {
            self.landed = true;
            limit
        } else {
            self.landed = false;
            self.is_colliding = false;
            target
        };
        let delta = new_y - self.grid_y;
        self.grid_y = new_y;
        delta * cell_size
    }

    /// Settle the collision report against the simulated blob. `lowest_y` is
    /// the blob's bottom vertex in pixels; `None` trusts the grid alone.
    pub fn update_contact(&mut self, lowest_y: Option<f32>, cell_size: f32, tank_origin: Vec2) {
        let bottom_row = self.offsets.iter().map(|c| c.y).max().unwrap_or(0);
        let floor = tank_origin.y + (self.grid_y + (bottom_row + 1) as f32) * cell_size;
        let touching = lowest_y.map_or(true, |y| y >= floor - CONTACT_SLOP * cell_size);
        let colliding = self.landed && touching;
        if colliding && !self.is_colliding {
            log::debug!("{} landed at row {}", self.id, self.grid_y);
        }
        self.is_colliding = colliding;
    }

    /// Move the piece sideways by `dx` screen columns. Returns the change of
    /// tank column in pixels. Legality is the rules engine's call.
    pub fn shift(&mut self, dx: i32, cols: u32, cell_size: f32) -> f32 {
        self.grid_x += dx;
        let column = wrap_column(self.grid_x, self.rotation, cols);
        let moved = column - self.column;
        self.column = column;
        // A shift may leave the piece hanging over a gap; the next advance
        // re-evaluates contact.
        self.landed = false;
        self.is_colliding = false;
        moved as f32 * cell_size
    }

    pub fn state(&self) -> ActivePieceState {
        ActivePieceState {
            is_colliding: self.is_colliding,
            grid_y: self.grid_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: f32 = 30.0;

    fn domino_at(rotation: i32) -> FallingPiece {
        FallingPiece::new(
            BlobId::falling(1),
            vec![GridCell::new(0, 0), GridCell::new(1, 0)],
            5,
            0,
            rotation,
            12,
        )
    }

    fn domino() -> FallingPiece {
        domino_at(0)
    }

    #[test]
    fn landing_row_on_empty_floor() {
        let grid = GridOccupancy::new(12, 18);
        assert_eq!(domino().landing_row(&grid), 17);
    }

    #[test]
    fn landing_row_on_goop() {
        let mut grid = GridOccupancy::new(12, 18);
        grid.set(6, 10, true);
        assert_eq!(domino().landing_row(&grid), 9);
    }

    #[test]
    fn landing_respects_tank_rotation() {
        let mut grid = GridOccupancy::new(12, 18);
        // Screen column 5 maps to grid column 8 under rotation 3.
        grid.set(8, 4, true);
        let rotated = domino_at(3);
        assert_eq!(rotated.column, 8);
        assert_eq!(rotated.landing_row(&grid), 3);
        assert_eq!(domino().landing_row(&grid), 17);
    }

    #[test]
    fn origin_is_in_tank_columns() {
        let p = domino_at(3);
        assert_eq!(p.origin_px(S, Vec2::ZERO), Vec2::new(240.0, 0.0));
        let wrapped = domino_at(8);
        assert_eq!(wrapped.column, 1);
    }

    #[test]
    fn rotation_moves_column_not_screen_position() {
        let mut p = domino();
        assert_eq!(p.follow_rotation(0, 12, S), 0.0);
        assert_eq!(p.follow_rotation(3, 12, S), 90.0);
        assert_eq!((p.grid_x, p.column), (5, 8));
        // Crossing the seam jumps to the other side of the tank.
        assert_eq!(p.follow_rotation(7, 12, S), -240.0);
        assert_eq!(p.column, 0);
    }

    #[test]
    fn advance_moves_at_fall_speed() {
        let grid = GridOccupancy::new(12, 18);
        let ctx = StepContext { grid: &grid, tank_rotation: 0, fall_speed: 60.0 };
        let mut p = domino();
        let dy = p.advance(&ctx, 0.5, S);
        assert!((dy - 30.0).abs() < 1e-4);
        assert!((p.grid_y - 1.0).abs() < 1e-6);
        assert!(!p.landed);
        assert!(!p.state().is_colliding);
    }

    #[test]
    fn advance_clamps_at_landing_row() {
        let grid = GridOccupancy::new(12, 18);
        let ctx = StepContext { grid: &grid, tank_rotation: 0, fall_speed: 30.0 };
        let mut p = domino();
        p.grid_y = 16.9;
        let dy = p.advance(&ctx, 0.5, S);
        assert!((dy - 0.1 * S).abs() < 1e-3);
        assert!(p.landed);
        assert_eq!(p.state().grid_y, 17.0);
        assert_eq!(p.advance(&ctx, 0.5, S), 0.0);
        assert!(p.landed);
    }

    #[test]
    fn contact_waits_for_lowest_vertices() {
        let grid = GridOccupancy::new(12, 18);
        let ctx = StepContext { grid: &grid, tank_rotation: 0, fall_speed: 30.0 };
        let mut p = domino();
        p.grid_y = 16.9;
        p.advance(&ctx, 0.5, S);
        // Floor of row 17 is at y = 540.
        p.update_contact(Some(500.0), S, Vec2::ZERO);
        assert!(p.landed && !p.state().is_colliding);
        p.update_contact(Some(538.0), S, Vec2::ZERO);
        assert!(p.state().is_colliding);
        p.update_contact(None, S, Vec2::ZERO);
        assert!(p.state().is_colliding);
    }

    #[test]
    fn no_contact_while_airborne() {
        let grid = GridOccupancy::new(12, 18);
        let ctx = StepContext { grid: &grid, tank_rotation: 0, fall_speed: 30.0 };
        let mut p = domino();
        p.advance(&ctx, 0.1, S);
        p.update_contact(Some(540.0), S, Vec2::ZERO);
        assert!(!p.state().is_colliding);
    }

    #[test]
    fn shift_off_a_ledge_falls_again() {
        let mut grid = GridOccupancy::new(12, 18);
        grid.set(5, 5, true);
        grid.set(6, 5, true);
        let ctx = StepContext { grid: &grid, tank_rotation: 0, fall_speed: 30.0 };
        let mut p = domino();
        p.grid_y = 4.0;
        p.advance(&ctx, 0.1, S);
        assert!(p.landed);
        assert!((p.shift(2, 12, S) - 60.0).abs() < 1e-6);
        assert!(!p.landed);
        let dy = p.advance(&ctx, 0.1, S);
        assert!(dy > 0.0);
        assert!(!p.landed);
    }

    #[test]
    fn shift_wraps_at_the_seam() {
        let mut p = domino();
        p.shift(-5, 12, S);
        assert_eq!(p.column, 0);
        assert_eq!(p.shift(-1, 12, S), 11.0 * S);
        assert_eq!((p.grid_x, p.column), (-1, 11));
    }

    #[test]
    fn negative_speed_does_not_lift() {
        let grid = GridOccupancy::new(12, 18);
        let ctx = StepContext { grid: &grid, tank_rotation: 0, fall_speed: -100.0 };
        let mut p = domino();
        p.grid_y = 3.0;
        assert_eq!(p.advance(&ctx, 0.1, S), 0.0);
        assert_eq!(p.grid_y, 3.0);
    }
}
