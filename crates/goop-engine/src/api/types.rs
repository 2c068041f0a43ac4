use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::grid::GridOccupancy;

/// Stable identifier for a blob.
///
/// The falling piece is keyed by its spawn timestamp so the host can tell a
/// stale sync apart from the piece it currently owns; locked blobs are keyed
/// by their merged goop-group id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobId(pub String);

impl BlobId {
    /// Id of the falling blob for a piece spawned at `spawn_ms`.
    pub fn falling(spawn_ms: u64) -> Self {
        BlobId(format!("falling-{}", spawn_ms))
    }

    /// Id of the locked blob for a goop group.
    pub fn locked(group_id: &str) -> Self {
        BlobId(format!("goop-{}", group_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer grid coordinate. `y` grows downward (row 0 is the top of the tank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// The four edge-adjacent neighbours (up, right, down, left).
    pub fn neighbors(self) -> [GridCell; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }
}

/// Goop color as a packed 0xRRGGBB value. Only equality matters to physics
/// (same-color attraction); the renderer decides how to paint it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GoopColor(pub u32);

impl GoopColor {
    /// Components as 0.0 - 1.0 floats.
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }
}

/// Axis-aligned rectangle in physics-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Tank walls for a `cols` x `rows` grid with its top-left corner at `origin`.
    pub fn from_grid(cols: u32, rows: u32, cell_size: f32, origin: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + Vec2::new(cols as f32, rows as f32) * cell_size,
        }
    }

    /// Tight bounds of a point set; `None` when empty.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    /// Shrink every side by `amount`, never past the center.
    pub fn inset(&self, amount: f32) -> Self {
        let half = (self.max - self.min) * 0.5;
        let amount = amount.max(0.0).min(half.x.min(half.y).max(0.0));
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    /// Grow every side by `amount`.
    pub fn expand(&self, amount: f32) -> Self {
        let amount = amount.max(0.0);
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Per-frame host context handed to `GoopEngine::step`.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Locked-cell occupancy in tank columns (the falling piece is not part
    /// of it). Locked blobs are built in the same columns.
    pub grid: &'a GridOccupancy,
    /// Horizontal column offset of the rotating tank: screen column `c` is
    /// tank column `(c + tank_rotation) mod cols`. Only the falling piece is
    /// placed by screen column.
    pub tank_rotation: i32,
    /// Target fall speed of the active piece in px/s.
    pub fall_speed: f32,
}

/// Collision report for the active falling piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePieceState {
    /// The piece's row target has reached the floor or locked goop on the
    /// grid, and the blob's lowest vertices are within a quarter cell of
    /// that resting floor after this frame's physics.
    pub is_colliding: bool,
    /// Grid row of the piece origin; resolved to a whole row while colliding.
    pub grid_y: f32,
}
