//! Soft blob data: vertices, springs, and the blob that owns them.
//!
//! Vertex count and spring topology are fixed for a blob's lifetime. A new
//! cell set means a new topology; see [`SoftBlob::transfer_state_from`].

use glam::Vec2;

use crate::api::types::{BlobId, GoopColor, GridCell};
use crate::core::topology::BlobTopology;
use crate::core::vector;

/// One point on a blob's outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Vec2,
    /// Position last tick. Velocity is implicit: `pos - prev_pos`.
    pub prev_pos: Vec2,
    /// Rest target derived from the grid cells.
    pub home: Vec2,
    /// Acceleration accumulated for the next integration (px/s²).
    pub acceleration: Vec2,
    /// Held at `home`; integration and constraints leave it alone.
    pub is_anchor: bool,
}

impl Vertex {
    pub fn at_home(home: Vec2) -> Self {
        Self {
            pos: home,
            prev_pos: home,
            home,
            acceleration: Vec2::ZERO,
            is_anchor: false,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.pos - self.prev_pos
    }

    pub fn displacement(&self) -> f32 {
        (self.pos - self.home).length()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringKind {
    /// Outline edge or short diagonal between two vertices.
    Structural,
    /// Directed pull of vertex `a` toward its own home (`a == b`, rest 0).
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub rest_length: f32,
    pub kind: SpringKind,
    /// Multiplier on the profile stiffness.
    pub stiffness: f32,
}

/// Lifecycle phase of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobPhase {
    Falling,
    /// Between a lock event and the rebuilt locked shape taking over.
    Promoting,
    Locked,
}

/// The deformable polygon for one goop group or the falling piece.
#[derive(Debug, Clone)]
pub struct SoftBlob {
    pub id: BlobId,
    pub color: GoopColor,
    /// Closed loop, counter-clockwise.
    pub vertices: Vec<Vertex>,
    pub springs: Vec<Spring>,
    /// Home-shape area; pressure pushes back toward it.
    pub target_area: f32,
    /// Vertex average, refreshed after every step.
    pub centroid: Vec2,
    /// Cells the home shape was built from. Absolute grid cells for locked
    /// blobs, piece offsets for the falling blob.
    pub cells: Vec<GridCell>,
    pub is_falling: bool,
    pub is_locked: bool,
}

impl SoftBlob {
    /// Create a blob at rest on its home shape.
    pub fn new(id: BlobId, color: GoopColor, topology: BlobTopology, falling: bool) -> Self {
        let BlobTopology { homes, springs, cells, area } = topology;
        let vertices: Vec<Vertex> = homes.into_iter().map(Vertex::at_home).collect();
        let mut blob = Self {
            id,
            color,
            vertices,
            springs,
            target_area: area,
            centroid: Vec2::ZERO,
            cells,
            is_falling: falling,
            is_locked: !falling,
        };
        blob.update_centroid();
        blob
    }

    pub fn phase(&self) -> BlobPhase {
        match (self.is_falling, self.is_locked) {
            (true, _) => BlobPhase::Falling,
            (false, true) => BlobPhase::Locked,
            (false, false) => BlobPhase::Promoting,
        }
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.vertices.iter().map(|v| v.pos).collect()
    }

    pub fn homes(&self) -> Vec<Vec2> {
        self.vertices.iter().map(|v| v.home).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Current signed area of the outline.
    pub fn area(&self) -> f32 {
        vector::signed_area(&self.positions())
    }

    pub fn update_centroid(&mut self) {
        self.centroid = vector::centroid(&self.positions());
    }

    /// Largest distance of any vertex from its home.
    pub fn max_displacement(&self) -> f32 {
        self.vertices
            .iter()
            .map(Vertex::displacement)
            .fold(0.0, f32::max)
    }

    /// Shift every home target by `delta`. Positions follow through physics.
    pub fn translate_home(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            v.home += delta;
        }
    }

    /// Move the whole blob by `delta`: positions, history, and homes. The
    /// shape and velocity are unchanged.
    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            v.pos += delta;
            v.prev_pos += delta;
            v.home += delta;
        }
        self.centroid += delta;
    }

    /// Largest vertex y, the bottom of the blob in a y-down frame.
    pub fn lowest_y(&self) -> Option<f32> {
        self.vertices.iter().map(|v| v.pos.y).reduce(f32::max)
    }

    /// Mark vertices whose home sits on a corner of a fixed cell as anchors.
    /// Returns the number of anchored vertices.
    pub fn anchor_to_cells(&mut self, fixed: &[GridCell], cell_size: f32, origin: Vec2) -> usize {
        let eps = cell_size * 1e-3;
        let mut count = 0;
        for v in &mut self.vertices {
            let on_fixed = fixed.iter().any(|c| {
                let min = origin + Vec2::new(c.x as f32, c.y as f32) * cell_size;
                let max = min + Vec2::splat(cell_size);
                let corner_x = (v.home.x - min.x).abs() < eps || (v.home.x - max.x).abs() < eps;
                let corner_y = (v.home.y - min.y).abs() < eps || (v.home.y - max.y).abs() < eps;
                corner_x && corner_y
            });
            if on_fixed {
                v.is_anchor = true;
                v.pos = v.home;
                v.prev_pos = v.home;
                count += 1;
            }
        }
        count
    }

    /// Carry physical state from `old` (a previous shape of this blob) onto
    /// this freshly built topology without teleporting.
    ///
    /// Each vertex takes the position and velocity of the old vertex with the
    /// nearest home. When that home is more than half a cell away the vertex
    /// has no counterpart and instead keeps the old vertex's displacement
    /// relative to its own home.
    pub fn transfer_state_from(&mut self, old: &[Vertex], cell_size: f32) {
        if old.is_empty() {
            return;
        }
        let match_dist = cell_size * 0.5;
        for v in &mut self.vertices {
            let nearest = old
                .iter()
                .min_by(|a, b| {
                    let da = a.home.distance_squared(v.home);
                    let db = b.home.distance_squared(v.home);
                    da.total_cmp(&db)
                })
                .copied();
            let Some(src) = nearest else { continue };
            if src.home.distance(v.home) <= match_dist {
                v.pos = src.pos;
                v.prev_pos = src.prev_pos;
            } else {
                let offset = src.pos - src.home;
                v.pos = v.home + offset;
                v.prev_pos = v.pos - src.velocity();
            }
        }
        self.update_centroid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::topology::build_topology;

    const S: f32 = 30.0;

    fn blob(cells: &[GridCell], falling: bool) -> SoftBlob {
        let topo = build_topology(cells, S, Vec2::ZERO);
        SoftBlob::new(BlobId::falling(1), GoopColor(0xff0000), topo, falling)
    }

    #[test]
    fn new_blob_rests_on_home() {
        let b = blob(&[GridCell::new(0, 0)], true);
        assert_eq!(b.vertex_count(), 4);
        assert_eq!(b.max_displacement(), 0.0);
        assert!((b.area() - S * S).abs() < 1e-3);
        assert!((b.centroid - Vec2::splat(S / 2.0)).length() < 1e-4);
        assert_eq!(b.phase(), BlobPhase::Falling);
    }

    #[test]
    fn one_home_spring_per_vertex() {
        let b = blob(&[GridCell::new(0, 0), GridCell::new(1, 0), GridCell::new(0, 1)], false);
        let homes: Vec<_> = b.springs.iter().filter(|s| s.kind == SpringKind::Home).collect();
        assert_eq!(homes.len(), b.vertex_count());
        for (i, s) in homes.iter().enumerate() {
            assert_eq!((s.a, s.b), (i, i));
            assert_eq!(s.rest_length, 0.0);
        }
        assert_eq!(b.phase(), BlobPhase::Locked);
    }

    #[test]
    fn translate_home_moves_targets_only() {
        let mut b = blob(&[GridCell::new(0, 0)], true);
        let before = b.positions();
        b.translate_home(Vec2::new(0.0, 10.0));
        assert_eq!(b.positions(), before);
        assert!((b.max_displacement() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn translate_moves_everything_rigidly() {
        let mut b = blob(&[GridCell::new(0, 0)], true);
        // Vertex 2 is the (30, 30) corner.
        b.vertices[2].pos.y += 3.0;
        let velocity = b.vertices[2].velocity();
        let displacement = b.max_displacement();
        b.translate(Vec2::new(90.0, 0.0));
        assert!((b.max_displacement() - displacement).abs() < 1e-4);
        assert_eq!(b.vertices[2].velocity(), velocity);
        assert!(b.homes().contains(&Vec2::new(90.0, 0.0)));
        assert_eq!(b.lowest_y(), Some(33.0));
    }

    #[test]
    fn anchors_mark_shared_corners() {
        let mut b = blob(&[GridCell::new(0, 0), GridCell::new(1, 0)], false);
        // A fixed cell directly below column 0 shares corners (0,30) and (30,30).
        let n = b.anchor_to_cells(&[GridCell::new(0, 1)], S, Vec2::ZERO);
        assert_eq!(n, 2);
        assert_eq!(b.vertices.iter().filter(|v| v.is_anchor).count(), 2);
    }

    #[test]
    fn transfer_copies_matching_vertices() {
        let mut old = blob(&[GridCell::new(0, 0), GridCell::new(1, 0)], true);
        for (i, v) in old.vertices.iter_mut().enumerate() {
            v.pos += Vec2::new(i as f32, 1.0);
            v.prev_pos = v.pos - Vec2::new(0.0, 0.5);
        }
        let mut new = blob(&[GridCell::new(0, 0), GridCell::new(1, 0)], false);
        new.transfer_state_from(&old.vertices, S);
        assert_eq!(new.positions(), old.positions());
        for v in &new.vertices {
            assert!((v.velocity() - Vec2::new(0.0, 0.5)).length() < 1e-5);
        }
    }

    #[test]
    fn transfer_offsets_unmatched_vertices() {
        let mut old = blob(&[GridCell::new(0, 0)], true);
        for v in &mut old.vertices {
            v.pos += Vec2::new(2.0, 0.0);
            v.prev_pos = v.pos;
        }
        let mut new = blob(&[GridCell::new(0, 0), GridCell::new(0, 1), GridCell::new(0, 2)], false);
        new.transfer_state_from(&old.vertices, S);
        for v in &new.vertices {
            // Every vertex either copied an old one or kept its displacement.
            assert!((v.pos - v.home - Vec2::new(2.0, 0.0)).length() < 1e-4);
        }
    }
}
