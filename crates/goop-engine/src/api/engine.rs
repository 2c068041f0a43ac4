use glam::Vec2;

use crate::api::types::{ActivePieceState, BlobId, Bounds, GoopColor, GridCell, StepContext};
use crate::core::blob::SoftBlob;
use crate::core::falling::FallingPiece;
use crate::core::params::PhysicsParams;
use crate::core::physics::step_physics;
use crate::core::scene::BlobScene;
use crate::core::time::StepPolicy;
use crate::core::topology::build_topology;
use crate::error::GoopError;
use crate::systems::effects::{Droplet, DropletState};
use crate::systems::filter::GooFilter;
use crate::systems::path::{render_data, BlobRenderData, INSET_DISTANCE};
use crate::systems::tendrils::{find_tendrils, Tendril};

/// Tank geometry and timing, fixed for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pixel size of one grid cell (default: 30).
    pub cell_size: f32,
    /// Tank width in cells (default: 12).
    pub cols: u32,
    /// Tank height in cells (default: 18).
    pub rows: u32,
    /// Pixel position of the tank's top-left corner.
    pub origin: Vec2,
    pub step: StepPolicy,
    /// Seed for the droplet generator.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            cols: 12,
            rows: 18,
            origin: Vec2::ZERO,
            step: StepPolicy::default(),
            seed: 42,
        }
    }
}

/// The soft-body goop engine. Owns every blob; the host drives it with
/// lifecycle calls between frames and one `step` per frame.
///
/// Blob geometry is laid out in tank columns, the frame of the occupancy
/// grid. Only the falling piece is placed by screen column; it is resolved
/// through the tank rotation last seen in [`StepContext`].
pub struct GoopEngine {
    config: EngineConfig,
    params: PhysicsParams,
    bounds: Bounds,
    scene: BlobScene,
    falling: Option<FallingPiece>,
    tank_rotation: i32,
    effects: DropletState,
}

impl GoopEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_params(config, PhysicsParams::default())
    }

    pub fn with_params(config: EngineConfig, params: PhysicsParams) -> Self {
        let bounds = Bounds::from_grid(config.cols, config.rows, config.cell_size, config.origin);
        Self {
            effects: DropletState::new(config.seed),
            config,
            params: params.sanitized(),
            bounds,
            scene: BlobScene::new(),
            falling: None,
            tank_rotation: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Replace the whole parameter record. Takes effect on the next step.
    pub fn set_params(&mut self, params: PhysicsParams) {
        self.params = params.sanitized();
    }

    /// Replace the parameter record from JSON; absent fields take defaults.
    pub fn set_params_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let params = PhysicsParams::from_json(json)?;
        self.set_params(params);
        Ok(())
    }

    /// Tank walls before the wall-thickness inset.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn build_blob(&self, id: BlobId, color: GoopColor, cells: &[GridCell], origin: Vec2, falling: bool) -> SoftBlob {
        let topology = build_topology(cells, self.config.cell_size, origin);
        SoftBlob::new(id, color, topology, falling)
    }

    // -- Lifecycle --

    /// Create the falling blob for a new piece from its cell offsets at screen
    /// column `grid_x`, row `grid_y`. Any previous falling blob is discarded.
    pub fn spawn_falling(
        &mut self,
        spawn_ms: u64,
        offsets: &[GridCell],
        grid_x: i32,
        grid_y: i32,
        color: GoopColor,
    ) -> BlobId {
        if let Some(old) = self.discard_falling() {
            log::debug!("discarded falling blob {} for new spawn", old.id);
        }
        let id = BlobId::falling(spawn_ms);
        let piece = FallingPiece::new(
            id.clone(),
            offsets.to_vec(),
            grid_x,
            grid_y,
            self.tank_rotation,
            self.config.cols,
        );
        let origin = piece.origin_px(self.config.cell_size, self.config.origin);
        let blob = self.build_blob(id.clone(), color, offsets, origin, true);
        log::debug!("spawned {} with {} vertices", id, blob.vertex_count());
        self.scene.insert(blob);
        self.falling = Some(piece);
        id
    }

    /// Remove the falling blob without locking it (swap or discard).
    pub fn discard_falling(&mut self) -> Option<SoftBlob> {
        let piece = self.falling.take()?;
        self.scene.remove(&piece.id)
    }

    /// Move the falling piece `dx` columns. Home targets shift; the blob
    /// follows through physics. Crossing the tank seam moves it rigidly.
    pub fn shift_falling(&mut self, dx: i32) -> Result<(), GoopError> {
        let cell_size = self.config.cell_size;
        let piece = self.falling.as_mut().ok_or(GoopError::NoFallingBlob)?;
        let px = piece.shift(dx, self.config.cols, cell_size);
        if let Some(blob) = self.scene.get_mut(&piece.id) {
            let delta = Vec2::new(px, 0.0);
            if (px - dx as f32 * cell_size).abs() > cell_size * 0.5 {
                blob.translate(delta);
            } else {
                blob.translate_home(delta);
            }
        }
        Ok(())
    }

    /// Rebuild the falling blob for new cell offsets (a rotated piece),
    /// carrying positions over so the shape morphs instead of jumping.
    pub fn reshape_falling(&mut self, offsets: &[GridCell]) -> Result<(), GoopError> {
        let piece = self.falling.as_mut().ok_or(GoopError::NoFallingBlob)?;
        piece.offsets = offsets.to_vec();
        let origin = piece.origin_px(self.config.cell_size, self.config.origin);
        let id = piece.id.clone();
        let old = self.scene.remove(&id).ok_or_else(|| GoopError::UnknownBlob(id.clone()))?;
        let mut blob = self.build_blob(id, old.color, offsets, origin, true);
        blob.transfer_state_from(&old.vertices, self.config.cell_size);
        self.scene.insert(blob);
        Ok(())
    }

    /// Lock the falling blob into goop group `group_id` whose final cells
    /// (after any merge, in tank columns) are `cells`. The home shape is
    /// rebuilt; vertices keep
    /// their current positions and settle into it. A locked blob already
    /// holding this group contributes its state too.
    pub fn promote_to_locked(
        &mut self,
        falling_id: &BlobId,
        group_id: &str,
        cells: &[GridCell],
    ) -> Result<BlobId, GoopError> {
        let piece = self.falling.as_ref().ok_or(GoopError::NoFallingBlob)?;
        if &piece.id != falling_id {
            return Err(GoopError::StaleFallingId {
                expected: piece.id.clone(),
                got: falling_id.clone(),
            });
        }
        let mut old = self
            .scene
            .remove(falling_id)
            .ok_or_else(|| GoopError::UnknownBlob(falling_id.clone()))?;
        self.falling = None;
        old.is_falling = false;

        let id = BlobId::locked(group_id);
        let mut sources = std::mem::take(&mut old.vertices);
        if let Some(existing) = self.scene.remove(&id) {
            sources.extend(existing.vertices);
        }
        let mut blob = self.build_blob(id.clone(), old.color, cells, self.config.origin, false);
        blob.transfer_state_from(&sources, self.config.cell_size);
        log::info!("promoted {} to {} ({} cells)", falling_id, id, cells.len());
        self.scene.insert(blob);
        Ok(id)
    }

    /// Create (or replace) a locked blob for goop that entered the grid
    /// without a falling phase.
    pub fn spawn_locked(&mut self, group_id: &str, cells: &[GridCell], color: GoopColor) -> BlobId {
        let id = BlobId::locked(group_id);
        let mut blob = self.build_blob(id.clone(), color, cells, self.config.origin, false);
        if let Some(old) = self.scene.remove(&id) {
            blob.transfer_state_from(&old.vertices, self.config.cell_size);
        }
        log::debug!("spawned locked {} ({} cells)", id, cells.len());
        self.scene.insert(blob);
        id
    }

    /// Rebuild a locked blob after its cell set changed (partial pop, merge).
    pub fn rebuild_locked(&mut self, id: &BlobId, cells: &[GridCell]) -> Result<(), GoopError> {
        let old = self
            .scene
            .get(id)
            .filter(|b| !b.is_falling)
            .ok_or_else(|| GoopError::UnknownBlob(id.clone()))?;
        let mut blob = self.build_blob(id.clone(), old.color, cells, self.config.origin, false);
        blob.transfer_state_from(&old.vertices, self.config.cell_size);
        self.scene.insert(blob);
        Ok(())
    }

    /// Pin the vertices of blob `id` that sit on corners of `fixed` cells.
    /// Returns the number of anchored vertices.
    pub fn anchor_blob(&mut self, id: &BlobId, fixed: &[GridCell]) -> Result<usize, GoopError> {
        let blob = self
            .scene
            .get_mut(id)
            .ok_or_else(|| GoopError::UnknownBlob(id.clone()))?;
        Ok(blob.anchor_to_cells(fixed, self.config.cell_size, self.config.origin))
    }

    /// Discard a blob. Returns it so the caller can still read its last shape.
    pub fn remove(&mut self, id: &BlobId) -> Option<SoftBlob> {
        if self.falling.as_ref().is_some_and(|p| &p.id == id) {
            self.falling = None;
        }
        let removed = self.scene.remove(id);
        if removed.is_some() {
            log::debug!("removed {}", id);
        }
        removed
    }

    /// Remove a blob and throw droplets off its last shape.
    pub fn pop(&mut self, id: &BlobId) -> bool {
        let Some(blob) = self.remove(id) else {
            return false;
        };
        self.effects.burst(&blob, &self.params.visual);
        true
    }

    // -- Frame --

    /// Advance one frame. The falling piece's home target moves once for the
    /// whole frame; physics runs in sub-steps per the step policy. Contact is
    /// settled after physics, against where the blob actually is.
    pub fn step(&mut self, dt: f32, ctx: &StepContext<'_>) {
        let plan = self.config.step.plan(dt);
        if plan.count == 0 {
            return;
        }
        let frame_dt = plan.total();
        let cell_size = self.config.cell_size;
        self.tank_rotation = ctx.tank_rotation;

        if let Some(piece) = self.falling.as_mut() {
            let dx = piece.follow_rotation(ctx.tank_rotation, self.config.cols, cell_size);
            let dy = piece.advance(ctx, frame_dt, cell_size);
            if let Some(blob) = self.scene.get_mut(&piece.id) {
                if dx != 0.0 {
                    blob.translate(Vec2::new(dx, 0.0));
                }
                if dy != 0.0 {
                    blob.translate_home(Vec2::new(0.0, dy));
                }
            }
        }

        for _ in 0..plan.count {
            step_physics(self.scene.as_mut_slice(), &self.params, &self.bounds, plan.dt);
        }

        if let Some(piece) = self.falling.as_mut() {
            let lowest = self.scene.get(&piece.id).and_then(SoftBlob::lowest_y);
            piece.update_contact(lowest, cell_size, self.config.origin);
        }

        self.effects.tick(frame_dt, self.params.falling.gravity);
    }

    // -- Queries --

    pub fn get_blob(&self, id: &BlobId) -> Option<&SoftBlob> {
        self.scene.get(id)
    }

    pub fn blobs(&self) -> impl Iterator<Item = &SoftBlob> {
        self.scene.iter()
    }

    pub fn blob_count(&self) -> usize {
        self.scene.len()
    }

    pub fn falling_id(&self) -> Option<&BlobId> {
        self.falling.as_ref().map(|p| &p.id)
    }

    /// Collision report for the active falling piece.
    pub fn active_piece_state(&self) -> Option<ActivePieceState> {
        self.falling.as_ref().map(FallingPiece::state)
    }

    /// Collision report, only if `id` still names the active piece.
    pub fn piece_state_for(&self, id: &BlobId) -> Option<ActivePieceState> {
        self.falling.as_ref().filter(|p| &p.id == id).map(FallingPiece::state)
    }

    // -- Output --

    pub fn render_blobs(&self) -> Vec<BlobRenderData> {
        self.scene.iter().map(|b| render_data(b, INSET_DISTANCE)).collect()
    }

    pub fn goo_filter(&self) -> GooFilter {
        GooFilter::from_visual(&self.params.visual)
    }

    pub fn tendrils(&self) -> Vec<Tendril> {
        find_tendrils(self.scene.as_slice(), &self.params.visual)
    }

    pub fn droplets(&self) -> &[Droplet] {
        &self.effects.droplets
    }
}

impl Default for GoopEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
