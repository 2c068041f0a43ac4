use glam::Vec2;

use crate::api::types::{Bounds, GoopColor};
use crate::core::blob::SoftBlob;
use crate::core::params::{PhysicsParams, ProfileParams};
use crate::core::solver;

// ---------------------------------------------------------------------------
// Inter-blob attraction
// ---------------------------------------------------------------------------

/// Pre-step outline of one blob, read by every other blob's attraction pass.
struct Snapshot {
    color: GoopColor,
    points: Vec<Vec2>,
    bounds: Option<Bounds>,
}

fn snapshot(blobs: &[SoftBlob]) -> Vec<Snapshot> {
    blobs
        .iter()
        .map(|b| {
            let points = b.positions();
            Snapshot {
                color: b.color,
                bounds: Bounds::from_points(&points),
                points,
            }
        })
        .collect()
}

/// Average pull of `p` toward the vertices of `other` within `radius`.
/// Returns the summed force and the number of contributing vertices.
fn pull_toward(p: Vec2, other: &Snapshot, profile: &ProfileParams) -> (Vec2, u32) {
    let radius = profile.attraction_radius;
    let Some(bounds) = other.bounds else {
        return (Vec2::ZERO, 0);
    };
    if !bounds.expand(radius).contains(p) {
        return (Vec2::ZERO, 0);
    }
    let mut force = Vec2::ZERO;
    let mut count = 0;
    for &q in &other.points {
        let delta = q - p;
        let d = delta.length();
        if d > radius || d < 1e-6 {
            continue;
        }
        force += delta / d * (d - profile.attraction_rest_length) * profile.attraction_stiffness;
        count += 1;
    }
    (force, count)
}

/// Accumulate attraction between distinct blobs of the same color into each
/// vertex's acceleration. All blobs read the same pre-step snapshot, so the
/// result does not depend on iteration order.
pub fn apply_attraction(blobs: &mut [SoftBlob], params: &PhysicsParams) {
    if blobs.len() < 2 {
        return;
    }
    let snaps = snapshot(blobs);
    for (i, blob) in blobs.iter_mut().enumerate() {
        let profile = params.profile(blob.is_falling);
        if profile.attraction_radius <= 0.0 || profile.attraction_stiffness == 0.0 {
            continue;
        }
        let partners: Vec<&Snapshot> = snaps
            .iter()
            .enumerate()
            .filter(|(j, s)| *j != i && s.color == blob.color)
            .map(|(_, s)| s)
            .collect();
        if partners.is_empty() {
            continue;
        }
        for v in blob.vertices.iter_mut().filter(|v| !v.is_anchor) {
            let mut force = Vec2::ZERO;
            let mut count = 0;
            for other in &partners {
                let (f, n) = pull_toward(v.pos, other, profile);
                force += f;
                count += n;
            }
            if count > 0 {
                v.acceleration += force / count as f32;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// One physics sub-step over every managed blob: attraction from the pre-step
/// snapshot, the per-blob pipeline with the blob's profile, then centroids.
/// Returns the total number of vertices restored from non-finite state.
pub fn step_physics(blobs: &mut [SoftBlob], params: &PhysicsParams, tank: &Bounds, dt: f32) -> usize {
    let walls = tank.inset(params.visual.wall_thickness);
    apply_attraction(blobs, params);
    let mut restored = 0;
    for blob in blobs.iter_mut() {
        restored += solver::step_blob(blob, params.profile(blob.is_falling), &walls, dt);
    }
    for blob in blobs.iter_mut() {
        blob.update_centroid();
    }
    restored
}
