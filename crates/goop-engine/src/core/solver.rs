//! Per-blob integrator and constraint solver.
//!
//! [`step_blob`] runs the fixed pipeline: integrate, home force, spring
//! relaxation, pressure, walls. Home pull comes before relaxation so the
//! springs absorb it; pressure comes after so it restores area the
//! relaxation lost.

use glam::Vec2;

use crate::api::types::Bounds;
use crate::core::blob::{SoftBlob, SpringKind};
use crate::core::params::ProfileParams;
use crate::core::vector;

/// Verlet update. Consumes each vertex's accumulated acceleration plus gravity.
pub fn integrate(blob: &mut SoftBlob, profile: &ProfileParams, dt: f32) {
    let gravity = Vec2::new(0.0, profile.gravity);
    let dt2 = dt * dt;
    for v in &mut blob.vertices {
        if v.is_anchor {
            v.pos = v.home;
            v.prev_pos = v.home;
            v.acceleration = Vec2::ZERO;
            continue;
        }
        let velocity = (v.pos - v.prev_pos) * profile.damping;
        let next = v.pos + velocity + (v.acceleration + gravity) * dt2;
        v.prev_pos = v.pos;
        v.pos = next;
        v.acceleration = Vec2::ZERO;
    }
}

/// Pull each vertex toward its home along its home spring.
///
/// `home_stiffness` sets the fraction of displacement erased per tick;
/// `return_speed` caps the pull to that many px/s. The pull is a positional
/// correction: `prev_pos` moves with `pos`, so it adds no velocity and a
/// displaced blob settles without overshooting its home.
pub fn apply_home_force(blob: &mut SoftBlob, profile: &ProfileParams, dt: f32) {
    let max_step = if profile.return_speed > 0.0 {
        profile.return_speed * dt
    } else {
        f32::INFINITY
    };
    for spring in blob.springs.iter().filter(|s| s.kind == SpringKind::Home) {
        let v = &mut blob.vertices[spring.a];
        if v.is_anchor {
            continue;
        }
        let mut pull = (v.home - v.pos) * (profile.home_stiffness * spring.stiffness);
        let len = pull.length();
        if len > max_step {
            pull *= max_step / len;
        }
        v.pos += pull;
        v.prev_pos += pull;
    }
}

/// Iterative distance-constraint relaxation over structural springs.
pub fn solve_constraints(blob: &mut SoftBlob, profile: &ProfileParams) {
    let damping = 1.0 / (1.0 + profile.viscosity.max(0.0));
    for _ in 0..profile.iterations {
        for spring in &blob.springs {
            if spring.kind != SpringKind::Structural {
                continue;
            }
            let a = blob.vertices[spring.a];
            let b = blob.vertices[spring.b];
            if a.is_anchor && b.is_anchor {
                continue;
            }
            let delta = b.pos - a.pos;
            let dist = delta.length();
            if dist < 1e-6 {
                continue;
            }
            let error = dist - spring.rest_length;
            let k = profile.stiffness * spring.stiffness * damping;
            let correction = delta * (error / dist * k);

            match (a.is_anchor, b.is_anchor) {
                (false, false) => {
                    blob.vertices[spring.a].pos += correction * 0.5;
                    blob.vertices[spring.b].pos -= correction * 0.5;
                }
                (true, false) => blob.vertices[spring.b].pos -= correction,
                (false, true) => blob.vertices[spring.a].pos += correction,
                (true, true) => {}
            }
        }
    }
}

/// Push vertices outward along their normals when the blob has lost area.
///
/// The push is `pressure * deficit / perimeter`: moving every vertex out by
/// `d` grows the area by roughly `perimeter * d`, so `pressure` is the
/// fraction of the deficit recovered in one pass.
pub fn apply_pressure(blob: &mut SoftBlob, profile: &ProfileParams) {
    if profile.pressure <= 0.0 {
        return;
    }
    let positions = blob.positions();
    let area = vector::signed_area(&positions).max(0.0);
    let deficit = blob.target_area - area;
    if deficit <= 0.0 {
        return;
    }
    let perimeter = vector::perimeter(&positions);
    if perimeter < 1e-6 {
        return;
    }
    let push = profile.pressure * deficit / perimeter;
    for (i, v) in blob.vertices.iter_mut().enumerate() {
        if v.is_anchor {
            continue;
        }
        v.pos += vector::vertex_normal(&positions, i) * push;
    }
}

/// Clamp every vertex into `bounds`. A clamped vertex loses the velocity
/// component pointing out through the wall.
pub fn apply_boundary_constraints(blob: &mut SoftBlob, bounds: &Bounds) {
    for v in &mut blob.vertices {
        if v.pos.x < bounds.min.x {
            let vel = v.pos.x - v.prev_pos.x;
            v.pos.x = bounds.min.x;
            v.prev_pos.x = v.pos.x - vel.max(0.0);
        } else if v.pos.x > bounds.max.x {
            let vel = v.pos.x - v.prev_pos.x;
            v.pos.x = bounds.max.x;
            v.prev_pos.x = v.pos.x - vel.min(0.0);
        }
        if v.pos.y < bounds.min.y {
            let vel = v.pos.y - v.prev_pos.y;
            v.pos.y = bounds.min.y;
            v.prev_pos.y = v.pos.y - vel.max(0.0);
        } else if v.pos.y > bounds.max.y {
            let vel = v.pos.y - v.prev_pos.y;
            v.pos.y = bounds.max.y;
            v.prev_pos.y = v.pos.y - vel.min(0.0);
        }
    }
}

/// Run the full pipeline on one blob. `walls` is already inset by the wall
/// thickness. Any vertex left non-finite is restored to its position from
/// before the step with zero velocity. Returns the number of restored vertices.
pub fn step_blob(blob: &mut SoftBlob, profile: &ProfileParams, walls: &Bounds, dt: f32) -> usize {
    let known_good = blob.positions();

    integrate(blob, profile, dt);
    apply_home_force(blob, profile, dt);
    solve_constraints(blob, profile);
    apply_pressure(blob, profile);
    apply_boundary_constraints(blob, walls);

    let mut restored = 0;
    for (v, good) in blob.vertices.iter_mut().zip(known_good) {
        if !v.pos.is_finite() || !v.prev_pos.is_finite() {
            v.pos = good;
            v.prev_pos = good;
            v.acceleration = Vec2::ZERO;
            restored += 1;
        }
    }
    if restored > 0 {
        log::warn!("blob {}: restored {} non-finite vertices", blob.id, restored);
    }
    restored
}
