//! Thin bridges drawn between same-color locked blobs that nearly touch.

use glam::Vec2;

use crate::api::types::{Bounds, GoopColor};
use crate::core::blob::SoftBlob;
use crate::core::params::VisualParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tendril {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub color: GoopColor,
}

/// Width of a tendril spanning `gap` px. Full width at contact, zero at the
/// radius; skinniness 1 draws nothing.
pub fn tendril_width(gap: f32, visual: &VisualParams) -> f32 {
    let radius = visual.tendril_radius;
    if radius <= 0.0 || gap >= radius {
        return 0.0;
    }
    let closeness = 1.0 - gap / radius;
    let skinny = visual.tendril_skinniness.clamp(0.0, 1.0);
    radius * 0.5 * closeness * (1.0 - skinny)
}

/// For every vertex of a locked blob, a bridge to the nearest vertex of each
/// other same-color locked blob within `tendril_radius`.
pub fn find_tendrils(blobs: &[SoftBlob], visual: &VisualParams) -> Vec<Tendril> {
    let mut out = Vec::new();
    let radius = visual.tendril_radius;
    if radius <= 0.0 {
        return out;
    }
    let locked: Vec<(&SoftBlob, Vec<Vec2>, Option<Bounds>)> = blobs
        .iter()
        .filter(|b| b.is_locked)
        .map(|b| {
            let pts = b.positions();
            let bounds = Bounds::from_points(&pts).map(|bb| bb.expand(radius));
            (b, pts, bounds)
        })
        .collect();

    for (i, (a, a_pts, a_bounds)) in locked.iter().enumerate() {
        for (b, b_pts, b_bounds) in locked.iter().skip(i + 1) {
            if a.color != b.color {
                continue;
            }
            let (Some(ab), Some(bb)) = (a_bounds, b_bounds) else { continue };
            if ab.max.x < bb.min.x || bb.max.x < ab.min.x || ab.max.y < bb.min.y || bb.max.y < ab.min.y {
                continue;
            }
            for &p in a_pts {
                let nearest = b_pts
                    .iter()
                    .map(|&q| (q, p.distance(q)))
                    .min_by(|x, y| x.1.total_cmp(&y.1));
                let Some((q, gap)) = nearest else { continue };
                let width = tendril_width(gap, visual);
                if width > 0.01 {
                    out.push(Tendril { from: p, to: q, width, color: a.color });
                }
            }
        }
    }
    out
}
