//! Outline paths for the renderer.
//!
//! The smoothed outline runs a quadratic curve through each vertex, starting
//! and ending on edge midpoints, so the polygon never shows facets. Paths are
//! SVG path-data strings with three decimals.

use std::fmt::Write as _;

use glam::Vec2;

use crate::api::types::{BlobId, Bounds, GoopColor};
use crate::core::blob::SoftBlob;
use crate::core::vector;

/// Distance the secondary outline sits inside the main one, in px.
pub const INSET_DISTANCE: f32 = 3.0;

/// Everything the renderer needs to draw one blob this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobRenderData {
    pub id: BlobId,
    pub color: GoopColor,
    pub path: String,
    pub inset_path: String,
    pub bounds: Bounds,
    pub is_falling: bool,
}

fn push_point(out: &mut String, p: Vec2) {
    // Normalise -0.0 so equal shapes produce equal strings.
    let x = if p.x == 0.0 { 0.0 } else { p.x };
    let y = if p.y == 0.0 { 0.0 } else { p.y };
    let _ = write!(out, "{:.3},{:.3}", x, y);
}

/// Closed smoothed outline through `points`. Fewer than three points yield
/// a straight polygon (or an empty string when there are none).
pub fn smooth_path(points: &[Vec2]) -> String {
    let n = points.len();
    let mut out = String::with_capacity(n * 32);
    if n == 0 {
        return out;
    }
    if n < 3 {
        out.push('M');
        push_point(&mut out, points[0]);
        for p in &points[1..] {
            out.push_str(" L");
            push_point(&mut out, *p);
        }
        out.push_str(" Z");
        return out;
    }
    let mid = |a: Vec2, b: Vec2| (a + b) * 0.5;
    out.push('M');
    push_point(&mut out, mid(points[n - 1], points[0]));
    for i in 0..n {
        out.push_str(" Q");
        push_point(&mut out, points[i]);
        out.push(' ');
        push_point(&mut out, mid(points[i], points[(i + 1) % n]));
    }
    out.push_str(" Z");
    out
}

/// Move every vertex `amount` px along its inward normal.
pub fn inset_points(points: &[Vec2], amount: f32) -> Vec<Vec2> {
    (0..points.len())
        .map(|i| points[i] - vector::vertex_normal(points, i) * amount)
        .collect()
}

/// Render snapshot of one blob.
pub fn render_data(blob: &SoftBlob, inset: f32) -> BlobRenderData {
    let points = blob.positions();
    let bounds = Bounds::from_points(&points).unwrap_or_default();
    BlobRenderData {
        id: blob.id.clone(),
        color: blob.color,
        path: smooth_path(&points),
        inset_path: smooth_path(&inset_points(&points, inset)),
        bounds,
        is_falling: blob.is_falling,
    }
}
