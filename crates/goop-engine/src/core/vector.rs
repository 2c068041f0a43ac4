// core/vector.rs
//
// 2-D vector primitives used across topology, solver, and output.
// Pure functions over glam::Vec2, no state.

use glam::Vec2;

#[inline]
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

#[inline]
pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

#[inline]
pub fn scale(v: Vec2, s: f32) -> Vec2 {
    v * s
}

#[inline]
pub fn length(v: Vec2) -> f32 {
    v.length()
}

/// Unit vector in the direction of `v`. Zero-length (or non-finite) input
/// yields `Vec2::ZERO` instead of NaN.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 1e-10 && len.is_finite() {
        v / len
    } else {
        Vec2::ZERO
    }
}

#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.dot(b)
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Rotate `point` about `center` by `angle` radians.
pub fn rotate_point(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let rel = point - center;
    center + Vec2::new(rel.x * cos - rel.y * sin, rel.x * sin + rel.y * cos)
}

/// Shoelace signed area. Positive means counter-clockwise in a y-up frame,
/// which is the winding every blob is normalised to.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Average of the points (vertex centroid, not area centroid).
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
    sum / points.len() as f32
}

pub fn perimeter(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| distance(points[i], points[(i + 1) % n])).sum()
}

/// Outward unit normal at vertex `i` of a positively wound loop: the
/// normalised sum of the two adjacent edge normals.
pub fn vertex_normal(points: &[Vec2], i: usize) -> Vec2 {
    let n = points.len();
    if n < 3 {
        return Vec2::ZERO;
    }
    let prev = points[(i + n - 1) % n];
    let cur = points[i];
    let next = points[(i + 1) % n];
    let e0 = cur - prev;
    let e1 = next - cur;
    // For positive winding the outward normal of edge e is (e.y, -e.x).
    let n0 = normalize(Vec2::new(e0.y, -e0.x));
    let n1 = normalize(Vec2::new(e1.y, -e1.x));
    normalize(n0 + n1)
}
