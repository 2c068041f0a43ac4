//! Lyon tessellation of goo outlines into a flat triangle buffer.
//!
//! An alternative to the SVG path strings for hosts that draw with a GPU:
//! the same smoothed outline is built as a lyon path and filled.
//!
//! ```ignore
//! let mut mesh = GooMesh::new();
//! for blob in engine.blobs() {
//!     mesh.fill_blob(&blob.positions(), blob.color, 1.0);
//! }
//! for t in engine.tendrils() {
//!     mesh.stroke_tendril(&t);
//! }
//! upload(mesh.as_bytes());
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor, LineCap,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::api::types::GoopColor;
use crate::systems::effects::Droplet;
use crate::systems::tendrils::Tendril;

/// Per-vertex data for goo geometry.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GooVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GooVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

fn rgba(color: GoopColor, alpha: f32) -> [f32; 4] {
    let [r, g, b] = color.to_rgb_f32();
    [r, g, b, alpha.clamp(0.0, 1.0)]
}

struct FillCtor([f32; 4]);

impl FillVertexConstructor<GooVertex> for FillCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> GooVertex {
        let [r, g, b, a] = self.0;
        GooVertex { x: vertex.position().x, y: vertex.position().y, r, g, b, a }
    }
}

struct StrokeCtor([f32; 4]);

impl StrokeVertexConstructor<GooVertex> for StrokeCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> GooVertex {
        let [r, g, b, a] = self.0;
        GooVertex { x: vertex.position().x, y: vertex.position().y, r, g, b, a }
    }
}

/// The smoothed outline as a lyon path: quadratic segments through each
/// vertex between edge midpoints. `None` below three points.
pub fn smooth_outline(points: &[Vec2]) -> Option<Path> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let mid = |a: Vec2, b: Vec2| (a + b) * 0.5;
    let start = mid(points[n - 1], points[0]);
    let mut builder = Path::builder();
    builder.begin(point(start.x, start.y));
    for i in 0..n {
        let ctrl = points[i];
        let to = mid(points[i], points[(i + 1) % n]);
        builder.quadratic_bezier_to(point(ctrl.x, ctrl.y), point(to.x, to.y));
    }
    builder.close();
    Some(builder.build())
}

/// Tessellators plus the output buffer. Cleared each frame.
pub struct GooMesh {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<GooVertex, u32>,
    vertices: Vec<GooVertex>,
}

impl GooMesh {
    pub fn new() -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            vertices: Vec::with_capacity(4096),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[GooVertex] {
        &self.vertices
    }

    /// Triangle list as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Expand indexed geometry into the triangle list.
    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            self.vertices.push(self.geometry.vertices[*idx as usize]);
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    /// Fill the smoothed outline of a blob.
    pub fn fill_blob(&mut self, points: &[Vec2], color: GoopColor, alpha: f32) {
        let Some(path) = smooth_outline(points) else { return };
        let result = self.fill_tess.tessellate_path(
            &path,
            &FillOptions::tolerance(0.5),
            &mut BuffersBuilder::new(&mut self.geometry, FillCtor(rgba(color, alpha))),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                log::debug!("goo fill failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    /// Round-capped stroke for one tendril.
    pub fn stroke_tendril(&mut self, tendril: &Tendril) {
        if tendril.width <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.begin(point(tendril.from.x, tendril.from.y));
        builder.line_to(point(tendril.to.x, tendril.to.y));
        builder.end(false);
        let path = builder.build();
        let result = self.stroke_tess.tessellate_path(
            &path,
            &StrokeOptions::tolerance(0.5)
                .with_line_width(tendril.width)
                .with_line_cap(LineCap::Round),
            &mut BuffersBuilder::new(&mut self.geometry, StrokeCtor(rgba(tendril.color, 1.0))),
        );
        if result.is_ok() {
            self.flush_geometry();
        }
    }

    /// Filled circle per live droplet, faded by remaining lifetime.
    pub fn fill_droplets(&mut self, droplets: &[Droplet]) {
        for d in droplets {
            let radius = d.current_radius();
            if radius <= 0.0 {
                continue;
            }
            let mut builder = Path::builder();
            builder.add_circle(point(d.position.x, d.position.y), radius, lyon::path::Winding::Positive);
            let path = builder.build();
            let result = self.fill_tess.tessellate_path(
                &path,
                &FillOptions::tolerance(0.5),
                &mut BuffersBuilder::new(&mut self.geometry, FillCtor(rgba(d.color, d.alpha()))),
            );
            if result.is_ok() {
                self.flush_geometry();
            }
        }
    }
}

impl Default for GooMesh {
    fn default() -> Self {
        Self::new()
    }
}
