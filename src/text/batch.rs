//! Glyph quads and texture batches
//!
//! A batch is a run of consecutive quads drawn from the same atlas, ready for
//! a single draw call in the host renderer.

use crate::assets::TextureId;
use crate::font::TextureRect;

/// Per-vertex data: position(2) + UV(2) + color(4) = 8 floats
pub const VERTEX_FLOATS: usize = 8;
/// 1 quad = 4 vertices
pub const VERTICES_PER_QUAD: usize = 4;

/// One positioned glyph rectangle, in source pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub texture: TextureId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub texture_rect: TextureRect,
}

impl GlyphQuad {
    /// Append the quad's 4 vertices with `color`
    pub fn push_vertices(&self, color: [f32; 4], out: &mut Vec<f32>) {
        let x0 = self.x as f32;
        let y0 = self.y as f32;
        let x1 = (self.x + self.width) as f32;
        let y1 = (self.y + self.height) as f32;
        let TextureRect {
            left: u0,
            top: v0,
            right: u1,
            bottom: v1,
        } = self.texture_rect;
        let [r, g, b, a] = color;

        // 4 vertices: top-left, top-right, bottom-right, bottom-left
        out.extend_from_slice(&[x0, y0, u0, v0, r, g, b, a]);
        out.extend_from_slice(&[x1, y0, u1, v0, r, g, b, a]);
        out.extend_from_slice(&[x1, y1, u1, v1, r, g, b, a]);
        out.extend_from_slice(&[x0, y1, u0, v1, r, g, b, a]);
    }
}

/// Consecutive quads sharing one texture
#[derive(Debug, Clone, PartialEq)]
pub struct QuadBatch {
    pub texture: TextureId,
    /// `quad_count * VERTICES_PER_QUAD * VERTEX_FLOATS` floats
    pub vertices: Vec<f32>,
    pub quad_count: usize,
}

/// Group `quads` into per-texture runs, preserving order
pub fn batch_quads(quads: &[GlyphQuad], color: [f32; 4]) -> Vec<QuadBatch> {
    let mut batches: Vec<QuadBatch> = Vec::new();
    for quad in quads {
        match batches.last_mut() {
            Some(batch) if batch.texture == quad.texture => {
                quad.push_vertices(color, &mut batch.vertices);
                batch.quad_count += 1;
            }
            _ => {
                let mut vertices = Vec::with_capacity(VERTICES_PER_QUAD * VERTEX_FLOATS);
                quad.push_vertices(color, &mut vertices);
                batches.push(QuadBatch {
                    texture: quad.texture,
                    vertices,
                    quad_count: 1,
                });
            }
        }
    }
    batches
}
