//! Text decoding, layout, and quad batching

pub mod batch;
pub mod layout;
pub mod utf8;

pub use batch::{batch_quads, GlyphQuad, QuadBatch, VERTEX_FLOATS, VERTICES_PER_QUAD};
pub use layout::{HorizAlign, Line, TextLayout, VertAlign};
