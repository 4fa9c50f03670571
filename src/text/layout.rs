//! Text layout
//!
//! Decodes a byte string, splits it into lines, measures each line through a
//! [`Font`], and positions one quad per glyph according to the alignment.
//! The font is only read; it is passed to every call instead of being held.

use log::debug;

use super::batch::{batch_quads, GlyphQuad, QuadBatch};
use super::utf8;
use crate::constants::{NEWLINE, SPACE};
use crate::font::Font;

/// Horizontal alignment of each line relative to the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment of the whole block relative to the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl HorizAlign {
    fn origin(self, width: i32) -> i32 {
        match self {
            Self::Left => 0,
            Self::Center => -(width / 2),
            Self::Right => -width,
        }
    }
}

impl VertAlign {
    fn origin(self, height: i32) -> i32 {
        match self {
            Self::Top => 0,
            Self::Middle => -(height / 2),
            Self::Bottom => -height,
        }
    }
}

/// One line of decoded text with its metrics in source pixels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub codepoints: Vec<u32>,
    pub width: i32,
    pub height: i32,
}

impl Line {
    fn measure(font: &Font, codepoints: Vec<u32>) -> Self {
        Self {
            width: font.line_width(&codepoints),
            height: font.line_height(&codepoints),
            codepoints,
        }
    }
}

/// Laid-out text block
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    lines: Vec<Line>,
    max_width: i32,
    quads: Vec<GlyphQuad>,
    dropped_units: usize,
}

impl TextLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `text` and split it into measured lines
    ///
    /// Malformed UTF-8 units are dropped. Previously built quads are cleared.
    pub fn set_text(&mut self, font: &Font, text: &[u8]) {
        let mut decoder = utf8::decode(text);
        let codepoints: Vec<u32> = decoder.by_ref().collect();
        self.dropped_units = decoder.dropped();
        if self.dropped_units > 0 {
            debug!("Dropped {} malformed UTF-8 unit(s)", self.dropped_units);
        }

        self.lines = codepoints
            .split(|&cp| cp == NEWLINE)
            .map(|line| Line::measure(font, line.to_vec()))
            .collect();
        self.quads.clear();
        self.update_max_width();
    }

    /// Remove trailing characters from each line until it fits `max_width`
    pub fn crop_to_width(&mut self, font: &Font, max_width: i32) {
        for line in &mut self.lines {
            if line.width <= max_width {
                continue;
            }
            while line.width > max_width && line.codepoints.pop().is_some() {
                line.width = font.line_width(&line.codepoints);
            }
            line.height = font.line_height(&line.codepoints);
        }
        self.quads.clear();
        self.update_max_width();
    }

    /// Re-flow lines at spaces so each fits `max_width` where possible
    ///
    /// A word wider than `max_width` is left alone on its own line. Spaces are
    /// kept, except the one a line break replaces.
    pub fn wrap_to_width(&mut self, font: &Font, max_width: i32) {
        let mut wrapped = Vec::with_capacity(self.lines.len());
        for line in self.lines.drain(..) {
            if line.width <= max_width {
                wrapped.push(line);
                continue;
            }

            let mut current: Vec<u32> = Vec::new();
            for (i, word) in line.codepoints.split(|&cp| cp == SPACE).enumerate() {
                let mut candidate = current.clone();
                if i > 0 {
                    candidate.push(SPACE);
                }
                candidate.extend_from_slice(word);

                if i == 0 || current.is_empty() || font.line_width(&candidate) <= max_width {
                    current = candidate;
                } else {
                    wrapped.push(Line::measure(font, std::mem::take(&mut current)));
                    current = word.to_vec();
                }
            }
            wrapped.push(Line::measure(font, current));
        }
        self.lines = wrapped;
        self.quads.clear();
        self.update_max_width();
    }

    /// Position one quad per drawable glyph
    pub fn build(&mut self, font: &Font, horiz: HorizAlign, vert: VertAlign) -> &[GlyphQuad] {
        self.quads.clear();
        let mut y = vert.origin(self.total_height());

        for line in &self.lines {
            let mut x = horiz.origin(line.width);
            for &cp in &line.codepoints {
                let Some(glyph) = font.glyph(cp) else {
                    continue;
                };
                let width = glyph.draw_width();
                if width > 0 && glyph.height > 0 {
                    self.quads.push(GlyphQuad {
                        texture: glyph.texture,
                        x: x + glyph.left_bearing,
                        y: y + glyph.vertical_shift,
                        width,
                        height: glyph.height,
                        texture_rect: glyph.texture_rect,
                    });
                }
                x += glyph.horizontal_advance;
            }
            y += line.height;
        }
        &self.quads
    }

    /// Quads from the last [`TextLayout::build`], grouped by texture
    pub fn batches(&self, color: [f32; 4]) -> Vec<QuadBatch> {
        batch_quads(&self.quads, color)
    }

    pub fn quads(&self) -> &[GlyphQuad] {
        &self.quads
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Width of the widest line
    pub fn max_width(&self) -> i32 {
        self.max_width
    }

    /// Sum of line heights
    pub fn total_height(&self) -> i32 {
        self.lines.iter().map(|line| line.height).sum()
    }

    /// Malformed UTF-8 units dropped by the last [`TextLayout::set_text`]
    pub fn dropped_units(&self) -> usize {
        self.dropped_units
    }

    fn update_max_width(&mut self) {
        self.max_width = self.lines.iter().map(|line| line.width).max().unwrap_or(0);
    }
}
