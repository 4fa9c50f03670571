//! Font page: one texture atlas and the glyph metrics built from it

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::page_config::{FrameGrid, PageConfig};
use crate::assets::{TextureId, TextureInfo};

/// Normalized rectangle into a page's atlas (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Metrics and texture coordinates for one frame, in source pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Atlas the glyph is drawn from
    pub texture: TextureId,
    /// Visible image width
    pub width: i32,
    /// Frame height
    pub height: i32,
    /// Offset from the pen to the quad's left edge (negative when extra
    /// pixels are drawn left of the visible image)
    pub left_bearing: i32,
    /// Extra pixels drawn right of the visible image
    pub right_bearing: i32,
    /// Pen advance to the next character
    pub horizontal_advance: i32,
    /// Offset from the line top to the quad's top edge
    pub vertical_shift: i32,
    pub texture_rect: TextureRect,
}

impl Glyph {
    /// Width of the drawn quad (visible width plus extra pixels)
    pub fn draw_width(&self) -> i32 {
        self.width - self.left_bearing + self.right_bearing
    }
}

/// One atlas page of a font
#[derive(Debug, Clone)]
pub struct FontPage {
    tag: String,
    texture: TextureId,
    texture_path: PathBuf,
    grid: FrameGrid,
    line_spacing: i32,
    glyphs: Vec<Glyph>,
    char_to_frame: HashMap<u32, usize>,
    config: PageConfig,
}

impl FontPage {
    /// Build glyph metrics for every frame of `texture` using `config`
    pub fn build(tag: &str, texture: &TextureInfo, texture_path: &Path, config: PageConfig) -> Self {
        let grid = FrameGrid {
            columns: texture.frames_wide as usize,
            rows: texture.frames_high as usize,
        };
        let frame_w = texture.frame_width() as i32;
        let frame_h = texture.frame_height() as i32;
        let line_spacing = config.line_spacing.unwrap_or(frame_h);
        let vertical_shift = (line_spacing - frame_h) / 2;
        let tex_w = texture.source_width.max(1) as f32;
        let tex_h = texture.source_height.max(1) as f32;

        let glyphs = (0..grid.count())
            .map(|frame| {
                let base = config
                    .width_overrides
                    .get(&frame)
                    .copied()
                    .unwrap_or(texture.measured_width(frame) as i32);
                let scaled = ((base + config.add_to_all_widths) as f32
                    * config.scale_all_widths_by)
                    .round() as i32;
                let advance = scaled.max(0);

                // Visible image is centered in the frame; an odd chop leaves
                // one more visible pixel rather than a half-pixel offset
                let mut width = advance;
                let mut chop = (frame_w - width).max(0);
                if chop % 2 != 0 {
                    chop -= 1;
                    width += 1;
                }
                let pad = chop / 2;

                let (extra_left, extra_right) = if width > 0 {
                    (
                        config.draw_extra_pixels_left.clamp(0, pad),
                        config.draw_extra_pixels_right.clamp(0, pad),
                    )
                } else {
                    (0, 0)
                };

                let col = (frame % grid.columns.max(1)) as i32;
                let row = (frame / grid.columns.max(1)) as i32;
                let frame_left = col * frame_w;
                let frame_top = row * frame_h;
                let left = frame_left + pad - extra_left;
                let right = frame_left + frame_w - pad + extra_right;

                Glyph {
                    texture: texture.id,
                    width,
                    height: frame_h,
                    left_bearing: -extra_left,
                    right_bearing: extra_right,
                    horizontal_advance: advance,
                    vertical_shift,
                    texture_rect: TextureRect {
                        left: left as f32 / tex_w,
                        top: frame_top as f32 / tex_h,
                        right: right as f32 / tex_w,
                        bottom: (frame_top + frame_h) as f32 / tex_h,
                    },
                }
            })
            .collect();

        let mut char_to_frame = HashMap::with_capacity(config.mappings.len());
        for &(cp, frame) in &config.mappings {
            if frame < grid.count() {
                char_to_frame.insert(cp, frame);
            }
        }

        debug!(
            "Page '{}': {}x{} frames ({}x{} px), {} codepoints, line spacing {}",
            tag,
            grid.columns,
            grid.rows,
            frame_w,
            frame_h,
            char_to_frame.len(),
            line_spacing
        );

        Self {
            tag: tag.to_string(),
            texture: texture.id,
            texture_path: texture_path.to_path_buf(),
            grid,
            line_spacing,
            glyphs,
            char_to_frame,
            config,
        }
    }

    /// Glyph of `frame`
    ///
    /// # Panics
    /// If `frame` is out of range; frames only come from the page's mapping.
    pub fn glyph(&self, frame: usize) -> &Glyph {
        &self.glyphs[frame]
    }

    pub fn frame_for(&self, codepoint: u32) -> Option<usize> {
        self.char_to_frame.get(&codepoint).copied()
    }

    pub fn glyph_for(&self, codepoint: u32) -> Option<&Glyph> {
        self.frame_for(codepoint).map(|frame| self.glyph(frame))
    }

    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.char_to_frame.keys().copied()
    }

    pub fn mapped_count(&self) -> usize {
        self.char_to_frame.len()
    }

    pub fn frame_count(&self) -> usize {
        self.grid.count()
    }

    pub fn grid(&self) -> FrameGrid {
        self.grid
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn texture_path(&self) -> &Path {
        &self.texture_path
    }

    pub fn line_spacing(&self) -> i32 {
        self.line_spacing
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }
}
