//! Bitmap font loading and glyph lookup
//!
//! Handles:
//! - Codepoint specs (aliases, `U+` escapes, game-scoped glyphs)
//! - Page discovery from `<name> [<tag>] <cols>x<rows>.<ext>` files
//! - Per-page `.ini` settings and codepoint -> frame mapping
//! - Glyph metrics and atlas texture rectangles
//! - Reference-counted font cache with import merging

pub mod cache;
pub mod charmaps;
pub mod codepoint;
pub mod discovery;
pub mod face;
pub mod page;
pub mod page_config;

pub use cache::{FontCache, FontHandle};
pub use codepoint::{extract_game_glyph, make_game_glyph, parse_hex_escape, AliasTable};
pub use face::Font;
pub use page::{FontPage, Glyph, TextureRect};
pub use page_config::{FrameGrid, PageConfig};
