//! Global constants for bitfont
//!
//! Consolidates codepoint, page naming, and texture geometry constants
//! to eliminate magic numbers throughout the codebase.

// ============================================================================
// Codepoints
// ============================================================================

/// Line separator used when splitting decoded text
pub const NEWLINE: u32 = 0x0A;

/// Space
pub const SPACE: u32 = 0x20;

/// No-break space (shares the space frame when only one is mapped)
pub const NBSP: u32 = 0xA0;

/// Glyph used for codepoints a font does not map (private use area)
pub const DEFAULT_GLYPH: u32 = 0xF8FF;

/// First codepoint handed out to internal aliases (button glyphs etc.)
pub const INTERNAL_ALIAS_START: u32 = 0xE000;

/// Largest codepoint a game-scoped glyph can carry (low 24 bits)
pub const MAX_GAME_CODEPOINT: u32 = 0x00FF_FFFF;

/// Largest game id a game-scoped glyph can carry (the tag byte stores id + 1)
pub const MAX_GAME_ID: u8 = 254;

/// Bit offset of the game tag inside a game-scoped glyph
pub const GAME_TAG_SHIFT: u32 = 24;

// ============================================================================
// Font Files
// ============================================================================

/// Page tag used when a page filename has no `[tag]`
pub const DEFAULT_PAGE_TAG: &str = "main";

/// Section read before every page section
pub const COMMON_SECTION: &str = "common";

/// Largest frame grid a page texture may declare
pub const MAX_PAGE_FRAMES: usize = 0x1_0000;

/// Frame counts that get an identity (ASCII / Latin-1) mapping when a page
/// has no explicit mapping
pub const IDENTITY_FRAME_COUNTS: [usize; 2] = [128, 256];
