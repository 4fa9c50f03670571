//! Codepoint resolution
//!
//! Resolves the codepoint specs used by font settings files:
//! - `U+<hex>` escapes
//! - symbolic aliases (`nbsp`, `uparrow`, `start`, ...)
//! - game-scoped aliases (`<game> <alias>`), tagged in the top byte
//!
//! The alias table is an explicit value owned by the font cache rather than
//! a process-wide singleton. It is built once and read-only afterwards.

use log::debug;
use std::collections::HashMap;

use crate::constants::{
    DEFAULT_GLYPH, GAME_TAG_SHIFT, INTERNAL_ALIAS_START, MAX_GAME_CODEPOINT, MAX_GAME_ID,
};
use crate::error::ConfigError;
use crate::text::utf8;

/// Alias target: a fixed codepoint, or the next private-use codepoint
#[derive(Clone, Copy)]
enum Alias {
    Char(u32),
    Internal,
}

/// Built-in alias names. `Internal` entries receive consecutive codepoints
/// from `INTERNAL_ALIAS_START` in table order.
const ALIASES: &[(&str, Alias)] = &[
    ("default", Alias::Char(DEFAULT_GLYPH)),
    ("invalid", Alias::Char(0xFFFD)),
    // Typography
    ("nbsp", Alias::Char(0x00A0)),
    ("oq", Alias::Char(0x201C)),
    ("cq", Alias::Char(0x201D)),
    ("squared", Alias::Char(0x00B2)),
    ("cubed", Alias::Char(0x00B3)),
    ("delta", Alias::Char(0x0394)),
    ("sigma", Alias::Char(0x03A3)),
    ("omega", Alias::Char(0x03A9)),
    ("angle", Alias::Char(0x2220)),
    ("flipped-a", Alias::Char(0x2200)),
    // Symbols
    ("whiteheart", Alias::Char(0x2661)),
    ("blackstar", Alias::Char(0x2605)),
    ("whitestar", Alias::Char(0x2606)),
    ("leftarrow", Alias::Char(0x2190)),
    ("uparrow", Alias::Char(0x2191)),
    ("rightarrow", Alias::Char(0x2192)),
    ("downarrow", Alias::Char(0x2193)),
    ("4thnote", Alias::Char(0x2669)),
    ("8thnote", Alias::Char(0x266A)),
    ("b8thnote", Alias::Char(0x266B)),
    ("b16thnote", Alias::Char(0x266C)),
    ("flat", Alias::Char(0x266D)),
    ("natural", Alias::Char(0x266E)),
    ("sharp", Alias::Char(0x266F)),
    // Kana used by song titles
    ("ha", Alias::Char(0x3042)),
    ("hi", Alias::Char(0x3044)),
    ("hu", Alias::Char(0x3046)),
    ("he", Alias::Char(0x3048)),
    ("ho", Alias::Char(0x304A)),
    ("hn", Alias::Char(0x3093)),
    ("ka", Alias::Char(0x30A2)),
    ("ki", Alias::Char(0x30A4)),
    ("ku", Alias::Char(0x30A6)),
    ("ke", Alias::Char(0x30A8)),
    ("ko", Alias::Char(0x30AA)),
    ("kn", Alias::Char(0x30F3)),
    ("kdot", Alias::Char(0x30FB)),
    ("kdash", Alias::Char(0x30FC)),
    // Controller buttons (game-specific art, no Unicode equivalent)
    ("up", Alias::Internal),
    ("down", Alias::Internal),
    ("left", Alias::Internal),
    ("right", Alias::Internal),
    ("upleft", Alias::Internal),
    ("upright", Alias::Internal),
    ("downleft", Alias::Internal),
    ("downright", Alias::Internal),
    ("center", Alias::Internal),
    ("menuup", Alias::Internal),
    ("menudown", Alias::Internal),
    ("menuleft", Alias::Internal),
    ("menuright", Alias::Internal),
    ("start", Alias::Internal),
    ("select", Alias::Internal),
    ("back", Alias::Internal),
    ("ok", Alias::Internal),
    ("nextrow", Alias::Internal),
    ("auxx", Alias::Internal),
    ("auxtriangle", Alias::Internal),
    ("auxsquare", Alias::Internal),
    ("auxcircle", Alias::Internal),
    ("auxl1", Alias::Internal),
    ("auxl2", Alias::Internal),
    ("auxr1", Alias::Internal),
    ("auxr2", Alias::Internal),
    ("auxselect", Alias::Internal),
    ("auxstart", Alias::Internal),
];

/// Alias name -> codepoint, plus `&name;` marker -> UTF-8 substitutions
#[derive(Debug, Clone)]
pub struct AliasTable {
    by_name: HashMap<String, u32>,
    markers: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasTable {
    /// Build the table from the built-in aliases
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(ALIASES.len());
        let mut next_internal = INTERNAL_ALIAS_START;
        for &(name, alias) in ALIASES {
            let cp = match alias {
                Alias::Char(cp) => cp,
                Alias::Internal => {
                    let cp = next_internal;
                    next_internal += 1;
                    cp
                }
            };
            by_name.insert(name.to_ascii_lowercase(), cp);
        }

        let markers = by_name
            .iter()
            .map(|(name, &cp)| {
                let mut bytes = Vec::with_capacity(4);
                utf8::encode(cp, &mut bytes);
                (name.clone(), String::from_utf8_lossy(&bytes).into_owned())
            })
            .collect();

        debug!("Alias table built: {} aliases", by_name.len());
        Self { by_name, markers }
    }

    /// Case-insensitive alias lookup
    pub fn resolve_alias(&self, name: &str) -> Result<u32, ConfigError> {
        self.by_name
            .get(&name.trim().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| ConfigError::UnknownAlias(name.trim().to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Replace every `&alias;` marker with the alias character
    ///
    /// Unknown markers are left as written.
    pub fn replace_markers(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let tail = &rest[amp + 1..];
            let replacement = tail.find(';').and_then(|semi| {
                self.markers
                    .get(&tail[..semi].to_ascii_lowercase())
                    .map(|s| (s, semi))
            });
            match replacement {
                Some((s, semi)) => {
                    out.push_str(s);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = tail;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Parse a `U+XXXX` escape
pub fn parse_hex_escape(spec: &str) -> Result<u32, ConfigError> {
    let t = spec.trim();
    let hex = t
        .strip_prefix("U+")
        .or_else(|| t.strip_prefix("u+"))
        .ok_or_else(|| ConfigError::MalformedEscape(t.to_string()))?;
    if hex.is_empty() || hex.len() > 8 {
        return Err(ConfigError::MalformedEscape(t.to_string()));
    }
    u32::from_str_radix(hex, 16).map_err(|_| ConfigError::MalformedEscape(t.to_string()))
}

/// Tag `codepoint` with `game_id` in the top byte: `((game_id + 1) << 24) | codepoint`
///
/// Fails when `codepoint` exceeds 24 bits or `game_id` is above [`MAX_GAME_ID`].
pub fn make_game_glyph(codepoint: u32, game_id: u8) -> Result<u32, ConfigError> {
    if codepoint > MAX_GAME_CODEPOINT || game_id > MAX_GAME_ID {
        return Err(ConfigError::UntaggableGameGlyph { codepoint, game_id });
    }
    Ok(((u32::from(game_id) + 1) << GAME_TAG_SHIFT) | codepoint)
}

/// Split a game-scoped glyph into `(codepoint, game_id)`; `None` for plain codepoints
pub fn extract_game_glyph(tagged: u32) -> Option<(u32, u8)> {
    let tag = tagged >> GAME_TAG_SHIFT;
    if tag == 0 {
        return None;
    }
    Some((tagged & MAX_GAME_CODEPOINT, (tag - 1) as u8))
}
