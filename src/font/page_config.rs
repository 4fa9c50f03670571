//! Per-page settings parsed from a font `.ini` file
//!
//! Settings are read from `[common]` and then from the page's own section,
//! later values winning. Recognized entries:
//!
//! ```text
//! DrawExtraPixelsLeft=<int>      AddToAllWidths=<int>
//! DrawExtraPixelsRight=<int>     ScaleAllWidthsBy=<float>
//! LineSpacing=<int>              <frame>=<width>
//! map <spec>=<frame>             range <codeset> [#<first>-<last>]=<frame>
//! line <row>=<chars>
//! ```

use log::{trace, warn};
use std::collections::HashMap;

use super::charmaps::Codeset;
use super::codepoint::{make_game_glyph, parse_hex_escape, AliasTable};
use crate::assets::GameResolver;
use crate::config::ini::{IniFile, IniSection};
use crate::constants::{COMMON_SECTION, IDENTITY_FRAME_COUNTS, NBSP, SPACE};
use crate::error::{ConfigError, FontError, Result};

/// Frame grid of the atlas a page config is parsed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrid {
    pub columns: usize,
    pub rows: usize,
}

impl FrameGrid {
    pub fn count(self) -> usize {
        self.columns * self.rows
    }
}

/// Lookups a page config needs while resolving codepoint specs
pub struct SpecContext<'a> {
    pub aliases: &'a AliasTable,
    pub games: &'a dyn GameResolver,
}

/// Resolved settings and codepoint mapping for one page
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub draw_extra_pixels_left: i32,
    pub draw_extra_pixels_right: i32,
    pub add_to_all_widths: i32,
    pub scale_all_widths_by: f32,
    /// `None` = use the frame height
    pub line_spacing: Option<i32>,
    /// Explicit width per frame index
    pub width_overrides: HashMap<usize, i32>,
    /// Codepoint -> frame, in application order (later entries win)
    pub mappings: Vec<(u32, usize)>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            draw_extra_pixels_left: 0,
            draw_extra_pixels_right: 0,
            add_to_all_widths: 0,
            scale_all_widths_by: 1.0,
            line_spacing: None,
            width_overrides: HashMap::new(),
            mappings: Vec::new(),
        }
    }
}

impl PageConfig {
    /// Parse the settings for page `tag` against an atlas of `grid` frames
    pub fn parse(ini: &IniFile, tag: &str, grid: FrameGrid, ctx: &SpecContext<'_>) -> Result<Self> {
        let mut config = PageConfig::default();

        let mut sections = vec![COMMON_SECTION];
        if !tag.eq_ignore_ascii_case(COMMON_SECTION) {
            sections.push(tag);
        }
        for name in sections {
            if let Some(section) = ini.section(name) {
                config.apply_settings(section);
                config.apply_entries(section, tag, grid, ctx)?;
            }
        }

        if config.mappings.is_empty() && IDENTITY_FRAME_COUNTS.contains(&grid.count()) {
            trace!("[{}] no mapping, identity over {} frames", tag, grid.count());
            config.mappings = (0..grid.count()).map(|i| (i as u32, i)).collect();
        }
        config.link_space_and_nbsp();
        Ok(config)
    }

    /// Replace the mapping with `chars[i] -> frame i`
    ///
    /// Fails when the page has fewer frames than `chars`.
    pub fn with_char_set(mut self, chars: &str, tag: &str, grid: FrameGrid) -> Result<Self> {
        let required = chars.chars().count();
        if required > grid.count() {
            return Err(FontError::FrameCountMismatch {
                page: tag.to_string(),
                frame_count: grid.count(),
                required,
            });
        }
        self.mappings = chars
            .chars()
            .enumerate()
            .map(|(frame, ch)| (u32::from(ch), frame))
            .collect();
        Ok(self)
    }

    fn apply_settings(&mut self, section: &IniSection) {
        if let Some(n) = section.get_parsed("DrawExtraPixelsLeft") {
            self.draw_extra_pixels_left = n;
        }
        if let Some(n) = section.get_parsed("DrawExtraPixelsRight") {
            self.draw_extra_pixels_right = n;
        }
        if let Some(n) = section.get_parsed("AddToAllWidths") {
            self.add_to_all_widths = n;
        }
        if let Some(n) = section.get_parsed("ScaleAllWidthsBy") {
            self.scale_all_widths_by = n;
        }
        if let Some(n) = section.get_parsed("LineSpacing") {
            self.line_spacing = Some(n);
        }
    }

    fn apply_entries(
        &mut self,
        section: &IniSection,
        tag: &str,
        grid: FrameGrid,
        ctx: &SpecContext<'_>,
    ) -> Result<()> {
        for (key, value) in section.entries() {
            let invalid = || ConfigError::InvalidEntry {
                section: section.name().to_string(),
                key: key.to_string(),
                value: value.to_string(),
            };

            if let Ok(frame) = key.parse::<usize>() {
                let width = value.trim().parse::<i32>().map_err(|_| invalid())?;
                self.width_overrides.insert(frame, width);
            } else if let Some(spec) = strip_keyword(key, "map") {
                let frame = value.trim().parse::<usize>().map_err(|_| invalid())?;
                check_frame(tag, frame, grid)?;
                for cp in resolve_spec(spec, ctx)? {
                    self.mappings.push((cp, frame));
                }
            } else if let Some(spec) = strip_keyword(key, "range") {
                let first_frame = value.trim().parse::<usize>().map_err(|_| invalid())?;
                let (codeset, span) = parse_range_spec(spec).ok_or_else(invalid)?;
                self.apply_range(&codeset, span, first_frame, tag, grid)?;
            } else if let Some(row) = strip_keyword(key, "line") {
                let row = row.trim().parse::<usize>().map_err(|_| invalid())?;
                self.apply_line(row, value, tag, grid);
            }
        }
        Ok(())
    }

    fn apply_range(
        &mut self,
        codeset: &str,
        span: Option<(u32, u32)>,
        first_frame: usize,
        tag: &str,
        grid: FrameGrid,
    ) -> Result<()> {
        if codeset.eq_ignore_ascii_case("unicode") {
            let Some((first, last)) = span else {
                warn!("[{}] range Unicode without #first-last ignored", tag);
                return Ok(());
            };
            for (offset, cp) in (first..=last).enumerate() {
                let frame = first_frame + offset;
                check_frame(tag, frame, grid)?;
                self.mappings.push((cp, frame));
            }
            return Ok(());
        }

        let Some(table) = Codeset::from_name(codeset) else {
            warn!("[{}] unsupported codeset '{}' in range; skipping", tag, codeset);
            return Ok(());
        };
        let (start, last) = span.unwrap_or((0, table.len() - 1));
        if last >= table.len() {
            warn!(
                "[{}] range {} #{:X}-{:X} exceeds codeset length {}",
                tag,
                codeset,
                start,
                last,
                table.len()
            );
        }
        for slot in start..=last.min(table.len() - 1) {
            let Some(cp) = table.codepoint(slot) else {
                continue;
            };
            let frame = first_frame + (slot - start) as usize;
            check_frame(tag, frame, grid)?;
            self.mappings.push((cp, frame));
        }
        Ok(())
    }

    fn apply_line(&mut self, row: usize, chars: &str, tag: &str, grid: FrameGrid) {
        if row >= grid.rows {
            trace!("[{}] line {} beyond {} rows ignored", tag, row, grid.rows);
            return;
        }
        let first = row * grid.columns;
        for (offset, ch) in chars.chars().enumerate() {
            let frame = first + offset;
            if frame >= grid.count() {
                break;
            }
            self.mappings.push((u32::from(ch), frame));
        }
    }

    /// Space and NBSP share a frame when only one of them is mapped
    fn link_space_and_nbsp(&mut self) {
        let frame_of = |cp: u32, maps: &[(u32, usize)]| {
            maps.iter().rev().find(|(c, _)| *c == cp).map(|&(_, f)| f)
        };
        match (frame_of(SPACE, &self.mappings), frame_of(NBSP, &self.mappings)) {
            (Some(frame), None) => self.mappings.push((NBSP, frame)),
            (None, Some(frame)) => self.mappings.push((SPACE, frame)),
            _ => {}
        }
    }
}

/// `"map U+0041"` -> `"U+0041"` (keyword matched case-insensitively)
fn strip_keyword<'a>(key: &'a str, keyword: &str) -> Option<&'a str> {
    let head = key.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &key[keyword.len()..];
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

fn check_frame(tag: &str, frame: usize, grid: FrameGrid) -> Result<()> {
    if frame >= grid.count() {
        return Err(FontError::FrameOutOfRange {
            page: tag.to_string(),
            frame,
            frame_count: grid.count(),
        });
    }
    Ok(())
}

/// Resolve a `map` spec to the codepoints it names
///
/// `U+<hex>` | `"<chars>"` | `<game> <alias>` | `<alias>`
pub fn resolve_spec(spec: &str, ctx: &SpecContext<'_>) -> std::result::Result<Vec<u32>, ConfigError> {
    let spec = spec.trim();
    if spec.len() > 2 && spec.starts_with('"') && spec.ends_with('"') {
        return Ok(spec[1..spec.len() - 1].chars().map(u32::from).collect());
    }
    if spec.starts_with("U+") || spec.starts_with("u+") {
        return parse_hex_escape(spec).map(|cp| vec![cp]);
    }
    if let Some((game, alias)) = spec.split_once(char::is_whitespace) {
        let game_id = ctx
            .games
            .game_id(game)
            .ok_or_else(|| ConfigError::UnknownGameType(game.to_string()))?;
        let cp = ctx.aliases.resolve_alias(alias)?;
        return Ok(vec![make_game_glyph(cp, game_id)?]);
    }
    ctx.aliases.resolve_alias(spec).map(|cp| vec![cp])
}

/// `"<codeset> [#<first>-<last>]"` -> codeset and optional hex span
fn parse_range_spec(spec: &str) -> Option<(String, Option<(u32, u32)>)> {
    let spec = spec.trim();
    let end = spec
        .find(|c: char| c.is_whitespace() || c == '#')
        .unwrap_or(spec.len());
    if end == 0 {
        return None;
    }
    let codeset = spec[..end].to_string();
    let tail = spec[end..].trim_start();
    if tail.is_empty() {
        return Some((codeset, None));
    }
    let (first, last) = tail.strip_prefix('#')?.split_once('-')?;
    let first = u32::from_str_radix(first.trim(), 16).ok()?;
    let last = u32::from_str_radix(last.trim(), 16).ok()?;
    if last < first {
        return None;
    }
    Some((codeset, Some((first, last))))
}
