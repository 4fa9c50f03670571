//! Font file discovery
//!
//! Finds the page textures and the settings file that belong to a font.
//! Page files follow `<FontName>[ [<tag>]][ <cols>x<rows>].<ext>`.

use log::{debug, trace};
use std::io;
use std::path::{Path, PathBuf};

use crate::assets::AssetSource;
use crate::config::FontsConfig;
use crate::constants::DEFAULT_PAGE_TAG;

/// Files that make up one font
#[derive(Debug, Clone, Default)]
pub struct FontFiles {
    /// Settings file, if present
    pub config: Option<PathBuf>,
    /// Page textures, sorted by file name
    pub pages: Vec<PathBuf>,
}

/// Parse a trailing ` <cols>x<rows>` token from a file stem
///
/// Tokens inside `(res WxH)` are not frame grids and are skipped.
pub fn parse_frame_grid(stem: &str) -> Option<(u32, u32)> {
    stem.split_whitespace().rev().find_map(parse_grid_token)
}

fn parse_grid_token(token: &str) -> Option<(u32, u32)> {
    let (w, h) = token.split_once(['x', 'X'])?;
    if w.is_empty() || h.is_empty() {
        return None;
    }
    if !w.bytes().all(|b| b.is_ascii_digit()) || !h.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let w: u32 = w.parse().ok()?;
    let h: u32 = h.parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

/// Page tag from `<name> [<tag>]`, defaulting to `main`
pub fn page_tag(stem: &str) -> String {
    if let Some(open) = stem.find('[') {
        if let Some(close) = stem[open..].find(']') {
            let tag = stem[open + 1..open + close].trim();
            if !tag.is_empty() {
                return tag.to_string();
            }
        }
    }
    DEFAULT_PAGE_TAG.to_string()
}

/// Font base name of a font, page, or settings file name
///
/// `"Common normal [alt] 16x16.png"` -> `"Common normal"`
pub fn font_base_name(file_name: &str, fonts: &FontsConfig) -> String {
    let mut name = file_name;
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if fonts.is_texture_extension(ext) || ext.eq_ignore_ascii_case(&fonts.config_extension) {
            name = stem;
        }
    }
    if let Some(pos) = name.find(" [") {
        name = &name[..pos];
    }
    if let Some((head, last)) = name.rsplit_once(' ') {
        if parse_grid_token(last).is_some() {
            name = head;
        }
    }
    name.trim_end().to_string()
}

/// Whether `file_name` belongs to the font named `base`
///
/// The base name must be followed by `" ["`, `"."`, or `" <digits>x<digits>"`
/// so that `Normal2` is never absorbed into `Normal`.
pub fn belongs_to_font(file_name: &str, base: &str) -> bool {
    if file_name.len() <= base.len() || !file_name.is_char_boundary(base.len()) {
        return false;
    }
    let (head, rest) = file_name.split_at(base.len());
    if !head.eq_ignore_ascii_case(base) {
        return false;
    }
    if rest.starts_with(" [") || rest.starts_with('.') {
        return true;
    }
    let Some(after) = rest.strip_prefix(' ') else {
        return false;
    };
    let token = after.split(['.', ' ']).next().unwrap_or("");
    parse_grid_token(token).is_some()
}

/// Collect the settings file and page textures for the font at `path`
///
/// `path` may name the font (`Fonts/Common normal`), its settings file, or
/// one of its pages.
pub fn discover(
    assets: &dyn AssetSource,
    path: &Path,
    fonts: &FontsConfig,
) -> io::Result<FontFiles> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = font_base_name(&file_name, fonts);

    let mut files = FontFiles::default();
    let config = dir.join(format!("{}.{}", base, fonts.config_extension));
    if assets.exists(&config) {
        files.config = Some(config);
    }

    for name in assets.list_dir(dir)? {
        if !belongs_to_font(&name, &base) {
            trace!("Skipping '{}' (not part of '{}')", name, base);
            continue;
        }
        let Some((_, ext)) = name.rsplit_once('.') else {
            continue;
        };
        if fonts.is_texture_extension(ext) {
            files.pages.push(dir.join(&name));
        }
    }
    files.pages.sort();

    debug!(
        "Font '{}': {} page(s), config {:?}",
        base,
        files.pages.len(),
        files.config
    );
    Ok(files)
}
