//! Font: an ordered stack of pages with layered glyph lookup
//!
//! Pages are kept in merge order (default font, imports in list order, then
//! the font's own pages). Lookup scans from the most recently merged page
//! back to the first, so local definitions override imported ones without
//! rewriting any page's mapping.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::cache::{normalize_path, FontCache};
use super::discovery::{self, page_tag};
use super::page::{FontPage, Glyph};
use super::page_config::{FrameGrid, PageConfig};
use crate::assets::{TextureId, TextureLoader};
use crate::config::ini::IniFile;
use crate::constants::{DEFAULT_GLYPH, DEFAULT_PAGE_TAG, MAX_PAGE_FRAMES};
use crate::error::{FontError, Result};

/// A loaded bitmap font
#[derive(Debug, Clone)]
pub struct Font {
    path: PathBuf,
    pages: Vec<FontPage>,
    capitals_only: bool,
}

impl Font {
    /// Build a font directly from pages (merge order, last page wins)
    ///
    /// The font does not own texture references; hosts assembling fonts by
    /// hand manage their textures themselves.
    pub fn from_pages(path: impl Into<PathBuf>, pages: Vec<FontPage>, capitals_only: bool) -> Self {
        Self {
            path: path.into(),
            pages,
            capitals_only,
        }
    }

    /// Load the font at `path`, merging the default font and `import=` fonts
    /// through `cache`
    pub(crate) fn load(cache: &mut FontCache, path: &Path, char_set: Option<&str>) -> Result<Self> {
        info!("Loading font: {}", path.display());

        let files = discovery::discover(cache.assets(), path, cache.settings())?;
        if files.pages.is_empty() && files.config.is_none() {
            return Err(FontError::NoPages(path.to_path_buf()));
        }

        let ini = match &files.config {
            Some(config) => IniFile::parse(&cache.assets().read_to_string(config)?),
            None => IniFile::default(),
        };
        let main = ini.section(DEFAULT_PAGE_TAG);
        let capitals_only = main
            .and_then(|s| s.get_bool("CapitalsOnly"))
            .unwrap_or(false);
        let imports: Vec<String> = main
            .and_then(|s| s.get("import"))
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut font = Self::from_pages(path, Vec::new(), capitals_only);
        if let Err(e) = font.load_pages(cache, &files.pages, &ini, &imports, char_set) {
            font.release_textures(cache.textures_mut());
            return Err(e);
        }

        if font.mapped_count() == 0 {
            warn!("Font '{}' has no characters mapped", path.display());
        }
        info!(
            "Font loaded: {} ({} page(s), {} glyph(s))",
            path.display(),
            font.pages.len(),
            font.mapped_count()
        );
        Ok(font)
    }

    fn load_pages(
        &mut self,
        cache: &mut FontCache,
        page_files: &[PathBuf],
        ini: &IniFile,
        imports: &[String],
        char_set: Option<&str>,
    ) -> Result<()> {
        if let Some(default) = cache.settings().default_font_path() {
            if normalize_path(&default) == normalize_path(&self.path) {
                // The default font's own imports must not pull it in again
                let was_loading = cache.set_loading_default(true);
                let result = self.merge_imports(cache, imports);
                cache.set_loading_default(was_loading);
                result?;
            } else {
                if !cache.loading_default() {
                    let was_loading = cache.set_loading_default(true);
                    let result = self.merge_import(cache, &default);
                    cache.set_loading_default(was_loading);
                    match result {
                        Err(FontError::NoPages(missing)) if missing == default => {
                            debug!("Default font {} not found, skipping", default.display());
                        }
                        other => other?,
                    }
                }
                self.merge_imports(cache, imports)?;
            }
        } else {
            self.merge_imports(cache, imports)?;
        }

        for page_file in page_files {
            let page = Self::load_page(cache, page_file, ini, char_set)?;
            self.pages.push(page);
        }
        Ok(())
    }

    fn merge_imports(&mut self, cache: &mut FontCache, imports: &[String]) -> Result<()> {
        for name in imports {
            let import_path = cache.settings().root.join(name);
            self.merge_import(cache, &import_path)?;
        }
        Ok(())
    }

    /// Append the pages of the font at `path`, taking a texture reference for each
    fn merge_import(&mut self, cache: &mut FontCache, path: &Path) -> Result<()> {
        let handle = cache.load_font(path, None)?;
        let pages = cache.font(handle)?.pages.clone();
        for page in &pages {
            cache.textures_mut().retain(page.texture());
        }
        debug!("Merged {} page(s) from {}", pages.len(), path.display());
        self.pages.extend(pages);
        cache.unload_font(handle)
    }

    fn load_page(
        cache: &mut FontCache,
        page_file: &Path,
        ini: &IniFile,
        char_set: Option<&str>,
    ) -> Result<FontPage> {
        let stem = page_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tag = page_tag(&stem);

        let texture = cache.textures_mut().load(page_file)?;
        let grid = FrameGrid {
            columns: texture.frames_wide as usize,
            rows: texture.frames_high as usize,
        };
        let config = match texture.frame_count() {
            Some(_) => PageConfig::parse(ini, &tag, grid, &cache.spec_context()).and_then(|config| {
                match char_set {
                    Some(chars) => config.with_char_set(chars, &tag, grid),
                    None => Ok(config),
                }
            }),
            None => Err(FontError::Texture {
                path: page_file.to_path_buf(),
                message: format!(
                    "frame grid {}x{} exceeds {} frames",
                    texture.frames_wide, texture.frames_high, MAX_PAGE_FRAMES
                ),
            }),
        };
        match config {
            Ok(config) => Ok(FontPage::build(&tag, &texture, page_file, config)),
            Err(e) => {
                cache.textures_mut().release(texture.id);
                Err(e)
            }
        }
    }

    /// Drop this font's texture references
    pub(crate) fn release_textures(&mut self, textures: &mut dyn TextureLoader) {
        for page in self.pages.drain(..) {
            textures.release(page.texture());
        }
    }

    fn lookup(&self, codepoint: u32) -> Option<(&FontPage, &Glyph)> {
        self.pages
            .iter()
            .rev()
            .find_map(|page| page.glyph_for(codepoint).map(|glyph| (page, glyph)))
    }

    fn find(&self, codepoint: u32) -> Option<(&FontPage, &Glyph)> {
        let folded = if self.capitals_only {
            self.lookup(to_upper(codepoint))
        } else {
            None
        };
        folded
            .or_else(|| self.lookup(codepoint))
            .or_else(|| self.lookup(DEFAULT_GLYPH))
    }

    /// Glyph for `codepoint`, falling back to the default glyph
    ///
    /// `None` when neither is mapped.
    pub fn glyph(&self, codepoint: u32) -> Option<&Glyph> {
        self.find(codepoint).map(|(_, glyph)| glyph)
    }

    /// Sum of horizontal advances over `line`
    pub fn line_width(&self, line: &[u32]) -> i32 {
        line.iter()
            .filter_map(|&cp| self.glyph(cp))
            .map(|glyph| glyph.horizontal_advance)
            .sum()
    }

    /// Largest line spacing among pages used by `line`
    ///
    /// Lines that touch no page use [`Font::default_line_spacing`].
    pub fn line_height(&self, line: &[u32]) -> i32 {
        line.iter()
            .filter_map(|&cp| self.find(cp))
            .map(|(page, _)| page.line_spacing())
            .max()
            .unwrap_or_else(|| self.default_line_spacing())
    }

    /// Line spacing of the last `main` page, else the last page
    pub fn default_line_spacing(&self) -> i32 {
        self.pages
            .iter()
            .rev()
            .find(|page| page.tag() == DEFAULT_PAGE_TAG)
            .or_else(|| self.pages.last())
            .map_or(0, FontPage::line_spacing)
    }

    /// Number of distinct codepoints mapped across all pages
    pub fn mapped_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| page.codepoints())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.mapped_count() == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pages(&self) -> &[FontPage] {
        &self.pages
    }

    pub fn capitals_only(&self) -> bool {
        self.capitals_only
    }

    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.pages.iter().map(FontPage::texture)
    }
}

fn to_upper(codepoint: u32) -> u32 {
    let Some(ch) = char::from_u32(codepoint) else {
        return codepoint;
    };
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u32::from(u),
        _ => codepoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureInfo;

    fn page(tag: &str, id: u32, line_spacing: Option<i32>, mappings: &[(u32, usize)]) -> FontPage {
        let texture = TextureInfo {
            id: TextureId(id),
            source_width: 40,
            source_height: 10,
            frames_wide: 4,
            frames_high: 1,
            frame_widths: vec![10, 6, 8, 4],
        };
        let config = PageConfig {
            line_spacing,
            mappings: mappings.to_vec(),
            ..PageConfig::default()
        };
        FontPage::build(tag, &texture, Path::new("page.png"), config)
    }

    #[test]
    fn test_later_page_overrides_earlier() {
        let font = Font::from_pages(
            "f",
            vec![page("main", 1, None, &[(65, 0), (66, 1)]), page("main", 2, None, &[(65, 2)])],
            false,
        );
        assert_eq!(font.glyph(65).unwrap().texture, TextureId(2));
        assert_eq!(font.glyph(65).unwrap().horizontal_advance, 8);
        assert_eq!(font.glyph(66).unwrap().texture, TextureId(1));
    }

    #[test]
    fn test_default_glyph_fallback() {
        let with_default = Font::from_pages("f", vec![page("main", 1, None, &[(DEFAULT_GLYPH, 3)])], false);
        assert_eq!(with_default.glyph(0x263A).unwrap().horizontal_advance, 4);

        let without = Font::from_pages("f", vec![page("main", 1, None, &[(65, 0)])], false);
        assert!(without.glyph(0x263A).is_none());
        assert_eq!(without.line_width(&[65, 0x263A, 65]), 20);
    }

    #[test]
    fn test_capitals_only_folds_lowercase() {
        let font = Font::from_pages("f", vec![page("main", 1, None, &[(65, 1)])], true);
        assert_eq!(font.glyph('a' as u32), font.glyph('A' as u32));
        assert!(font.glyph('a' as u32).is_some());
    }

    #[test]
    fn test_line_metrics() {
        let font = Font::from_pages(
            "f",
            vec![page("main", 1, None, &[(65, 0), (66, 1)]), page("alt", 2, Some(14), &[(67, 2)])],
            false,
        );
        assert_eq!(font.line_width(&[]), 0);
        assert_eq!(font.line_width(&[65, 66]), 16);
        assert_eq!(font.line_height(&[65]), 10);
        assert_eq!(font.line_height(&[65, 67]), 14);
        assert_eq!(font.line_height(&[]), 10);
        assert_eq!(font.default_line_spacing(), 10);
    }

    #[test]
    fn test_empty_font() {
        let font = Font::from_pages("f", vec![page("main", 1, None, &[])], false);
        assert!(font.is_empty());
        assert_eq!(font.mapped_count(), 0);
        assert_eq!(Font::from_pages("f", Vec::new(), false).line_height(&[65]), 0);
    }

    #[test]
    fn test_to_upper() {
        assert_eq!(to_upper('q' as u32), 'Q' as u32);
        assert_eq!(to_upper('7' as u32), '7' as u32);
        assert_eq!(to_upper(0xDF), 0xDF);
        assert_eq!(to_upper(0xD800), 0xD800);
    }
}
