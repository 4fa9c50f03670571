//! Font cache
//!
//! Path-keyed, reference-counted store of loaded fonts. Fonts live in an
//! arena of slots and are addressed by [`FontHandle`] (slot index plus
//! generation), so a handle to an evicted font is detected instead of
//! aliasing whatever font reuses its slot.
//!
//! The cache also owns the alias table and the import stack used to detect
//! recursive `import=` chains.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;

use super::codepoint::AliasTable;
use super::face::Font;
use super::page_config::SpecContext;
use crate::assets::{AssetSource, GameResolver, TextureLoader};
use crate::config::FontsConfig;
use crate::error::{FontError, Result};

/// Opaque reference to a cached font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle {
    index: u32,
    generation: u32,
}

struct Entry {
    key: String,
    font: Font,
    refs: usize,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Cache key for `path`: case-folded with `/` separators
///
/// Equivalent paths spelled through `..` still produce distinct keys.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

/// Loaded fonts plus the collaborators used to load them
pub struct FontCache {
    settings: FontsConfig,
    assets: Box<dyn AssetSource>,
    textures: Box<dyn TextureLoader>,
    games: Box<dyn GameResolver>,
    aliases: AliasTable,
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_key: HashMap<String, FontHandle>,
    import_stack: Vec<String>,
    loading_default: bool,
}

impl FontCache {
    pub fn new(
        settings: FontsConfig,
        assets: Box<dyn AssetSource>,
        textures: Box<dyn TextureLoader>,
        games: Box<dyn GameResolver>,
    ) -> Self {
        Self {
            settings,
            assets,
            textures,
            games,
            aliases: AliasTable::new(),
            slots: Vec::new(),
            free: Vec::new(),
            by_key: HashMap::new(),
            import_stack: Vec::new(),
            loading_default: false,
        }
    }

    /// Load the font at `path`, or take another reference to the cached one
    ///
    /// `char_set` maps its characters positionally onto every page's frames.
    /// It only applies to the first load of a path.
    pub fn load_font(&mut self, path: impl AsRef<Path>, char_set: Option<&str>) -> Result<FontHandle> {
        let path = path.as_ref();
        let key = normalize_path(path);

        if let Some(&handle) = self.by_key.get(&key) {
            if let Some(entry) = self.entry_mut(handle) {
                entry.refs += 1;
                debug!("Font cache hit: {} ({} refs)", path.display(), entry.refs);
                if char_set.is_some() {
                    debug!("Character set ignored for cached font {}", path.display());
                }
                return Ok(handle);
            }
        }

        if self.import_stack.contains(&key) {
            let mut chain = self.import_stack.clone();
            chain.push(key);
            return Err(FontError::ImportRecursion { chain });
        }

        self.import_stack.push(key.clone());
        let loaded = Font::load(self, path, char_set);
        self.import_stack.pop();
        let font = loaded?;

        let handle = self.insert(key.clone(), font);
        self.by_key.insert(key, handle);
        Ok(handle)
    }

    /// Drop one reference; the font is destroyed when the last one goes
    pub fn unload_font(&mut self, handle: FontHandle) -> Result<()> {
        let entry = self.entry_mut(handle).ok_or(FontError::UnknownFontHandle)?;
        entry.refs -= 1;
        if entry.refs > 0 {
            debug!("Font released: {} ({} refs)", entry.font.path().display(), entry.refs);
            return Ok(());
        }

        let slot = &mut self.slots[handle.index as usize];
        let Some(mut entry) = slot.entry.take() else {
            return Err(FontError::UnknownFontHandle);
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.by_key.remove(&entry.key);
        entry.font.release_textures(self.textures.as_mut());
        info!("Font unloaded: {}", entry.font.path().display());
        Ok(())
    }

    /// Font behind `handle`
    pub fn font(&self, handle: FontHandle) -> Result<&Font> {
        self.entry(handle)
            .map(|entry| &entry.font)
            .ok_or(FontError::UnknownFontHandle)
    }

    /// Outstanding references to `handle` (0 once evicted)
    pub fn ref_count(&self, handle: FontHandle) -> usize {
        self.entry(handle).map_or(0, |entry| entry.refs)
    }

    /// Cached font for `path`, without taking a reference
    pub fn lookup(&self, path: impl AsRef<Path>) -> Option<FontHandle> {
        self.by_key.get(&normalize_path(path.as_ref())).copied()
    }

    /// Number of live fonts
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn settings(&self) -> &FontsConfig {
        &self.settings
    }

    pub(crate) fn assets(&self) -> &dyn AssetSource {
        self.assets.as_ref()
    }

    pub(crate) fn textures_mut(&mut self) -> &mut dyn TextureLoader {
        self.textures.as_mut()
    }

    pub(crate) fn spec_context(&self) -> SpecContext<'_> {
        SpecContext {
            aliases: &self.aliases,
            games: self.games.as_ref(),
        }
    }

    pub(crate) fn loading_default(&self) -> bool {
        self.loading_default
    }

    /// Set the default-font guard, returning its previous value
    pub(crate) fn set_loading_default(&mut self, loading: bool) -> bool {
        std::mem::replace(&mut self.loading_default, loading)
    }

    fn insert(&mut self, key: String, font: Font) -> FontHandle {
        let entry = Entry { key, font, refs: 1 };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(entry);
        FontHandle {
            index,
            generation: slot.generation,
        }
    }

    fn entry(&self, handle: FontHandle) -> Option<&Entry> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, handle: FontHandle) -> Option<&mut Entry> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }
}

impl Drop for FontCache {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Some(mut entry) = slot.entry.take() {
                warn!(
                    "Font leak: {} still has {} reference(s) at cache teardown",
                    entry.font.path().display(),
                    entry.refs
                );
                entry.font.release_textures(self.textures.as_mut());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssets, NamedGames, TextureId, TextureInfo};

    /// 16x16 frames, grid taken from the file name
    #[derive(Default)]
    struct GridLoader {
        next: u32,
    }

    impl TextureLoader for GridLoader {
        fn load(&mut self, path: &Path) -> Result<TextureInfo> {
            let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
            let (cols, rows) = crate::font::discovery::parse_frame_grid(&stem).unwrap_or((1, 1));
            self.next += 1;
            Ok(TextureInfo {
                id: TextureId(self.next),
                source_width: cols * 16,
                source_height: rows * 16,
                frames_wide: cols,
                frames_high: rows,
                frame_widths: Vec::new(),
            })
        }

        fn retain(&mut self, _id: TextureId) {}

        fn release(&mut self, _id: TextureId) {}
    }

    fn cache(assets: MemoryAssets) -> FontCache {
        let settings = FontsConfig {
            default_font: String::new(),
            ..FontsConfig::default()
        };
        FontCache::new(
            settings,
            Box::new(assets),
            Box::new(GridLoader::default()),
            Box::new(NamedGames::new(["dance"])),
        )
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("Fonts\\Common Normal")), "fonts/common normal");
    }

    #[test]
    fn test_handle_reuse_is_detected() {
        let mut cache = cache(
            MemoryAssets::new()
                .with("Fonts/a 16x8.png", "")
                .with("Fonts/b 16x8.png", ""),
        );
        let a = cache.load_font("Fonts/a", None).unwrap();
        cache.unload_font(a).unwrap();
        let b = cache.load_font("Fonts/b", None).unwrap();
        assert_ne!(a, b);
        assert!(matches!(cache.font(a), Err(FontError::UnknownFontHandle)));
        assert!(cache.font(b).is_ok());
        assert_eq!(cache.ref_count(a), 0);
        cache.unload_font(b).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut cache = cache(MemoryAssets::new().with("Fonts/a 16x8.png", ""));
        let a = cache.load_font("Fonts/a", None).unwrap();
        assert_eq!(cache.lookup("FONTS/A"), Some(a));
        assert_eq!(cache.load_font("fonts/A", None).unwrap(), a);
        assert_eq!(cache.ref_count(a), 2);
        cache.unload_font(a).unwrap();
        cache.unload_font(a).unwrap();
    }

    #[test]
    fn test_missing_font() {
        let mut cache = cache(MemoryAssets::new());
        assert!(matches!(
            cache.load_font("Fonts/nothing", None),
            Err(FontError::NoPages(_))
        ));
        assert!(cache.is_empty());
    }
}
