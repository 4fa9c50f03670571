//! Shared fixtures: in-memory font files and a reference-counting fake
//! texture loader with fixed 10x16 frames

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bitfont::config::FontsConfig;
use bitfont::error::{FontError, Result};
use bitfont::font::discovery::parse_frame_grid;
use bitfont::{FontCache, MemoryAssets, NamedGames, TextureId, TextureInfo, TextureLoader};

pub const FRAME_WIDTH: u32 = 10;
pub const FRAME_HEIGHT: u32 = 16;

#[derive(Default)]
struct Ledger {
    next: u32,
    paths: HashMap<TextureId, PathBuf>,
    refs: HashMap<TextureId, usize>,
    loads: usize,
}

/// Shared view of the fake loader's reference counts
#[derive(Clone, Default)]
pub struct TextureLedger(Rc<RefCell<Ledger>>);

impl TextureLedger {
    /// Sum of outstanding references over all textures
    pub fn live(&self) -> usize {
        self.0.borrow().refs.values().sum()
    }

    /// Outstanding references to the texture loaded from `path`
    pub fn refs(&self, path: &str) -> usize {
        let ledger = self.0.borrow();
        ledger
            .paths
            .iter()
            .find(|(_, p)| p.as_path() == Path::new(path))
            .and_then(|(id, _)| ledger.refs.get(id).copied())
            .unwrap_or(0)
    }

    /// Number of `load` calls that decoded a new texture
    pub fn loads(&self) -> usize {
        self.0.borrow().loads
    }
}

/// Fake [`TextureLoader`]: grid from the file name, 10x16 frames
pub struct CountingLoader {
    ledger: TextureLedger,
}

impl TextureLoader for CountingLoader {
    fn load(&mut self, path: &Path) -> Result<TextureInfo> {
        let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
        let Some((cols, rows)) = parse_frame_grid(&stem) else {
            return Err(FontError::Texture {
                path: path.to_path_buf(),
                message: "no frame grid in file name".to_string(),
            });
        };

        let mut ledger = self.ledger.0.borrow_mut();
        let existing = ledger
            .paths
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(id, _)| *id);
        let id = match existing {
            Some(id) if ledger.refs.get(&id).copied().unwrap_or(0) > 0 => {
                *ledger.refs.get_mut(&id).unwrap() += 1;
                id
            }
            _ => {
                ledger.next += 1;
                ledger.loads += 1;
                let id = TextureId(ledger.next);
                ledger.paths.insert(id, path.to_path_buf());
                ledger.refs.insert(id, 1);
                id
            }
        };

        Ok(TextureInfo {
            id,
            source_width: cols * FRAME_WIDTH,
            source_height: rows * FRAME_HEIGHT,
            frames_wide: cols,
            frames_high: rows,
            frame_widths: Vec::new(),
        })
    }

    fn retain(&mut self, id: TextureId) {
        *self.ledger.0.borrow_mut().refs.get_mut(&id).unwrap() += 1;
    }

    fn release(&mut self, id: TextureId) {
        let mut ledger = self.ledger.0.borrow_mut();
        let refs = ledger.refs.get_mut(&id).unwrap();
        assert!(*refs > 0, "texture {:?} released too often", id);
        *refs -= 1;
    }
}

/// Cache over `assets` with no default font
pub fn cache(assets: MemoryAssets) -> (FontCache, TextureLedger) {
    cache_with_default(assets, "")
}

/// Cache over `assets` importing `default_font` (empty = none)
pub fn cache_with_default(assets: MemoryAssets, default_font: &str) -> (FontCache, TextureLedger) {
    let ledger = TextureLedger::default();
    let settings = FontsConfig {
        default_font: default_font.to_string(),
        ..FontsConfig::default()
    };
    let cache = FontCache::new(
        settings,
        Box::new(assets),
        Box::new(CountingLoader {
            ledger: ledger.clone(),
        }),
        Box::new(NamedGames::new(["dance", "pump"])),
    );
    (cache, ledger)
}
