//! External collaborators of the font cache
//!
//! - [`AssetSource`]: file existence, directory listing, text reads
//! - [`TextureLoader`]: texture decode with reference-counted handles
//! - [`GameResolver`]: game name -> game id for game-scoped glyph specs
//!
//! Filesystem-backed and in-memory implementations are provided; a host
//! application with its own resource managers implements the traits instead.

use log::{debug, trace, warn};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::GamesConfig;
use crate::constants::MAX_PAGE_FRAMES;
use crate::error::{FontError, Result};
use crate::font::discovery::parse_frame_grid;

/// Texture handle issued by a [`TextureLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Frame geometry of a loaded texture atlas
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub id: TextureId,
    /// Atlas width in source pixels
    pub source_width: u32,
    /// Atlas height in source pixels
    pub source_height: u32,
    /// Frame columns
    pub frames_wide: u32,
    /// Frame rows
    pub frames_high: u32,
    /// Measured visible width per frame (empty = use frame width)
    pub frame_widths: Vec<u32>,
}

impl TextureInfo {
    /// Frames in the grid; `None` past [`MAX_PAGE_FRAMES`]
    pub fn frame_count(&self) -> Option<usize> {
        self.frames_wide
            .checked_mul(self.frames_high)
            .map(|count| count as usize)
            .filter(|&count| count <= MAX_PAGE_FRAMES)
    }

    pub fn frame_width(&self) -> u32 {
        self.source_width / self.frames_wide.max(1)
    }

    pub fn frame_height(&self) -> u32 {
        self.source_height / self.frames_high.max(1)
    }

    /// Measured width of `frame`, falling back to the frame width
    pub fn measured_width(&self, frame: usize) -> u32 {
        self.frame_widths
            .get(frame)
            .copied()
            .unwrap_or_else(|| self.frame_width())
    }
}

/// File access used for page and config discovery
pub trait AssetSource {
    fn exists(&self, path: &Path) -> bool;

    /// File names (not paths) directly inside `dir`
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Texture decode and reference counting
///
/// Every successful `load` and every `retain` must be balanced by one
/// `release`.
pub trait TextureLoader {
    fn load(&mut self, path: &Path) -> Result<TextureInfo>;

    fn retain(&mut self, id: TextureId);

    fn release(&mut self, id: TextureId);
}

/// Game name -> game id
pub trait GameResolver {
    fn game_id(&self, name: &str) -> Option<u8>;
}

// ============================================================================
// Filesystem
// ============================================================================

/// [`AssetSource`] over the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssets;

impl AssetSource for FsAssets {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

struct LoadedTexture {
    path: PathBuf,
    info: TextureInfo,
    refs: usize,
}

/// [`TextureLoader`] that reads pixel dimensions with `image` and the frame
/// grid from the ` <cols>x<rows>` filename suffix. No pixel data is kept;
/// uploading is the renderer's job.
#[derive(Default)]
pub struct ImageTextureLoader {
    textures: HashMap<TextureId, LoadedTexture>,
    next_id: u32,
}

impl ImageTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live reference count of `id` (0 when unloaded)
    pub fn ref_count(&self, id: TextureId) -> usize {
        self.textures.get(&id).map_or(0, |t| t.refs)
    }

    /// Path `id` was loaded from
    pub fn path_of(&self, id: TextureId) -> Option<&Path> {
        self.textures.get(&id).map(|t| t.path.as_path())
    }
}

impl TextureLoader for ImageTextureLoader {
    fn load(&mut self, path: &Path) -> Result<TextureInfo> {
        if let Some(tex) = self.textures.values_mut().find(|t| t.path == path) {
            tex.refs += 1;
            trace!("Texture reused: {} ({} refs)", path.display(), tex.refs);
            return Ok(tex.info.clone());
        }

        let (width, height) = image::image_dimensions(path).map_err(|e| FontError::Texture {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (frames_wide, frames_high) = parse_frame_grid(&name).unwrap_or((1, 1));

        let id = TextureId(self.next_id);
        self.next_id += 1;
        let info = TextureInfo {
            id,
            source_width: width,
            source_height: height,
            frames_wide,
            frames_high,
            frame_widths: Vec::new(),
        };
        debug!(
            "Texture loaded: {} ({}x{}, grid {}x{})",
            path.display(),
            width,
            height,
            frames_wide,
            frames_high
        );
        self.textures.insert(
            id,
            LoadedTexture {
                path: path.to_path_buf(),
                info: info.clone(),
                refs: 1,
            },
        );
        Ok(info)
    }

    fn retain(&mut self, id: TextureId) {
        match self.textures.get_mut(&id) {
            Some(tex) => tex.refs += 1,
            None => warn!("Retain of unknown texture {:?}", id),
        }
    }

    fn release(&mut self, id: TextureId) {
        let Some(tex) = self.textures.get_mut(&id) else {
            warn!("Release of unknown texture {:?}", id);
            return;
        };
        tex.refs -= 1;
        if tex.refs == 0 {
            debug!("Texture unloaded: {}", tex.path.display());
            self.textures.remove(&id);
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// [`AssetSource`] over an in-memory file table (packed assets, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<PathBuf, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; texture entries may have empty contents
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

// ============================================================================
// Games
// ============================================================================

/// [`GameResolver`] over an ordered list of game names
#[derive(Debug, Clone, Default)]
pub struct NamedGames {
    names: Vec<String>,
}

impl NamedGames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(games: &GamesConfig) -> Self {
        Self::new(games.names.iter().cloned())
    }
}

impl GameResolver for NamedGames {
    fn game_id(&self, name: &str) -> Option<u8> {
        let idx = self
            .names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name.trim()))?;
        u8::try_from(idx).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_info_frame_geometry() {
        let info = TextureInfo {
            id: TextureId(0),
            source_width: 256,
            source_height: 128,
            frames_wide: 16,
            frames_high: 8,
            frame_widths: vec![3],
        };
        assert_eq!(info.frame_count(), Some(128));
        let huge = TextureInfo {
            frames_wide: 70_000,
            frames_high: 70_000,
            ..info.clone()
        };
        assert_eq!(huge.frame_count(), None);
        assert_eq!(info.frame_width(), 16);
        assert_eq!(info.frame_height(), 16);
        assert_eq!(info.measured_width(0), 3);
        assert_eq!(info.measured_width(5), 16);
    }

    #[test]
    fn test_memory_assets_listing() {
        let assets = MemoryAssets::new()
            .with("Fonts/a 16x8.png", "")
            .with("Fonts/a.ini", "[main]")
            .with("Fonts/sub/b.png", "");
        assert_eq!(
            assets.list_dir(Path::new("Fonts")).unwrap(),
            vec!["a 16x8.png".to_string(), "a.ini".to_string()]
        );
        assert!(assets.exists(Path::new("Fonts/a.ini")));
        assert!(!assets.exists(Path::new("Fonts/missing.ini")));
        assert!(assets.read_to_string(Path::new("Fonts/missing.ini")).is_err());
    }

    #[test]
    fn test_named_games() {
        let games = NamedGames::new(["dance", "pump"]);
        assert_eq!(games.game_id("PUMP"), Some(1));
        assert_eq!(games.game_id("kb7"), None);
    }

    #[test]
    fn test_image_loader_reads_grid_and_counts_refs() {
        let dir = std::env::temp_dir().join(format!("bitfont-tex-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Numbers 4x2.png");
        image::GrayImage::new(64, 32).save(&path).unwrap();

        let mut loader = ImageTextureLoader::new();
        let info = loader.load(&path).unwrap();
        assert_eq!((info.source_width, info.source_height), (64, 32));
        assert_eq!((info.frames_wide, info.frames_high), (4, 2));

        let again = loader.load(&path).unwrap();
        assert_eq!(again.id, info.id);
        assert_eq!(loader.ref_count(info.id), 2);
        loader.release(info.id);
        loader.release(info.id);
        assert_eq!(loader.ref_count(info.id), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
