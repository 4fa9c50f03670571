//! Configuration file management
//!
//! Loads the TOML settings for the font subsystem (font root, implicit
//! default font, recognized page extensions, game names).
//! Default config path: ~/.config/bitfont/config.toml
//!
//! Per-font `.ini` files are read by [`ini`].

pub mod ini;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Font lookup settings
    pub fonts: FontsConfig,
    /// Game type settings (for game-scoped glyph specs)
    pub games: GamesConfig,
}

/// Font lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Directory that `import=` names are resolved against
    pub root: PathBuf,
    /// Font imported implicitly by every other font (empty = none)
    pub default_font: String,
    /// File extensions recognized as page textures
    pub texture_extensions: Vec<String>,
    /// File extension of the font settings file
    pub config_extension: String,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Fonts"),
            default_font: "Common default".to_string(),
            texture_extensions: ["png", "jpg", "jpeg", "bmp", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            config_extension: "ini".to_string(),
        }
    }
}

impl FontsConfig {
    /// Path of the implicit default font, if one is configured
    pub fn default_font_path(&self) -> Option<PathBuf> {
        let name = self.default_font.trim();
        if name.is_empty() {
            None
        } else {
            Some(self.root.join(name))
        }
    }

    /// Whether `ext` (without dot) names a page texture
    pub fn is_texture_extension(&self, ext: &str) -> bool {
        self.texture_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Game type settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    /// Game names; a game's id is its position in this list
    pub names: Vec<String>,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            names: ["dance", "pump", "kb7", "ez2", "para", "ds3ddx", "beat", "maniax", "techno", "popn", "lights", "kickbox"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/bitfont/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. BITFONT_CONFIG environment variable
        if let Ok(path) = std::env::var("BITFONT_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/bitfont/config.toml
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        // 3. System config
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. BITFONT_CONFIG environment variable
    /// 2. ~/.config/bitfont/config.toml (user config)
    /// 3. /etc/bitfont/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize settings (for template generation)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bitfont").join("config.toml"))
}
