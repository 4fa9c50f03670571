//! Error types for font loading and cache bookkeeping

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while interpreting a font `.ini` section
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown character alias '{0}'")]
    UnknownAlias(String),

    #[error("malformed codepoint escape '{0}'")]
    MalformedEscape(String),

    #[error("unknown game type '{0}'")]
    UnknownGameType(String),

    #[error("cannot tag codepoint {codepoint:#x} with game id {game_id}")]
    UntaggableGameGlyph { codepoint: u32, game_id: u8 },

    #[error("invalid entry in [{section}]: '{key}={value}'")]
    InvalidEntry {
        section: String,
        key: String,
        value: String,
    },
}

/// Errors raised by font loading and the font cache
#[derive(Debug, Error)]
pub enum FontError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("frame {frame} out of range in page '{page}' ({frame_count} frames)")]
    FrameOutOfRange {
        page: String,
        frame: usize,
        frame_count: usize,
    },

    #[error("page '{page}' has {frame_count} frames, character set needs {required}")]
    FrameCountMismatch {
        page: String,
        frame_count: usize,
        required: usize,
    },

    #[error("font import recursion: {}", chain.join(" -> "))]
    ImportRecursion { chain: Vec<String> },

    #[error("unload of a font handle the cache does not track")]
    UnknownFontHandle,

    #[error("no font pages found for '{}'", .0.display())]
    NoPages(PathBuf),

    #[error("failed to load texture '{}': {message}", path.display())]
    Texture { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = FontError> = std::result::Result<T, E>;
