//! bitfont - bitmap font cache and text layout
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  FontCache (handles, refcounts, imports) │
//! │                  ↓                       │
//! │  Font → FontPage → Glyph metrics         │
//! │                  ↓                       │
//! │  TextLayout (UTF-8 → lines → quads)      │
//! │                  ↓                       │
//! │  QuadBatch (per-texture vertex runs)     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! File access, texture decode and game names come from the host through
//! the traits in [`assets`].

pub mod assets;
pub mod config;
pub mod constants;
pub mod error;
pub mod font;
pub mod text;

pub use assets::{
    AssetSource, FsAssets, GameResolver, ImageTextureLoader, MemoryAssets, NamedGames, TextureId,
    TextureInfo, TextureLoader,
};
pub use config::Config;
pub use error::{ConfigError, FontError};
pub use font::{Font, FontCache, FontHandle, Glyph};
pub use text::{HorizAlign, QuadBatch, TextLayout, VertAlign};
