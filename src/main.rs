//! bitfont - lay out text with a bitmap font and dump the quad batches
//!
//! ```text
//! font path ──→ FontCache ──→ Font
//!                              ↓
//! text bytes ──→ TextLayout ──→ QuadBatch per texture run
//! ```

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::path::Path;

use bitfont::config::Config;
use bitfont::{
    FontCache, FsAssets, HorizAlign, ImageTextureLoader, NamedGames, TextLayout, VertAlign,
};

/// Vertex color used for dumped batches
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Print help message
fn print_help() {
    println!(
        r#"bitfont {} - bitmap font layout tool

USAGE:
    bitfont [OPTIONS] <FONT> <TEXT>

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --config=PATH           Read settings from PATH instead of the default
    --print-config          Print the effective settings as TOML and exit
    --align=ALIGN           left | center | right (default: left)
    --valign=ALIGN          top | middle | bottom (default: top)
    --crop=WIDTH            Crop each line to WIDTH source pixels
    --wrap=WIDTH            Word-wrap lines at WIDTH source pixels
    --charset=CHARS         Map CHARS positionally onto the page frames
    --vertices              Dump batch vertices as well as the summary

TEXT may contain &alias; markers (e.g. &uparrow;) and \n for line breaks.

EXAMPLES:
    bitfont "Fonts/Common normal" "Hello"
    bitfont --align=center --wrap=200 "Fonts/Common normal" "Press &start; to begin"

CONFIG FILE:
    ~/.config/bitfont/config.toml (override with BITFONT_CONFIG)
"#,
        env!("CARGO_PKG_VERSION")
    );
}

fn option_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .find_map(|a| a.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
}

fn parse_width(args: &[String], name: &str) -> Result<Option<i32>> {
    option_value(args, name)
        .map(|v| {
            v.parse::<i32>()
                .with_context(|| format!("{} expects a pixel width, got '{}'", name, v))
        })
        .transpose()
}

fn parse_horiz(value: &str) -> Result<HorizAlign> {
    match value.to_ascii_lowercase().as_str() {
        "left" => Ok(HorizAlign::Left),
        "center" => Ok(HorizAlign::Center),
        "right" => Ok(HorizAlign::Right),
        other => Err(anyhow!("unknown horizontal alignment '{}'", other)),
    }
}

fn parse_vert(value: &str) -> Result<VertAlign> {
    match value.to_ascii_lowercase().as_str() {
        "top" => Ok(VertAlign::Top),
        "middle" => Ok(VertAlign::Middle),
        "bottom" => Ok(VertAlign::Bottom),
        other => Err(anyhow!("unknown vertical alignment '{}'", other)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("bitfont {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = match option_value(&args, "--config") {
        Some(path) => Config::load_from_file(Path::new(path))?,
        None => Config::load(),
    };

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let [font_path, text] = positional.as_slice() else {
        print_help();
        bail!("expected <FONT> and <TEXT>");
    };

    let horiz = option_value(&args, "--align").map_or(Ok(HorizAlign::Left), parse_horiz)?;
    let vert = option_value(&args, "--valign").map_or(Ok(VertAlign::Top), parse_vert)?;
    let crop = parse_width(&args, "--crop")?;
    let wrap = parse_width(&args, "--wrap")?;
    let charset = option_value(&args, "--charset");
    let dump_vertices = args.iter().any(|a| a == "--vertices");

    let mut cache = FontCache::new(
        cfg.fonts.clone(),
        Box::new(FsAssets),
        Box::new(ImageTextureLoader::new()),
        Box::new(NamedGames::from_config(&cfg.games)),
    );
    let handle = cache
        .load_font(font_path.as_str(), charset)
        .with_context(|| format!("Failed to load font '{}'", font_path))?;

    let text = cache.aliases().replace_markers(&text.replace("\\n", "\n"));
    let font = cache.font(handle)?;
    let mut layout = TextLayout::new();
    layout.set_text(font, text.as_bytes());
    if let Some(width) = wrap {
        layout.wrap_to_width(font, width);
    }
    if let Some(width) = crop {
        layout.crop_to_width(font, width);
    }
    layout.build(font, horiz, vert);

    info!(
        "Laid out {} line(s), {} quad(s)",
        layout.lines().len(),
        layout.quads().len()
    );
    println!(
        "font: {} ({} page(s), {} glyph(s))",
        font.path().display(),
        font.pages().len(),
        font.mapped_count()
    );
    println!(
        "size: {}x{} ({} line(s))",
        layout.max_width(),
        layout.total_height(),
        layout.lines().len()
    );
    if layout.dropped_units() > 0 {
        println!("dropped: {} malformed UTF-8 unit(s)", layout.dropped_units());
    }
    for (i, batch) in layout.batches(WHITE).iter().enumerate() {
        println!(
            "batch {}: texture {} x{} quad(s)",
            i, batch.texture.0, batch.quad_count
        );
        if dump_vertices {
            for vertex in batch.vertices.chunks(bitfont::text::VERTEX_FLOATS) {
                println!("  {:?}", vertex);
            }
        }
    }

    cache.unload_font(handle)?;
    Ok(())
}
