//! Font cache behavior through the public API

mod common;

use bitfont::error::{ConfigError, FontError};
use bitfont::font::make_game_glyph;
use bitfont::MemoryAssets;

use common::{cache, cache_with_default};

#[test]
fn test_import_recursion_is_reported() {
    let assets = MemoryAssets::new()
        .with("Fonts/A 16x16.png", "")
        .with("Fonts/A.ini", "[main]\nimport=B\n")
        .with("Fonts/B 16x16.png", "")
        .with("Fonts/B.ini", "[main]\nimport=A\n");
    let (mut cache, ledger) = cache(assets);

    match cache.load_font("Fonts/A", None) {
        Err(FontError::ImportRecursion { chain }) => {
            assert_eq!(chain, vec!["fonts/a", "fonts/b", "fonts/a"]);
        }
        other => panic!("expected import recursion, got {:?}", other.map(|_| ())),
    }
    assert!(cache.is_empty());
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_repeated_load_shares_font_until_last_unload() {
    let (mut cache, ledger) = cache(MemoryAssets::new().with("Fonts/Normal 16x16.png", ""));

    let first = cache.load_font("Fonts/Normal", None).unwrap();
    let second = cache.load_font("Fonts/Normal", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.ref_count(first), 2);
    assert_eq!(ledger.loads(), 1);

    cache.unload_font(first).unwrap();
    assert!(cache.font(first).is_ok());
    cache.unload_font(second).unwrap();
    assert!(cache.font(first).is_err());
    assert!(matches!(
        cache.unload_font(first),
        Err(FontError::UnknownFontHandle)
    ));
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_local_definition_overrides_import() {
    let assets = MemoryAssets::new()
        .with("Fonts/Base 16x16.png", "")
        .with("Fonts/Local 4x1.png", "")
        .with("Fonts/Local.ini", "[main]\nimport=Base\nmap U+0041=2\n");
    let (mut cache, ledger) = cache(assets);

    let handle = cache.load_font("Fonts/Local", None).unwrap();
    let font = cache.font(handle).unwrap();
    let pages = font.pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(font.glyph('A' as u32).unwrap().texture, pages[1].texture());
    assert_eq!(font.glyph('B' as u32).unwrap().texture, pages[0].texture());

    // The import itself is not kept in the cache, only its pages
    assert_eq!(cache.len(), 1);
    assert_eq!(ledger.refs("Fonts/Base 16x16.png"), 1);

    cache.unload_font(handle).unwrap();
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_default_font_is_merged_first() {
    let assets = MemoryAssets::new()
        .with("Fonts/Common default 16x8.png", "")
        .with("Fonts/Title 2x1.png", "")
        .with("Fonts/Title.ini", "[main]\nmap U+0041=1\n");
    let (mut cache, ledger) = cache_with_default(assets, "Common default");

    let title = cache.load_font("Fonts/Title", None).unwrap();
    let font = cache.font(title).unwrap();
    assert_eq!(font.pages().len(), 2);
    assert_eq!(font.glyph('A' as u32).unwrap().texture, font.pages()[1].texture());
    assert_eq!(font.glyph('z' as u32).unwrap().texture, font.pages()[0].texture());

    let default = cache.load_font("Fonts/Common default", None).unwrap();
    assert_eq!(cache.font(default).unwrap().pages().len(), 1);

    cache.unload_font(title).unwrap();
    cache.unload_font(default).unwrap();
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_missing_default_font_is_skipped() {
    let (mut cache, _ledger) =
        cache_with_default(MemoryAssets::new().with("Fonts/Title 16x8.png", ""), "Common default");
    let handle = cache.load_font("Fonts/Title", None).unwrap();
    assert_eq!(cache.font(handle).unwrap().pages().len(), 1);
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_ascii_identity_for_128_frames() {
    let (mut cache, _ledger) = cache(MemoryAssets::new().with("Fonts/Ascii 16x8.png", ""));
    let handle = cache.load_font("Fonts/Ascii", None).unwrap();
    let font = cache.font(handle).unwrap();
    assert_eq!(font.pages()[0].frame_for(65), Some(65));
    // ASCII plus NBSP sharing the space frame
    assert_eq!(font.mapped_count(), 129);
    assert_eq!(font.pages()[0].frame_for(0xA0), Some(0x20));
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_capitals_only() {
    let assets = MemoryAssets::new()
        .with("Fonts/Caps 16x8.png", "")
        .with("Fonts/Caps.ini", "[main]\nCapitalsOnly=1\n");
    let (mut cache, _ledger) = cache(assets);
    let handle = cache.load_font("Fonts/Caps", None).unwrap();
    let font = cache.font(handle).unwrap();
    assert!(font.capitals_only());
    assert_eq!(
        font.glyph('a' as u32).unwrap().texture_rect,
        font.glyph('A' as u32).unwrap().texture_rect
    );
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_capitals_only_keeps_lowercase_only_mapping() {
    let assets = MemoryAssets::new()
        .with("Fonts/Mixed 4x1.png", "")
        .with("Fonts/Mixed.ini", "[main]\nCapitalsOnly=1\nmap U+0061=1\nmap U+0042=2\n");
    let (mut cache, _ledger) = cache(assets);
    let handle = cache.load_font("Fonts/Mixed", None).unwrap();
    let font = cache.font(handle).unwrap();
    let page = &font.pages()[0];

    assert_eq!(page.frame_for('a' as u32), Some(1));
    assert_eq!(
        font.glyph('a' as u32).unwrap().texture_rect,
        page.glyph(1).texture_rect
    );
    assert_eq!(
        font.glyph('b' as u32).unwrap().texture_rect,
        page.glyph(2).texture_rect
    );
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_lookalike_font_is_not_absorbed() {
    let assets = MemoryAssets::new()
        .with("Fonts/Normal 16x8.png", "")
        .with("Fonts/Normal2 16x8.png", "")
        .with("Fonts/Normal bold 16x8.png", "");
    let (mut cache, ledger) = cache(assets);
    let handle = cache.load_font("Fonts/Normal", None).unwrap();
    assert_eq!(cache.font(handle).unwrap().pages().len(), 1);
    assert_eq!(ledger.loads(), 1);
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_tagged_pages_use_their_own_section() {
    let assets = MemoryAssets::new()
        .with("Fonts/Multi 4x1.png", "")
        .with("Fonts/Multi [alt] 4x1.png", "")
        .with(
            "Fonts/Multi.ini",
            "[common]\nAddToAllWidths=-2\n\n[main]\nmap U+0041=0\n\n[alt]\nLineSpacing=24\nmap U+0042=1\n",
        );
    let (mut cache, _ledger) = cache(assets);
    let handle = cache.load_font("Fonts/Multi", None).unwrap();
    let font = cache.font(handle).unwrap();

    let tags: Vec<&str> = font.pages().iter().map(|p| p.tag()).collect();
    assert_eq!(tags, vec!["main", "alt"]);
    assert_eq!(font.glyph('A' as u32).unwrap().horizontal_advance, 8);
    assert_eq!(font.line_height(&['A' as u32]), 16);
    assert_eq!(font.line_height(&['A' as u32, 'B' as u32]), 24);
    assert_eq!(font.glyph('B' as u32).unwrap().vertical_shift, 4);
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_explicit_character_set() {
    let (mut cache, ledger) = cache(MemoryAssets::new().with("Fonts/Digits 4x1.png", ""));

    let handle = cache.load_font("Fonts/Digits", Some("0123")).unwrap();
    let font = cache.font(handle).unwrap();
    assert_eq!(font.pages()[0].frame_for('2' as u32), Some(2));
    assert!(font.glyph('A' as u32).is_none());
    cache.unload_font(handle).unwrap();

    assert!(matches!(
        cache.load_font("Fonts/Digits", Some("01234")),
        Err(FontError::FrameCountMismatch {
            frame_count: 4,
            required: 5,
            ..
        })
    ));
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_config_errors_abort_the_load() {
    let assets = MemoryAssets::new()
        .with("Fonts/Range 4x1.png", "")
        .with("Fonts/Range.ini", "[main]\nmap U+0041=9\n")
        .with("Fonts/Chess 4x1.png", "")
        .with("Fonts/Chess.ini", "[main]\nmap chess up=0\n")
        .with("Fonts/Alias 4x1.png", "")
        .with("Fonts/Alias.ini", "[main]\nmap nosuchalias=0\n");
    let (mut cache, ledger) = cache(assets);

    assert!(matches!(
        cache.load_font("Fonts/Range", None),
        Err(FontError::FrameOutOfRange { frame: 9, frame_count: 4, .. })
    ));
    assert!(matches!(
        cache.load_font("Fonts/Chess", None),
        Err(FontError::Config(ConfigError::UnknownGameType(_)))
    ));
    assert!(matches!(
        cache.load_font("Fonts/Alias", None),
        Err(FontError::Config(ConfigError::UnknownAlias(_)))
    ));
    assert!(cache.is_empty());
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_oversized_frame_grid_is_rejected() {
    let (mut cache, ledger) = cache(MemoryAssets::new().with("Fonts/Huge 70000x70000.png", ""));
    assert!(matches!(
        cache.load_font("Fonts/Huge", None),
        Err(FontError::Texture { .. })
    ));
    assert!(cache.is_empty());
    assert_eq!(ledger.live(), 0);
}

#[test]
fn test_game_scoped_mapping() {
    let assets = MemoryAssets::new()
        .with("Fonts/Buttons 4x1.png", "")
        .with("Fonts/Buttons.ini", "[main]\nmap pump start=3\nmap start=1\n");
    let (mut cache, _ledger) = cache(assets);
    let handle = cache.load_font("Fonts/Buttons", None).unwrap();
    let start = cache.aliases().resolve_alias("start").unwrap();
    let font = cache.font(handle).unwrap();
    let page = &font.pages()[0];
    assert_eq!(page.frame_for(make_game_glyph(start, 1).unwrap()), Some(3));
    assert_eq!(page.frame_for(start), Some(1));
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_empty_font_still_loads() {
    let (mut cache, _ledger) = cache(MemoryAssets::new().with("Fonts/Blank 3x1.png", ""));
    let handle = cache.load_font("Fonts/Blank", None).unwrap();
    assert!(cache.font(handle).unwrap().is_empty());
    cache.unload_font(handle).unwrap();
}

#[test]
fn test_teardown_releases_leaked_fonts() {
    let (mut cache, ledger) = cache(MemoryAssets::new().with("Fonts/Leaky 16x8.png", ""));
    cache.load_font("Fonts/Leaky", None).unwrap();
    assert_eq!(ledger.live(), 1);
    drop(cache);
    assert_eq!(ledger.live(), 0);
}
