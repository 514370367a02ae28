mod common;

use ember2d::{Font, Rect, Vec2};

#[test]
fn parses_metrics_and_records() {
    let font = Font::parse(common::FONT_DESC).unwrap();
    assert_eq!(font.size(), 16.0);
    assert_eq!(font.line_height(), 16.0);
    assert_eq!(font.base(), 13.0);
    assert!(font.glyph('A').is_some());
    assert!(font.glyph('Z').is_none());
}

#[test]
fn glyph_offset_converts_to_bottom_up_space() {
    let font = Font::parse(common::FONT_DESC).unwrap();
    let a = font.glyph('A').unwrap();
    assert_eq!(a.src, Rect::new(1.0, 1.0, 6.0, 9.0));
    // -yoffset + base - height = -4 + 13 - 9
    assert_eq!(a.offset, Vec2::new(0.0, 0.0));
    assert_eq!(a.advance, 7.0);

    let v = font.glyph('V').unwrap();
    assert_eq!(v.offset.x, 1.0);
}

#[test]
fn kerning_defaults_to_zero_for_unlisted_pairs() {
    let font = Font::parse(common::FONT_DESC).unwrap();
    let a = font.glyph('A').unwrap();
    assert_eq!(a.kern('V'), -2.0);
    assert_eq!(a.kern('B'), 0.0);
    let b = font.glyph('B').unwrap();
    assert_eq!(b.kern('V'), 0.0);
}

#[test]
fn measure_includes_kerning_and_skips_unknown() {
    let font = Font::parse(common::FONT_DESC).unwrap();
    assert_eq!(font.measure("AB"), 14.0);
    assert_eq!(font.measure("AV"), 12.0); // 7 - 2 + 7
    assert_eq!(font.measure("AZB"), 14.0); // Z contributes nothing
    assert_eq!(font.measure(""), 0.0);
}

#[test]
fn wrap_breaks_greedily_and_keeps_wide_words() {
    let font = Font::parse(common::FONT_DESC).unwrap();
    // measure("A A") = 18, measure("A A A") = 29
    assert_eq!(font.wrap("A A A", 20.0), vec!["A A", "A"]);
    assert_eq!(font.wrap("A A A", 40.0), vec!["A A A"]);
    // A word wider than the line still gets its own line.
    assert_eq!(font.wrap("AAAA A", 10.0), vec!["AAAA", "A"]);
    // Embedded newlines start fresh lines.
    assert_eq!(font.wrap("A\nA A", 40.0), vec!["A", "A A"]);
}

#[test]
fn offset_by_shifts_glyph_sources_for_atlas_packing() {
    let mut font = Font::parse(common::FONT_DESC).unwrap();
    let before = font.glyph('A').unwrap().src;
    font.offset_by(100.0, 200.0);
    let after = font.glyph('A').unwrap().src;
    assert_eq!(after.pos, Vec2::new(before.pos.x + 100.0, before.pos.y + 200.0));
    assert_eq!(after.size, before.size);
}

#[test]
fn missing_common_record_is_an_error() {
    assert!(Font::parse("info size=16\nchar id=65 x=0 y=0 width=1 height=1 xoffset=0 yoffset=0 xadvance=1").is_err());
}

#[test]
fn malformed_records_are_skipped_not_fatal() {
    let desc = "\
common lineHeight=16 base=13
char id=65 x=1 y=1 width=6 height=9 xoffset=0 yoffset=4 xadvance=7
char id=banana x=0
kerning first=65 second=9999999999 amount=1
";
    let font = Font::parse(desc).unwrap();
    assert!(font.glyph('A').is_some());
}
