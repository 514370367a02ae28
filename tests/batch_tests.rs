mod common;

use ember2d::{Batch, Color, Patch, Rect, Vec2};

fn batch(max: usize) -> Batch {
    Batch::new(Vec2::new(64.0, 64.0), max)
}

const SRC: Rect = Rect::new(0.0, 0.0, 64.0, 64.0);

#[test]
fn n_adds_draw_exactly_6n_vertices() {
    let mut batch = batch(8);
    for i in 0..5 {
        assert_eq!(batch.vertex_count(), (i * 6) as u32);
        batch.add(SRC, Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    }
    assert_eq!(batch.quads(), 5);
    assert_eq!(batch.vertex_count(), 30);
}

#[test]
fn overflow_draws_are_silently_dropped() {
    let mut batch = batch(4);
    for _ in 0..9 {
        batch.add(SRC, Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    }
    // capacity + k adds still draw exactly 6 * capacity vertices
    assert_eq!(batch.quads(), 4);
    assert_eq!(batch.vertex_count(), 24);
}

#[test]
fn clear_resets_count_without_touching_capacity() {
    let mut batch = batch(4);
    batch.add(SRC, Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    batch.clear();
    assert_eq!(batch.vertex_count(), 0);
    for _ in 0..4 {
        batch.add(SRC, Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    }
    assert_eq!(batch.quads(), 4);
}

#[test]
fn quad_triangles_are_ccw_from_bottom_left() {
    let mut batch = batch(1);
    batch.push_quad(SRC, 1.0, 2.0, 11.0, 22.0, Color::WHITE);
    let pos = batch.position_data();
    // BL, BR, TL / BR, TR, TL
    assert_eq!(
        pos,
        &[
            1.0, 2.0, 11.0, 2.0, 1.0, 22.0, //
            11.0, 2.0, 11.0, 22.0, 1.0, 22.0,
        ]
    );
}

#[test]
fn uvs_are_normalized_and_flippable() {
    let mut batch = batch(2);
    let src = Rect::new(16.0, 16.0, 32.0, 32.0);
    batch.add(src, Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    let uv = batch.uv_data();
    // BL samples the far texel row (texel rows run top-down).
    assert_eq!(&uv[0..2], &[0.25, 0.75]);
    // TR samples the near row.
    assert_eq!(&uv[8..10], &[0.75, 0.25]);

    batch.add(src.flipped(true, false), Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    let uv = batch.uv_data();
    // Horizontal flip swaps u on the second quad.
    assert_eq!(&uv[12..14], &[0.75, 0.75]);
}

#[test]
fn colors_are_written_per_vertex() {
    let mut batch = batch(1);
    batch.add(SRC, Rect::new(0.0, 0.0, 1.0, 1.0), Color::rgba(1, 2, 3, 4));
    let colors = batch.color_data();
    assert_eq!(colors.len(), 24);
    for vertex in colors.chunks(4) {
        assert_eq!(vertex, &[1, 2, 3, 4]);
    }
}

#[test]
fn add_at_centres_a_source_sized_quad() {
    let mut batch = batch(1);
    batch.add_at(Rect::new(0.0, 0.0, 10.0, 20.0), Vec2::new(50.0, 50.0), Color::WHITE);
    let pos = batch.position_data();
    assert_eq!(&pos[0..2], &[45.0, 40.0]); // BL
    assert_eq!(&pos[8..10], &[55.0, 60.0]); // TR
}

#[test]
fn patch_expands_to_exactly_nine_quads() {
    let mut batch = batch(16);
    let patch = Patch::new(Rect::new(0.0, 0.0, 12.0, 12.0), 4.0).unwrap();
    batch.add_patch(&patch, Rect::new(0.0, 0.0, 20.0, 20.0), Color::WHITE);
    assert_eq!(batch.quads(), 9);

    // Centre cell stretches to fill everything between the fixed corners.
    let pos = batch.position_data();
    let centre = &pos[4 * 12..4 * 12 + 12];
    assert_eq!(&centre[0..2], &[4.0, 4.0]);
    assert_eq!(&centre[8..10], &[16.0, 16.0]);

    // Corner cells keep their border size.
    let bottom_left = &pos[0..12];
    assert_eq!(&bottom_left[0..2], &[0.0, 0.0]);
    assert_eq!(&bottom_left[8..10], &[4.0, 4.0]);
    let top_right = &pos[8 * 12..8 * 12 + 12];
    assert_eq!(&top_right[0..2], &[16.0, 16.0]);
    assert_eq!(&top_right[8..10], &[20.0, 20.0]);
}

#[test]
fn text_lays_out_with_kerning_and_skips_unknown_glyphs() {
    let font = common::test_font();
    let mut batch = batch(16);

    // 'A' then 'V' with kerning -2: V's quad starts at 7 - 2 + xoffset 1.
    batch.add_text("AV", Vec2::new(0.0, 16.0), &font, Color::WHITE);
    assert_eq!(batch.quads(), 2);
    let pos = batch.position_data();
    assert_eq!(pos[0], 0.0);
    // baseline = 16 - base 13 = 3; A's offset.y = -4 + 13 - 9 = 0
    assert_eq!(pos[1], 3.0);
    assert_eq!(pos[12], 6.0);

    // Unknown glyphs are skipped without advancing.
    batch.clear();
    batch.add_text("AZB", Vec2::new(0.0, 16.0), &font, Color::WHITE);
    assert_eq!(batch.quads(), 2);
    let pos = batch.position_data();
    assert_eq!(pos[12], 7.0); // B directly after A's advance

    // Spaces advance the cursor but spend no quad.
    batch.clear();
    batch.add_text("A B", Vec2::new(0.0, 16.0), &font, Color::WHITE);
    assert_eq!(batch.quads(), 2);
    let pos = batch.position_data();
    assert_eq!(pos[12], 11.0); // 7 (A) + 4 (space)
}

#[test]
fn newline_resets_cursor_and_drops_a_line() {
    let font = common::test_font();
    let mut batch = batch(16);
    batch.add_text("A\nB", Vec2::new(10.0, 32.0), &font, Color::WHITE);
    assert_eq!(batch.quads(), 2);
    let pos = batch.position_data();
    // Both glyphs start at the same x; the second baseline is one
    // line height lower.
    assert_eq!(pos[0], 10.0);
    assert_eq!(pos[12], 10.0);
    assert_eq!(pos[1] - pos[13], 16.0);
}
