mod common;

use ember2d::{Atlas, Patch, Rect};

#[test]
fn manifest_round_trips_exact_values() {
    let atlas = Atlas::from_manifest(common::MANIFEST).unwrap();
    assert_eq!(atlas.get("a"), Rect::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(atlas.len(), 4);
}

#[test]
fn missing_sprite_degrades_to_the_zero_rect() {
    let atlas = Atlas::from_manifest(common::MANIFEST).unwrap();
    assert_eq!(atlas.get("missing"), Rect::ZERO);
}

#[test]
fn malformed_manifest_is_an_error() {
    assert!(Atlas::from_manifest("not json").is_err());
    assert!(Atlas::from_manifest(r#"{"a": {"x": 1}}"#).is_err());
}

#[test]
fn added_sprites_are_retrievable() {
    let mut atlas = Atlas::new();
    atlas.add("late", Rect::new(5.0, 6.0, 7.0, 8.0));
    assert!(atlas.contains("late"));
    assert_eq!(atlas.get("late"), Rect::new(5.0, 6.0, 7.0, 8.0));
}

#[test]
fn patch_border_comes_from_trailing_digits() {
    let atlas = Atlas::from_manifest(common::MANIFEST).unwrap();
    let patch = atlas.patch("panel4", None).unwrap();
    assert_eq!(patch.border(), 4.0);
    let patch = atlas.patch("button2", None).unwrap();
    assert_eq!(patch.border(), 2.0);
}

#[test]
fn explicit_border_wins_over_the_name() {
    let atlas = Atlas::from_manifest(common::MANIFEST).unwrap();
    let patch = atlas.patch("panel4", Some(2.0)).unwrap();
    assert_eq!(patch.border(), 2.0);
}

#[test]
fn digitless_name_falls_back_to_border_one() {
    let mut atlas = Atlas::new();
    atlas.add("plain", Rect::new(0.0, 0.0, 8.0, 8.0));
    let patch = atlas.patch("plain", None).unwrap();
    assert_eq!(patch.border(), 1.0);
}

#[test]
fn oversized_border_fails_construction_loudly() {
    let mut atlas = Atlas::new();
    atlas.add("tight8", Rect::new(0.0, 0.0, 12.0, 12.0));
    assert!(atlas.patch("tight8", None).is_err());
}

#[test]
fn patch_cells_partition_the_source() {
    let src = Rect::new(4.0, 8.0, 24.0, 20.0);
    let patch = Patch::new(src, 5.0).unwrap();

    let area: f32 = patch.cells().iter().map(|c| c.size.x * c.size.y).sum();
    assert_eq!(area, 24.0 * 20.0);

    // Every cell stays inside the source rect.
    for cell in patch.cells() {
        assert!(cell.pos.x >= src.pos.x && cell.right() <= src.right());
        assert!(cell.pos.y >= src.pos.y && cell.top() <= src.top());
    }

    // Corners are exactly border-sized.
    assert_eq!(patch.cell(0, 0).size, ember2d::Vec2::new(5.0, 5.0));
    assert_eq!(patch.cell(2, 2).size, ember2d::Vec2::new(5.0, 5.0));
    // The centre is what remains.
    assert_eq!(patch.cell(1, 1).size, ember2d::Vec2::new(14.0, 10.0));
}
