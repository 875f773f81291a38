//! Tests for the CLI commands against tile sets on disk.

use map_common::BoundingBox;
use mosaic_render::commands;
use test_utils::{bbox, color, count_pixels, TileSetBuilder};
use tile_index::{SkipReason, TileIndexConfig};

fn config_for(set: &test_utils::TileSet) -> TileIndexConfig {
    let path = set.dir().join("mosaic.yaml");
    std::fs::write(&path, "name: mosaic\nindex_path: index.shp\n").unwrap();
    TileIndexConfig::from_yaml_file(&path).unwrap()
}

#[test]
fn test_render_writes_png() {
    let set = TileSetBuilder::new()
        .tile("a.png", bbox::TILE_A, color::RED)
        .tile("b.png", bbox::TILE_B, color::GREEN)
        .build();
    let output = set.dir().join("out.png");

    let report = commands::render(
        config_for(&set),
        BoundingBox::new(0.0, 0.0, 20.0, 10.0),
        20,
        10,
        &output,
    )
    .unwrap();
    assert_eq!(report.drawn, 2);

    let written = image::open(&output).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (20, 10));
    assert_eq!(count_pixels(&written, color::RED), 100);
    assert_eq!(count_pixels(&written, color::GREEN), 100);
}

#[test]
fn test_render_rejects_empty_frame() {
    let set = TileSetBuilder::new()
        .tile("a.png", bbox::TILE_A, color::RED)
        .build();
    let output = set.dir().join("out.png");

    let result = commands::render(
        config_for(&set),
        BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        0,
        10,
        &output,
    );
    assert!(result.is_err());
    assert!(!output.exists());
}

#[test]
fn test_tiles_lists_resolved_and_skipped() {
    let set = TileSetBuilder::new()
        .tile("a.png", bbox::TILE_A, color::RED)
        .missing("gone.png", bbox::TILE_B)
        .build();

    let listing = commands::tiles(config_for(&set), BoundingBox::new(0.0, 0.0, 20.0, 20.0)).unwrap();

    assert_eq!(listing.tiles.len(), 1);
    assert_eq!(listing.tiles[0].path, set.images()[0]);
    assert_eq!(listing.skipped.len(), 1);
    assert!(matches!(listing.skipped[0].reason, SkipReason::FileNotFound(_)));
    assert!(listing.failed.is_empty());

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["tiles"][0]["footprint_id"], 0);
    assert_eq!(json["bbox"]["max_x"], 20.0);
}

#[test]
fn test_extent_is_union_of_footprints() {
    let set = TileSetBuilder::new()
        .tile("a.png", bbox::TILE_A, color::RED)
        .tile("c.png", bbox::TILE_C, color::BLUE)
        .build();

    let extent = commands::extent(config_for(&set)).unwrap();
    assert_eq!(extent, Some(BoundingBox::new(0.0, 0.0, 10.0, 20.0)));
}

#[test]
fn test_missing_index_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = TileIndexConfig::new("nothing", dir.path().join("absent.shp"));

    let err = commands::extent(config).unwrap_err();
    assert!(err.to_string().contains("failed to open tile index"));
}
