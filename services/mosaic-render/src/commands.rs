//! The three things the CLI can do with a tile index.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use map_common::{BoundingBox, MapLayer, Viewport};
use serde::Serialize;
use tile_index::{
    RenderReport, ResolvedTile, SkippedTile, TileIndexConfig, TileIndexLayer,
};
use tracing::info;

/// A tile that could not be georeferenced, in printable form.
#[derive(Debug, Clone, Serialize)]
pub struct FailedTile {
    pub footprint_id: usize,
    pub path: PathBuf,
    pub error: String,
}

/// JSON output of the `tiles` command.
#[derive(Debug, Serialize)]
pub struct TileListing {
    pub bbox: BoundingBox,
    pub tiles: Vec<ResolvedTile>,
    pub skipped: Vec<SkippedTile>,
    pub failed: Vec<FailedTile>,
}

fn open_layer(config: TileIndexConfig) -> Result<TileIndexLayer> {
    let index = config.index_path.clone();
    TileIndexLayer::open(config)
        .with_context(|| format!("failed to open tile index {}", index.display()))
}

/// Render `bbox` into a `width` x `height` image written to `output`.
pub fn render(
    config: TileIndexConfig,
    bbox: BoundingBox,
    width: u32,
    height: u32,
    output: &Path,
) -> Result<RenderReport> {
    let layer = open_layer(config)?;
    let viewport = Viewport::new(bbox, width, height).context("invalid viewport")?;

    let mut surface = RgbaImage::new(width, height);
    let report = layer
        .render_tiles(&mut surface, &viewport)
        .context("render failed")?;

    surface
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        output = %output.display(),
        drawn = report.drawn,
        placeholders = report.placeholders,
        skipped = report.skipped,
        failed = report.failed,
        "Rendered mosaic"
    );
    Ok(report)
}

/// Resolve `bbox` to tiles without decoding any image.
pub fn tiles(config: TileIndexConfig, bbox: BoundingBox) -> Result<TileListing> {
    let layer = open_layer(config)?;
    let resolution = layer.resolve(&bbox).context("tile query failed")?;

    Ok(TileListing {
        bbox,
        tiles: resolution.tiles,
        skipped: resolution.skipped,
        failed: resolution
            .failed
            .into_iter()
            .map(|f| FailedTile {
                footprint_id: f.footprint_id,
                path: f.path,
                error: f.error.to_string(),
            })
            .collect(),
    })
}

/// Union of all footprints, `None` for an empty index.
pub fn extent(config: TileIndexConfig) -> Result<Option<BoundingBox>> {
    let layer = open_layer(config)?;
    Ok(layer.envelope())
}
