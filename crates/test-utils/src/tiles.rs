//! On-disk tile sets: raster tiles, world files and a shapefile index, all
//! inside a temporary directory removed when the [`TileSet`] drops.

use std::fs;
use std::path::{Path, PathBuf};

use shapefile::dbase::{self, FieldName, FieldValue, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use tempfile::TempDir;

use crate::images::solid_image;

/// Bounding box as `(min_x, min_y, max_x, max_y)`.
pub type Bounds = (f64, f64, f64, f64);

/// One record of a generated index.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub bounds: Bounds,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
enum TileEntry {
    Image {
        location: String,
        bounds: Bounds,
        color: [u8; 4],
        size: (u32, u32),
        world_file: bool,
    },
    /// Index record pointing at a file that is never written.
    Missing { location: String, bounds: Bounds },
    /// Index record with an empty path field.
    Blank { bounds: Bounds },
}

/// Builder for a temporary tile set.
#[derive(Debug, Clone)]
pub struct TileSetBuilder {
    index_name: String,
    field_name: String,
    entries: Vec<TileEntry>,
    world_files: bool,
}

impl Default for TileSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSetBuilder {
    pub fn new() -> Self {
        Self {
            index_name: "index.shp".to_string(),
            field_name: "location".to_string(),
            entries: Vec::new(),
            world_files: false,
        }
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Write a world file next to every image tile added after this call.
    pub fn with_world_files(mut self) -> Self {
        self.world_files = true;
        self
    }

    /// A 10x10 solid tile at `location` (relative to the index directory).
    pub fn tile(self, location: &str, bounds: Bounds, color: [u8; 4]) -> Self {
        self.tile_sized(location, bounds, color, 10, 10)
    }

    pub fn tile_sized(
        mut self,
        location: &str,
        bounds: Bounds,
        color: [u8; 4],
        width: u32,
        height: u32,
    ) -> Self {
        let world_file = self.world_files;
        self.entries.push(TileEntry::Image {
            location: location.to_string(),
            bounds,
            color,
            size: (width, height),
            world_file,
        });
        self
    }

    pub fn missing(mut self, location: &str, bounds: Bounds) -> Self {
        self.entries.push(TileEntry::Missing {
            location: location.to_string(),
            bounds,
        });
        self
    }

    pub fn blank(mut self, bounds: Bounds) -> Self {
        self.entries.push(TileEntry::Blank { bounds });
        self
    }

    /// Write everything to a fresh temporary directory.
    pub fn build(self) -> TileSet {
        let dir = TempDir::new().expect("create temp dir");
        let mut records = Vec::with_capacity(self.entries.len());
        let mut images = Vec::new();

        for entry in &self.entries {
            match entry {
                TileEntry::Image {
                    location,
                    bounds,
                    color,
                    size,
                    world_file,
                } => {
                    let path = dir.path().join(location);
                    write_tile_image(&path, *color, size.0, size.1);
                    if *world_file {
                        write_world_file(&world_file_path(&path), *bounds, size.0, size.1);
                    }
                    images.push(path);
                    records.push(IndexRecord {
                        bounds: *bounds,
                        location: Some(location.clone()),
                    });
                }
                TileEntry::Missing { location, bounds } => records.push(IndexRecord {
                    bounds: *bounds,
                    location: Some(location.clone()),
                }),
                TileEntry::Blank { bounds } => records.push(IndexRecord {
                    bounds: *bounds,
                    location: None,
                }),
            }
        }

        let index_path = dir.path().join(&self.index_name);
        write_index(&index_path, &self.field_name, &records);

        TileSet {
            dir,
            index_path,
            field_name: self.field_name,
            images,
        }
    }
}

/// A tile set living in a temporary directory.
#[derive(Debug)]
pub struct TileSet {
    dir: TempDir,
    index_path: PathBuf,
    field_name: String,
    images: Vec<PathBuf>,
}

impl TileSet {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Absolute paths of the written tile images, in insertion order.
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    /// Write an extra file into the set's directory and return its path.
    pub fn write_image(&self, location: &str, color: [u8; 4], width: u32, height: u32) -> PathBuf {
        let path = self.dir.path().join(location);
        write_tile_image(&path, color, width, height);
        path
    }
}

/// Save a solid tile, creating parent directories. The format follows the
/// file extension.
pub fn write_tile_image(path: &Path, color: [u8; 4], width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create tile directory");
    }
    solid_image(width, height, color)
        .save(path)
        .expect("write tile image");
}

/// Sidecar name used by generated tiles: `a.png` -> `a.pgw`.
pub fn world_file_path(image: &Path) -> PathBuf {
    let ext = image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sidecar = match ext.as_str() {
        "png" => "pgw",
        "jpg" | "jpeg" => "jgw",
        "tif" | "tiff" => "tfw",
        _ => "wld",
    };
    image.with_extension(sidecar)
}

/// Write a north-up world file georeferencing a `width` x `height` image
/// over `bounds`. Coefficients are pixel-centre referenced.
pub fn write_world_file(path: &Path, bounds: Bounds, width: u32, height: u32) {
    let (min_x, min_y, max_x, max_y) = bounds;
    let a = (max_x - min_x) / width as f64;
    let e = -(max_y - min_y) / height as f64;
    let c = min_x + a / 2.0;
    let f = max_y + e / 2.0;
    let text = format!("{a}\n0.0\n0.0\n{e}\n{c}\n{f}\n");
    fs::write(path, text).expect("write world file");
}

/// Write a polygon shapefile (`.shp`, `.shx`, `.dbf`) with one character
/// field holding each record's location.
pub fn write_index(path: &Path, field_name: &str, records: &[IndexRecord]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create index directory");
    }

    let field = FieldName::try_from(field_name).expect("valid dBase field name");
    let table = TableWriterBuilder::new().add_character_field(field, 254);
    let mut writer = shapefile::Writer::from_path(path, table).expect("create shapefile");

    for record in records {
        let polygon = footprint_polygon(record.bounds);
        let mut row = dbase::Record::default();
        row.insert(
            field_name.to_string(),
            FieldValue::Character(record.location.clone()),
        );
        writer
            .write_shape_and_record(&polygon, &row)
            .expect("write index record");
    }
}

fn footprint_polygon(bounds: Bounds) -> Polygon {
    let (min_x, min_y, max_x, max_y) = bounds;
    // Outer rings are clockwise in shapefiles.
    Polygon::new(PolygonRing::Outer(vec![
        Point::new(min_x, min_y),
        Point::new(min_x, max_y),
        Point::new(max_x, max_y),
        Point::new(max_x, min_y),
        Point::new(min_x, min_y),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bbox, color};

    #[test]
    fn test_build_writes_files() {
        let set = TileSetBuilder::new()
            .with_world_files()
            .tile("tiles/a.png", bbox::TILE_A, color::RED)
            .missing("tiles/gone.png", bbox::TILE_B)
            .blank(bbox::TILE_C)
            .build();

        assert!(set.index_path().is_file());
        assert!(set.index_path().with_extension("dbf").is_file());
        assert_eq!(set.images().len(), 1);
        assert!(set.images()[0].is_file());
        assert!(set.dir().join("tiles/a.pgw").is_file());
        assert!(!set.dir().join("tiles/gone.png").exists());
    }

    #[test]
    fn test_world_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.pgw");
        write_world_file(&path, (0.0, 0.0, 10.0, 10.0), 100, 100);
        let text = fs::read_to_string(&path).unwrap();
        let values: Vec<f64> = text.lines().map(|l| l.parse().unwrap()).collect();
        let expected = [0.1, 0.0, 0.0, -0.1, 0.05, 9.95];
        assert_eq!(values.len(), expected.len());
        for (got, want) in values.iter().zip(expected) {
            crate::assert_approx_eq!(*got, want, 1e-12);
        }
    }

    #[test]
    fn test_world_file_path() {
        assert_eq!(world_file_path(Path::new("a.png")), PathBuf::from("a.pgw"));
        assert_eq!(world_file_path(Path::new("a.TIF")), PathBuf::from("a.tfw"));
        assert_eq!(world_file_path(Path::new("a.bmp")), PathBuf::from("a.wld"));
    }
}
