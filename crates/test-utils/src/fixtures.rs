//! Common test fixtures for tile-mosaic tests.

/// Common bounding boxes as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Unit-sized tile at the origin, 10 ground units square.
    pub const TILE_A: (f64, f64, f64, f64) = (0.0, 0.0, 10.0, 10.0);

    /// Right-hand neighbour of [`TILE_A`], sharing its east edge.
    pub const TILE_B: (f64, f64, f64, f64) = (10.0, 0.0, 20.0, 10.0);

    /// Tile above [`TILE_A`].
    pub const TILE_C: (f64, f64, f64, f64) = (0.0, 10.0, 10.0, 20.0);

    /// Covers the 2x2 block of tiles at the origin.
    pub const BLOCK: (f64, f64, f64, f64) = (0.0, 0.0, 20.0, 20.0);

    /// Far away from every fixture tile.
    pub const DISJOINT: (f64, f64, f64, f64) = (1000.0, 1000.0, 1010.0, 1010.0);

    /// Projected metres somewhere in UTM.
    pub const UTM_BLOCK: (f64, f64, f64, f64) = (500000.0, 4649000.0, 501000.0, 4650000.0);
}

/// Common colours for generated tiles.
pub mod color {
    pub const RED: [u8; 4] = [255, 0, 0, 255];
    pub const GREEN: [u8; 4] = [0, 255, 0, 255];
    pub const BLUE: [u8; 4] = [0, 0, 255, 255];
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
}
