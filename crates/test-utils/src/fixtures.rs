//! Common tile indices and bucket sequences used across tests.

use binning_common::TileIndex;

/// Tile index fixtures.
pub mod tiles {
    use super::TileIndex;

    /// The single level-0 tile with a 256x256 grid.
    pub const ROOT_256: TileIndex = TileIndex {
        level: 0,
        x: 0,
        y: 0,
        x_bins: 256,
        y_bins: 256,
    };

    /// Level-0 tile with a small 8x8 grid.
    pub const ROOT_8: TileIndex = TileIndex {
        level: 0,
        x: 0,
        y: 0,
        x_bins: 8,
        y_bins: 8,
    };

    /// A level-2 tile away from the origin with a 4x4 grid.
    pub const LEVEL_2_4X4: TileIndex = TileIndex {
        level: 2,
        x: 1,
        y: 1,
        x_bins: 4,
        y_bins: 4,
    };

    /// A non-square grid at level 3.
    pub const LEVEL_3_WIDE: TileIndex = TileIndex {
        level: 3,
        x: 5,
        y: 2,
        x_bins: 16,
        y_bins: 8,
    };
}

/// Bucket sequence fixtures.
pub mod buckets {
    /// A short sequence with a known window average of 7 over buckets 1..=2.
    pub const SHORT: [i32; 4] = [3, 5, 9, 1];

    /// Thirty daily counts.
    pub const MONTH: [u32; 30] = [
        4, 8, 15, 16, 23, 42, 4, 8, 15, 16, 23, 42, 4, 8, 15, 16, 23, 42, 4, 8, 15, 16, 23, 42, 4,
        8, 15, 16, 23, 42,
    ];
}
