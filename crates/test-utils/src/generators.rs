//! Tile generators with predictable bin contents.
//!
//! Values are derived from bin coordinates so a test can tell from a value
//! alone which source bin it came from.

use binning_common::{DenseTileData, TileIndex};

/// Creates a tile whose bins hold `x * 1000 + y`.
///
/// # Example
///
/// ```
/// use binning_common::{TileData, TileIndex};
/// use test_utils::create_ramp_tile;
///
/// let tile = create_ramp_tile(TileIndex::new(0, 0, 0, 4, 4));
/// assert_eq!(tile.bin(0, 0).unwrap(), 0.0);
/// assert_eq!(tile.bin(1, 0).unwrap(), 1000.0);
/// assert_eq!(tile.bin(0, 1).unwrap(), 1.0);
/// ```
pub fn create_ramp_tile(definition: TileIndex) -> DenseTileData<f64> {
    let mut bins = Vec::with_capacity(definition.bin_count());
    for y in 0..definition.y_bins {
        for x in 0..definition.x_bins {
            bins.push((x * 1000 + y) as f64);
        }
    }
    DenseTileData::from_bins(definition, bins).expect("bin count matches definition")
}

/// Creates a tile with every bin set to `value`.
pub fn create_constant_tile<T: Clone>(definition: TileIndex, value: T) -> DenseTileData<T> {
    DenseTileData::new(definition, value)
}

/// Creates a tile whose bins are bucket sequences of length `buckets`.
///
/// Bucket `i` of bin `(x, y)` holds `x * 1000 + y * 10 + i`, so averages
/// over a window are easy to compute by hand.
pub fn create_bucket_tile(definition: TileIndex, buckets: usize) -> DenseTileData<Vec<i64>> {
    let mut bins = Vec::with_capacity(definition.bin_count());
    for y in 0..definition.y_bins {
        for x in 0..definition.x_bins {
            let base = (x * 1000 + y * 10) as i64;
            bins.push((0..buckets as i64).map(|i| base + i).collect());
        }
    }
    DenseTileData::from_bins(definition, bins).expect("bin count matches definition")
}

/// Creates a bucket tile with deterministic pseudo-random sequence lengths
/// and values.
///
/// Lengths range over `0..=max_buckets`, values over `0..100`.
pub fn create_ragged_bucket_tile(
    definition: TileIndex,
    max_buckets: usize,
    seed: u32,
) -> DenseTileData<Vec<u32>> {
    let mut bins = Vec::with_capacity(definition.bin_count());
    for y in 0..definition.y_bins {
        for x in 0..definition.x_bins {
            let len = simple_hash(x as u32, y as u32, seed) as usize % (max_buckets + 1);
            let values = (0..len)
                .map(|i| simple_hash(x as u32, i as u32, seed ^ y as u32) % 100)
                .collect();
            bins.push(values);
        }
    }
    DenseTileData::from_bins(definition, bins).expect("bin count matches definition")
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
