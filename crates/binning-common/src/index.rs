//! Tile addressing within a quadtree pyramid.
//!
//! Tiles are identified by `level/x/y` together with the size of the bin grid
//! they carry. Level `L` has `2^L` tiles along each axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BinningError, BinningResult};

/// Deepest level addressable with 32-bit tile coordinates.
pub const MAX_LEVEL: u32 = 31;

/// Bin count used when an address string carries no bin dimensions.
pub const DEFAULT_BINS: usize = 256;

/// Identifies a tile: pyramid level, tile column/row and bin grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// Zoom level
    pub level: u32,
    /// Tile column
    pub x: u32,
    /// Tile row
    pub y: u32,
    /// Number of bin columns
    pub x_bins: usize,
    /// Number of bin rows
    pub y_bins: usize,
}

impl TileIndex {
    pub fn new(level: u32, x: u32, y: u32, x_bins: usize, y_bins: usize) -> Self {
        Self {
            level,
            x,
            y,
            x_bins,
            y_bins,
        }
    }

    /// Create an index, rejecting coordinates outside the level's grid and
    /// empty bin grids.
    pub fn checked(level: u32, x: u32, y: u32, x_bins: usize, y_bins: usize) -> BinningResult<Self> {
        let index = Self::new(level, x, y, x_bins, y_bins);
        index.validate()?;
        Ok(index)
    }

    /// Check the `0 <= x, y < 2^level` and `bins > 0` invariants.
    pub fn validate(&self) -> BinningResult<()> {
        if self.level > MAX_LEVEL {
            return Err(BinningError::invalid_index(format!(
                "level {} exceeds maximum level {}",
                self.level, MAX_LEVEL
            )));
        }
        let side = Self::tiles_per_side(self.level);
        if u64::from(self.x) >= side || u64::from(self.y) >= side {
            return Err(BinningError::invalid_index(format!(
                "tile {}/{}/{} lies outside the {}x{} grid of level {}",
                self.level, self.x, self.y, side, side, self.level
            )));
        }
        if self.x_bins == 0 || self.y_bins == 0 {
            return Err(BinningError::invalid_index(format!(
                "tile {} has an empty {}x{} bin grid",
                self.cache_key(),
                self.x_bins,
                self.y_bins
            )));
        }
        Ok(())
    }

    /// Number of tiles along one axis at `level`.
    pub fn tiles_per_side(level: u32) -> u64 {
        1u64 << level
    }

    /// Total number of bins in the tile.
    pub fn bin_count(&self) -> usize {
        self.x_bins * self.y_bins
    }

    /// Check whether `(x, y)` addresses a bin of this tile.
    pub fn contains_bin(&self, x: usize, y: usize) -> bool {
        x < self.x_bins && y < self.y_bins
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.level, self.x, self.y)
    }

    /// Get the parent tile (level - 1), keeping the bin dimensions.
    pub fn parent(&self) -> Option<TileIndex> {
        if self.level == 0 {
            return None;
        }
        Some(TileIndex {
            level: self.level - 1,
            x: self.x / 2,
            y: self.y / 2,
            ..*self
        })
    }

    /// Get the four children tiles (level + 1), keeping the bin dimensions.
    pub fn children(&self) -> [TileIndex; 4] {
        let x = self.x * 2;
        let y = self.y * 2;
        let level = self.level + 1;
        [
            TileIndex { level, x, y, ..*self },
            TileIndex {
                level,
                x: x + 1,
                y,
                ..*self
            },
            TileIndex {
                level,
                x,
                y: y + 1,
                ..*self
            },
            TileIndex {
                level,
                x: x + 1,
                y: y + 1,
                ..*self
            },
        ]
    }

    /// The tile at `level` that covers this one, or `None` when `level` is
    /// deeper than this tile.
    pub fn ancestor_at(&self, level: u32) -> Option<TileIndex> {
        let delta = self.level.checked_sub(level)?;
        if delta > MAX_LEVEL {
            return None;
        }
        Some(TileIndex {
            level,
            x: self.x >> delta,
            y: self.y >> delta,
            ..*self
        })
    }

    /// Whether this tile lies inside `ancestor` (a tile is its own
    /// descendant).
    pub fn is_descendant_of(&self, ancestor: &TileIndex) -> bool {
        self.ancestor_at(ancestor.level)
            .map(|a| a.x == ancestor.x && a.y == ancestor.y)
            .unwrap_or(false)
    }

    /// Map `target` onto the bins of `source`.
    ///
    /// `source` is a materialized tile and `target` an equal or deeper tile
    /// inside it. The result carries the bin offset of the target's first bin
    /// within `source` and the target's index with bin counts divided by
    /// `2^level_delta`.
    ///
    /// Containment is tested as `target.x >> level_delta == source.x` (and
    /// likewise for y), i.e. `target` has `source` as its ancestor.
    ///
    /// Tile rows and bin rows run in opposite directions, so the y offset is
    /// measured from the far edge of the target tile.
    pub fn sub_tile_geometry(source: &TileIndex, target: &TileIndex) -> BinningResult<SubTileGeometry> {
        if target.level < source.level {
            warn!(
                source = %source.cache_key(),
                target = %target.cache_key(),
                "Target tile is above its source in the pyramid"
            );
            return Err(BinningError::invalid_relation(format!(
                "target level {} must be greater than or equal to source level {}",
                target.level, source.level
            )));
        }

        let level_delta = target.level - source.level;
        if level_delta > MAX_LEVEL {
            return Err(BinningError::invalid_relation(format!(
                "level delta {} exceeds pyramid depth {}",
                level_delta, MAX_LEVEL
            )));
        }

        if target.x >> level_delta != source.x || target.y >> level_delta != source.y {
            warn!(
                source = %source.cache_key(),
                target = %target.cache_key(),
                "Target tile is not contained within source tile"
            );
            return Err(BinningError::invalid_relation(format!(
                "target tile {} is not contained within source tile {}",
                target.cache_key(),
                source.cache_key()
            )));
        }

        let tile_count_ratio = 1u32 << level_delta;
        let ratio = f64::from(tile_count_ratio);

        let x_pos_fraction = f64::from(target.x) / ratio - f64::from(source.x);
        let y_pos_fraction = (f64::from(target.y) + 1.0) / ratio - f64::from(source.y);

        // Fractions lie in [0, 1], so truncation never goes negative.
        let x_bin_start = (x_pos_fraction * source.x_bins as f64) as usize;
        let y_bin_start = source.y_bins - (y_pos_fraction * source.y_bins as f64) as usize;

        let x_bins = source.x_bins / tile_count_ratio as usize;
        let y_bins = source.y_bins / tile_count_ratio as usize;
        if x_bins == 0 || y_bins == 0 {
            return Err(BinningError::invalid_relation(format!(
                "source tile {} has too few bins ({}x{}) to resolve level {}",
                source.cache_key(),
                source.x_bins,
                source.y_bins,
                target.level
            )));
        }

        let geometry = SubTileGeometry {
            index: TileIndex::new(target.level, target.x, target.y, x_bins, y_bins),
            x_bin_start,
            y_bin_start,
            level_delta,
            tile_count_ratio,
        };

        debug!(
            source = %source.cache_key(),
            target = %target.cache_key(),
            level_delta,
            x_bin_start,
            y_bin_start,
            x_bins,
            y_bins,
            "Resolved sub-tile geometry"
        );

        Ok(geometry)
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} [{}x{}]",
            self.level, self.x, self.y, self.x_bins, self.y_bins
        )
    }
}

impl FromStr for TileIndex {
    type Err = BinningError;

    /// Parse `level/x/y` or `level/x/y/x_bins/y_bins`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 && parts.len() != 5 {
            return Err(BinningError::invalid_index(format!(
                "expected 'level/x/y' or 'level/x/y/x_bins/y_bins', got '{}'",
                s
            )));
        }

        let field = |i: usize| -> BinningResult<u64> {
            parts[i]
                .parse()
                .map_err(|_| BinningError::invalid_index(format!("invalid number '{}' in '{}'", parts[i], s)))
        };
        let narrow = |v: u64| -> BinningResult<u32> {
            u32::try_from(v).map_err(|_| BinningError::invalid_index(format!("value {} out of range in '{}'", v, s)))
        };

        let level = narrow(field(0)?)?;
        let x = narrow(field(1)?)?;
        let y = narrow(field(2)?)?;
        let (x_bins, y_bins) = if parts.len() == 5 {
            (field(3)? as usize, field(4)? as usize)
        } else {
            (DEFAULT_BINS, DEFAULT_BINS)
        };

        TileIndex::checked(level, x, y, x_bins, y_bins)
    }
}

/// Where a descendant tile sits inside the bins of a materialized ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTileGeometry {
    /// Target tile with its resolved bin dimensions
    pub index: TileIndex,
    /// Source bin column of the target's first column
    pub x_bin_start: usize,
    /// Source bin row of the target's first row
    pub y_bin_start: usize,
    /// Number of levels between source and target
    pub level_delta: u32,
    /// `2^level_delta`
    pub tile_count_ratio: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_tile_geometry_one_level() {
        let source = TileIndex::new(2, 1, 1, 4, 4);
        let target = TileIndex::new(3, 2, 3, 4, 4);

        let geometry = TileIndex::sub_tile_geometry(&source, &target).unwrap();
        assert_eq!(geometry.level_delta, 1);
        assert_eq!(geometry.tile_count_ratio, 2);
        assert_eq!(geometry.x_bin_start, 0);
        assert_eq!(geometry.y_bin_start, 0);
        assert_eq!(geometry.index, TileIndex::new(3, 2, 3, 2, 2));
    }

    #[test]
    fn test_sub_tile_geometry_same_level() {
        let source = TileIndex::new(4, 5, 9, 8, 8);

        let geometry = TileIndex::sub_tile_geometry(&source, &source).unwrap();
        assert_eq!(geometry.level_delta, 0);
        assert_eq!(geometry.x_bin_start, 0);
        assert_eq!(geometry.y_bin_start, 0);
        assert_eq!(geometry.index, source);
    }

    #[test]
    fn test_sub_tile_geometry_y_axis_is_flipped() {
        let source = TileIndex::new(0, 0, 0, 8, 8);

        // Lower tile row maps to the bottom bin rows
        let bottom = TileIndex::sub_tile_geometry(&source, &TileIndex::new(1, 1, 0, 8, 8)).unwrap();
        assert_eq!(bottom.x_bin_start, 4);
        assert_eq!(bottom.y_bin_start, 4);

        let top = TileIndex::sub_tile_geometry(&source, &TileIndex::new(1, 0, 1, 8, 8)).unwrap();
        assert_eq!(top.x_bin_start, 0);
        assert_eq!(top.y_bin_start, 0);
    }

    #[test]
    fn test_sub_tile_geometry_rejects_shallower_target() {
        let source = TileIndex::new(3, 2, 2, 4, 4);
        let target = TileIndex::new(2, 1, 1, 4, 4);

        let result = TileIndex::sub_tile_geometry(&source, &target);
        assert!(matches!(result, Err(BinningError::InvalidRelation(_))));
    }

    #[test]
    fn test_sub_tile_geometry_rejects_unrelated_tile() {
        let source = TileIndex::new(2, 1, 1, 4, 4);
        let target = TileIndex::new(3, 4, 3, 4, 4);

        let result = TileIndex::sub_tile_geometry(&source, &target);
        assert!(matches!(result, Err(BinningError::InvalidRelation(_))));
    }

    #[test]
    fn test_sub_tile_geometry_rejects_exhausted_resolution() {
        let source = TileIndex::new(0, 0, 0, 4, 4);
        let target = TileIndex::new(3, 0, 0, 4, 4);

        let result = TileIndex::sub_tile_geometry(&source, &target);
        assert!(matches!(result, Err(BinningError::InvalidRelation(_))));
    }

    #[test]
    fn test_containment_matches_bit_test() {
        let source = TileIndex::new(1, 1, 0, 16, 16);
        for level in 1..=3u32 {
            let delta = level - source.level;
            for x in 0..(1u32 << level) {
                for y in 0..(1u32 << level) {
                    let target = TileIndex::new(level, x, y, 16, 16);
                    let contained = x >> delta == source.x && y >> delta == source.y;
                    let result = TileIndex::sub_tile_geometry(&source, &target);
                    assert_eq!(result.is_ok(), contained, "target {}", target);
                    assert_eq!(target.is_descendant_of(&source), contained);
                }
            }
        }
    }

    #[test]
    fn test_parent_children() {
        let tile = TileIndex::new(5, 10, 15, 256, 256);
        let parent = tile.parent().unwrap();
        assert_eq!(parent, TileIndex::new(4, 5, 7, 256, 256));

        let children = parent.children();
        assert!(children.contains(&tile));
        assert!(TileIndex::new(0, 0, 0, 1, 1).parent().is_none());
    }

    #[test]
    fn test_ancestor_at() {
        let tile = TileIndex::new(4, 13, 6, 8, 8);
        assert_eq!(tile.ancestor_at(2), Some(TileIndex::new(2, 3, 1, 8, 8)));
        assert_eq!(tile.ancestor_at(4), Some(tile));
        assert_eq!(tile.ancestor_at(5), None);
    }

    #[test]
    fn test_checked_rejects_out_of_grid() {
        assert!(TileIndex::checked(2, 3, 3, 4, 4).is_ok());
        assert!(matches!(
            TileIndex::checked(2, 4, 0, 4, 4),
            Err(BinningError::InvalidIndex(_))
        ));
        assert!(matches!(
            TileIndex::checked(2, 0, 0, 0, 4),
            Err(BinningError::InvalidIndex(_))
        ));
        assert!(matches!(
            TileIndex::checked(40, 0, 0, 4, 4),
            Err(BinningError::InvalidIndex(_))
        ));
    }

    #[test]
    fn test_parse_address() {
        let index: TileIndex = "3/2/5".parse().unwrap();
        assert_eq!(index, TileIndex::new(3, 2, 5, DEFAULT_BINS, DEFAULT_BINS));

        let index: TileIndex = "3/2/5/16/8".parse().unwrap();
        assert_eq!(index, TileIndex::new(3, 2, 5, 16, 8));

        assert!("3/2".parse::<TileIndex>().is_err());
        assert!("3/a/5".parse::<TileIndex>().is_err());
        assert!("1/2/0".parse::<TileIndex>().is_err());
    }

    #[test]
    fn test_display_and_cache_key() {
        let index = TileIndex::new(3, 2, 5, 16, 8);
        assert_eq!(index.cache_key(), "3/2/5");
        assert_eq!(index.to_string(), "3/2/5 [16x8]");
        assert_eq!(index.bin_count(), 128);
    }
}
