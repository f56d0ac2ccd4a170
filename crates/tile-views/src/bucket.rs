//! Averaging a window of buckets out of sequence-valued bins.

use binning_common::{BinningError, BinningResult, TileData, TileDataMut, TileIndex};
use num_traits::AsPrimitive;
use tracing::trace;

use crate::config::BucketWindowConfig;

/// Mean of the buckets selected by `start_compare..=end_compare`.
///
/// `end_compare` is first clipped to the number of buckets, then index `i` is
/// selected when `start_compare <= i <= end`. An empty selection yields `0.0`.
pub fn window_average<T>(buckets: &[T], start_compare: i64, end_compare: i64) -> f64
where
    T: AsPrimitive<f64>,
{
    let len = buckets.len() as i64;
    let end = end_compare.min(len);

    let (total, count) = buckets
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let i = *i as i64;
            i >= start_compare && i <= end
        })
        .fold((0.0f64, 0usize), |(total, count), (_, value)| {
            (total + (*value).as_(), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// A view over a tile whose bins are bucket sequences (e.g. per-day counts),
/// presenting each bin as the average of a bucket window.
///
/// The grid shape is the base tile's. Bin writes are bounds checked and then
/// discarded; metadata reads and writes go straight to the base tile.
#[derive(Debug, Clone)]
pub struct AverageTileBucketView<S> {
    base: S,
    start_compare: i64,
    end_compare: i64,
}

impl<S: TileData> AverageTileBucketView<S> {
    pub fn new(base: S, start_compare: i64, end_compare: i64) -> Self {
        Self {
            base,
            start_compare,
            end_compare,
        }
    }

    /// Build a view using a configured bucket window.
    pub fn with_config(base: S, config: &BucketWindowConfig) -> Self {
        Self::new(base, config.start_compare, config.end_compare)
    }

    /// The wrapped base tile.
    pub fn base(&self) -> &S {
        &self.base
    }

    /// First bucket index included in the average.
    pub fn start_compare(&self) -> i64 {
        self.start_compare
    }

    /// Last bucket index included in the average, before clipping.
    pub fn end_compare(&self) -> i64 {
        self.end_compare
    }

    fn check_bounds(&self, x: usize, y: usize) -> BinningResult<()> {
        let definition = self.base.definition();
        if !definition.contains_bin(x, y) {
            return Err(BinningError::out_of_range(
                x,
                y,
                definition.x_bins,
                definition.y_bins,
            ));
        }
        Ok(())
    }
}

impl<S, T> TileData for AverageTileBucketView<S>
where
    S: TileData<Bin = Vec<T>>,
    T: AsPrimitive<f64>,
{
    type Bin = f64;

    fn definition(&self) -> &TileIndex {
        self.base.definition()
    }

    fn bin(&self, x: usize, y: usize) -> BinningResult<f64> {
        self.check_bounds(x, y)?;
        let buckets = self.base.bin(x, y)?;
        Ok(window_average(&buckets, self.start_compare, self.end_compare))
    }

    fn metadata_properties(&self) -> Vec<String> {
        self.base.metadata_properties()
    }

    fn metadata(&self, property: &str) -> Option<String> {
        self.base.metadata(property)
    }
}

impl<S, T> TileDataMut for AverageTileBucketView<S>
where
    S: TileDataMut<Bin = Vec<T>>,
    T: AsPrimitive<f64>,
{
    /// Averages are derived values; an in-range write is accepted and dropped.
    fn set_bin(&mut self, x: usize, y: usize, _value: f64) -> BinningResult<()> {
        self.check_bounds(x, y)?;
        trace!(x, y, "Discarding write to averaged bucket view");
        Ok(())
    }

    fn set_metadata(&mut self, property: &str, value: &str) {
        self.base.set_metadata(property, value);
    }
}
