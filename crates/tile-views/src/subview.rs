//! Serving a descendant tile from the bins of a coarser source tile.

use binning_common::{BinningResult, TileData, TileIndex};
use tracing::debug;

/// A read-only view presenting a sub-rectangle of a source tile as a tile of
/// its own.
///
/// The view answers for a deeper pyramid tile contained in the source. Its
/// bin grid is the source grid divided by `2^level_delta`, so each descendant
/// level halves the resolution available.
///
/// Reads are forwarded as `source.bin(x + x_offset, y + y_offset)`. The view
/// does not re-check coordinates against its own grid; the source reports
/// reads outside of its bins. Metadata is not forwarded, read it from the
/// source directly.
#[derive(Debug, Clone)]
pub struct TileDataView<S> {
    source: S,
    definition: TileIndex,
    x_offset: usize,
    y_offset: usize,
}

impl<S: TileData> TileDataView<S> {
    /// Build a view answering for `target` out of `source`.
    ///
    /// Fails with `InvalidRelation` when `target` is shallower than the
    /// source, lies outside it, or is too deep for the source's bins.
    pub fn from_source_absolute(source: S, target: &TileIndex) -> BinningResult<Self> {
        let geometry = TileIndex::sub_tile_geometry(source.definition(), target)?;

        debug!(
            target = %geometry.index,
            x_offset = geometry.x_bin_start,
            y_offset = geometry.y_bin_start,
            "Created tile data view"
        );

        Ok(Self {
            source,
            definition: geometry.index,
            x_offset: geometry.x_bin_start,
            y_offset: geometry.y_bin_start,
        })
    }

    /// The wrapped source tile.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Bin offset of the view's first column within the source.
    pub fn x_offset(&self) -> usize {
        self.x_offset
    }

    /// Bin offset of the view's first row within the source.
    pub fn y_offset(&self) -> usize {
        self.y_offset
    }
}

impl<S: TileData> TileData for TileDataView<S> {
    type Bin = S::Bin;

    fn definition(&self) -> &TileIndex {
        &self.definition
    }

    fn bin(&self, x: usize, y: usize) -> BinningResult<S::Bin> {
        // Saturate so huge coordinates reach the source as out of range
        self.source
            .bin(x.saturating_add(self.x_offset), y.saturating_add(self.y_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binning_common::{BinningError, DenseTileData, TileDataMut};

    fn ramp(definition: TileIndex) -> DenseTileData<u32> {
        let bins = (0..definition.y_bins)
            .flat_map(|y| (0..definition.x_bins).map(move |x| (x * 1000 + y) as u32))
            .collect();
        DenseTileData::from_bins(definition, bins).unwrap()
    }

    #[test]
    fn test_view_definition_and_offsets() {
        let source = ramp(TileIndex::new(2, 1, 1, 4, 4));
        let view = TileDataView::from_source_absolute(&source, &TileIndex::new(3, 2, 3, 4, 4)).unwrap();

        assert_eq!(*view.definition(), TileIndex::new(3, 2, 3, 2, 2));
        assert_eq!(view.x_offset(), 0);
        assert_eq!(view.y_offset(), 0);
    }

    #[test]
    fn test_view_reads_offset_bins() {
        let source = ramp(TileIndex::new(0, 0, 0, 8, 8));
        let view = TileDataView::from_source_absolute(&source, &TileIndex::new(1, 1, 0, 8, 8)).unwrap();

        assert_eq!(view.x_offset(), 4);
        assert_eq!(view.y_offset(), 4);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(view.bin(x, y).unwrap(), source.bin(x + 4, y + 4).unwrap());
            }
        }
    }

    #[test]
    fn test_view_sees_source_updates() {
        let mut source = ramp(TileIndex::new(0, 0, 0, 4, 4));
        source.set_bin(2, 0, 7).unwrap();

        let view = TileDataView::from_source_absolute(&source, &TileIndex::new(1, 1, 1, 4, 4)).unwrap();
        assert_eq!(view.bin(0, 0).unwrap(), 7);
    }

    #[test]
    fn test_view_does_not_bound_check_its_own_grid() {
        let source = ramp(TileIndex::new(0, 0, 0, 4, 4));
        let view = TileDataView::from_source_absolute(&source, &TileIndex::new(1, 0, 1, 4, 4)).unwrap();

        // Past the view's 2x2 grid but still inside the source
        assert_eq!(view.bin(3, 0).unwrap(), 3000);
        assert!(matches!(view.bin(4, 0), Err(BinningError::OutOfRange { .. })));
    }

    #[test]
    fn test_view_huge_coordinates_are_out_of_range() {
        let source = ramp(TileIndex::new(0, 0, 0, 4, 4));
        let view = TileDataView::from_source_absolute(&source, &TileIndex::new(1, 1, 0, 4, 4)).unwrap();
        assert_eq!((view.x_offset(), view.y_offset()), (2, 2));

        assert_eq!(
            view.bin(usize::MAX, 0),
            Err(BinningError::out_of_range(usize::MAX, 2, 4, 4))
        );
        assert!(matches!(
            view.bin(0, usize::MAX - 1),
            Err(BinningError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_view_does_not_forward_metadata() {
        let mut source = ramp(TileIndex::new(0, 0, 0, 4, 4));
        source.set_metadata("maximum", "3003");

        let view = TileDataView::from_source_absolute(&source, &TileIndex::new(1, 0, 0, 4, 4)).unwrap();
        assert!(view.metadata_properties().is_empty());
        assert_eq!(view.metadata("maximum"), None);
        assert_eq!(view.source().metadata("maximum").as_deref(), Some("3003"));
    }

    #[test]
    fn test_view_rejects_invalid_relation() {
        let source = ramp(TileIndex::new(2, 1, 1, 4, 4));

        let above = TileDataView::from_source_absolute(&source, &TileIndex::new(1, 0, 0, 4, 4));
        assert!(matches!(above, Err(BinningError::InvalidRelation(_))));

        let outside = TileDataView::from_source_absolute(&source, &TileIndex::new(3, 0, 3, 4, 4));
        assert!(matches!(outside, Err(BinningError::InvalidRelation(_))));
    }
}
