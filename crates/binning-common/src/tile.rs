//! Bin grid capability traits and a dense in-memory implementation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BinningError, BinningResult};
use crate::index::TileIndex;

/// Read access to a tile's bin grid.
///
/// Bins are addressed by `(x, y)` with `x < x_bins` and `y < y_bins` of the
/// tile's definition. Implementations that own storage reject other
/// coordinates with [`BinningError::OutOfRange`].
pub trait TileData {
    /// Value held by each bin.
    type Bin;

    /// The index this tile answers for.
    fn definition(&self) -> &TileIndex;

    /// Read the bin at `(x, y)`.
    fn bin(&self, x: usize, y: usize) -> BinningResult<Self::Bin>;

    /// Names of the metadata properties attached to the tile.
    fn metadata_properties(&self) -> Vec<String> {
        Vec::new()
    }

    /// Value of a metadata property.
    fn metadata(&self, _property: &str) -> Option<String> {
        None
    }
}

/// Write access to a tile's bins and metadata.
pub trait TileDataMut: TileData {
    /// Store `value` in the bin at `(x, y)`.
    fn set_bin(&mut self, x: usize, y: usize, value: Self::Bin) -> BinningResult<()>;

    /// Set a metadata property.
    fn set_metadata(&mut self, property: &str, value: &str);
}

impl<D: TileData + ?Sized> TileData for &D {
    type Bin = D::Bin;

    fn definition(&self) -> &TileIndex {
        (**self).definition()
    }

    fn bin(&self, x: usize, y: usize) -> BinningResult<Self::Bin> {
        (**self).bin(x, y)
    }

    fn metadata_properties(&self) -> Vec<String> {
        (**self).metadata_properties()
    }

    fn metadata(&self, property: &str) -> Option<String> {
        (**self).metadata(property)
    }
}

impl<D: TileData + ?Sized> TileData for &mut D {
    type Bin = D::Bin;

    fn definition(&self) -> &TileIndex {
        (**self).definition()
    }

    fn bin(&self, x: usize, y: usize) -> BinningResult<Self::Bin> {
        (**self).bin(x, y)
    }

    fn metadata_properties(&self) -> Vec<String> {
        (**self).metadata_properties()
    }

    fn metadata(&self, property: &str) -> Option<String> {
        (**self).metadata(property)
    }
}

impl<D: TileDataMut + ?Sized> TileDataMut for &mut D {
    fn set_bin(&mut self, x: usize, y: usize, value: Self::Bin) -> BinningResult<()> {
        (**self).set_bin(x, y, value)
    }

    fn set_metadata(&mut self, property: &str, value: &str) {
        (**self).set_metadata(property, value)
    }
}

/// A tile holding every bin in memory, row-major (row 0 first).
///
/// Deserialization rejects a bin buffer that does not match the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTileData<T>")]
pub struct DenseTileData<T> {
    definition: TileIndex,
    bins: Vec<T>,
    metadata: BTreeMap<String, String>,
}

/// Unchecked wire form of [`DenseTileData`].
#[derive(Deserialize)]
struct RawTileData<T> {
    definition: TileIndex,
    bins: Vec<T>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl<T> TryFrom<RawTileData<T>> for DenseTileData<T> {
    type Error = BinningError;

    fn try_from(raw: RawTileData<T>) -> BinningResult<Self> {
        let tile = Self {
            definition: raw.definition,
            bins: raw.bins,
            metadata: raw.metadata,
        };
        tile.validate()?;
        Ok(tile)
    }
}

impl<T: Clone> DenseTileData<T> {
    /// Create a tile with every bin set to `default`.
    pub fn new(definition: TileIndex, default: T) -> Self {
        Self {
            definition,
            bins: vec![default; definition.bin_count()],
            metadata: BTreeMap::new(),
        }
    }
}

impl<T> DenseTileData<T> {
    /// Create a tile from row-major bin values.
    pub fn from_bins(definition: TileIndex, bins: Vec<T>) -> BinningResult<Self> {
        if bins.len() != definition.bin_count() {
            return Err(BinningError::invalid_index(format!(
                "tile {} expects {} bins, got {}",
                definition,
                definition.bin_count(),
                bins.len()
            )));
        }
        Ok(Self {
            definition,
            bins,
            metadata: BTreeMap::new(),
        })
    }

    /// All bins in row-major order.
    pub fn bins(&self) -> &[T] {
        &self.bins
    }

    /// Check that the deserialized bin buffer matches the definition.
    pub fn validate(&self) -> BinningResult<()> {
        self.definition.validate()?;
        if self.bins.len() != self.definition.bin_count() {
            return Err(BinningError::invalid_index(format!(
                "tile {} expects {} bins, got {}",
                self.definition,
                self.definition.bin_count(),
                self.bins.len()
            )));
        }
        Ok(())
    }

    fn offset(&self, x: usize, y: usize) -> BinningResult<usize> {
        if !self.definition.contains_bin(x, y) {
            return Err(BinningError::out_of_range(
                x,
                y,
                self.definition.x_bins,
                self.definition.y_bins,
            ));
        }
        Ok(y * self.definition.x_bins + x)
    }
}

impl<T: Clone> TileData for DenseTileData<T> {
    type Bin = T;

    fn definition(&self) -> &TileIndex {
        &self.definition
    }

    fn bin(&self, x: usize, y: usize) -> BinningResult<T> {
        let offset = self.offset(x, y)?;
        Ok(self.bins[offset].clone())
    }

    fn metadata_properties(&self) -> Vec<String> {
        self.metadata.keys().cloned().collect()
    }

    fn metadata(&self, property: &str) -> Option<String> {
        self.metadata.get(property).cloned()
    }
}

impl<T: Clone> TileDataMut for DenseTileData<T> {
    fn set_bin(&mut self, x: usize, y: usize, value: T) -> BinningResult<()> {
        let offset = self.offset(x, y)?;
        self.bins[offset] = value;
        Ok(())
    }

    fn set_metadata(&mut self, property: &str, value: &str) {
        self.metadata.insert(property.to_string(), value.to_string());
    }
}

/// Materialize any tile into dense storage, reading bins row by row.
///
/// Metadata visible through `tile` is copied as well.
pub fn collect_bins<D>(tile: &D) -> BinningResult<DenseTileData<D::Bin>>
where
    D: TileData + ?Sized,
{
    let definition = *tile.definition();
    let mut bins = Vec::with_capacity(definition.bin_count());
    for y in 0..definition.y_bins {
        for x in 0..definition.x_bins {
            bins.push(tile.bin(x, y)?);
        }
    }

    let mut dense = DenseTileData::from_bins(definition, bins)?;
    for property in tile.metadata_properties() {
        if let Some(value) = tile.metadata(&property) {
            dense.metadata.insert(property, value);
        }
    }
    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(definition: TileIndex) -> DenseTileData<u32> {
        let bins = (0..definition.y_bins)
            .flat_map(|y| (0..definition.x_bins).map(move |x| (x * 1000 + y) as u32))
            .collect();
        DenseTileData::from_bins(definition, bins).unwrap()
    }

    #[test]
    fn test_dense_get_set() {
        let mut tile = DenseTileData::new(TileIndex::new(0, 0, 0, 3, 2), 0.0f64);
        tile.set_bin(2, 1, 7.5).unwrap();
        assert_eq!(tile.bin(2, 1).unwrap(), 7.5);
        assert_eq!(tile.bin(0, 0).unwrap(), 0.0);
        assert_eq!(tile.bins()[5], 7.5);
    }

    #[test]
    fn test_dense_out_of_range() {
        let mut tile = DenseTileData::new(TileIndex::new(0, 0, 0, 3, 2), 0u8);
        assert_eq!(tile.bin(3, 0), Err(BinningError::out_of_range(3, 0, 3, 2)));
        assert!(matches!(tile.bin(0, 2), Err(BinningError::OutOfRange { .. })));
        assert!(matches!(tile.set_bin(5, 5, 1), Err(BinningError::OutOfRange { .. })));
    }

    #[test]
    fn test_from_bins_length_mismatch() {
        let result = DenseTileData::from_bins(TileIndex::new(0, 0, 0, 2, 2), vec![1, 2, 3]);
        assert!(matches!(result, Err(BinningError::InvalidIndex(_))));
    }

    #[test]
    fn test_metadata() {
        let mut tile = DenseTileData::new(TileIndex::new(1, 0, 1, 1, 1), 0i32);
        assert!(tile.metadata_properties().is_empty());

        tile.set_metadata("maximum", "42");
        tile.set_metadata("minimum", "-3");
        assert_eq!(tile.metadata("maximum").as_deref(), Some("42"));
        assert_eq!(tile.metadata("missing"), None);
        assert_eq!(tile.metadata_properties(), vec!["maximum", "minimum"]);
    }

    fn write_through<D: TileDataMut<Bin = u32>>(mut tile: D) {
        tile.set_bin(1, 1, 99).unwrap();
        tile.set_metadata("source", "test");
    }

    fn read_through<D: TileData<Bin = u32>>(tile: D, x: usize, y: usize) -> u32 {
        tile.bin(x, y).unwrap()
    }

    #[test]
    fn test_reference_delegation() {
        let mut tile = ramp(TileIndex::new(0, 0, 0, 4, 4));
        write_through(&mut tile);

        assert_eq!(read_through(&tile, 1, 1), 99);
        assert_eq!(read_through(&tile, 3, 2), 3002);
        assert_eq!((&tile).metadata("source").as_deref(), Some("test"));
    }

    #[test]
    fn test_collect_bins() {
        let mut tile = ramp(TileIndex::new(0, 0, 0, 3, 2));
        tile.set_metadata("name", "ramp");

        let copy = collect_bins(&tile).unwrap();
        assert_eq!(copy, tile);
    }

    #[test]
    fn test_serde_round_trip_keeps_metadata() {
        let mut tile = ramp(TileIndex::new(2, 1, 3, 2, 2));
        tile.set_metadata("units", "count");

        let json = serde_json::to_string(&tile).unwrap();
        let back: DenseTileData<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tile);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_deserialize_rejects_short_buffer() {
        let json = r#"{"definition":{"level":0,"x":0,"y":0,"x_bins":2,"y_bins":2},"bins":[1,2]}"#;
        let result = serde_json::from_str::<DenseTileData<u32>>(json);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("expects 4 bins, got 2"), "{}", err);
    }

    #[test]
    fn test_deserialize_rejects_invalid_definition() {
        let json = r#"{"definition":{"level":1,"x":2,"y":0,"x_bins":1,"y_bins":1},"bins":[1]}"#;
        assert!(serde_json::from_str::<DenseTileData<u32>>(json).is_err());
    }

    #[test]
    fn test_deserialize_without_metadata() {
        let json = r#"{"definition":{"level":0,"x":0,"y":0,"x_bins":2,"y_bins":1},"bins":[1,2]}"#;
        let tile: DenseTileData<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(tile.bin(1, 0).unwrap(), 2);
        assert!(tile.metadata_properties().is_empty());
    }
}
