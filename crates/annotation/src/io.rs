//! Annotation storage contract and an in-memory store.

use std::collections::HashMap;

use binning_common::{TileData, TileIndex};
use tracing::debug;
use uuid::Uuid;

use crate::data::{AnnotationData, AnnotationTile, Certificate};
use crate::error::{AnnotationError, AnnotationResult};

/// Storage for annotation tiles and the records they reference, keyed by
/// layer id.
///
/// Failures are returned to the caller as-is; implementations do not retry.
pub trait AnnotationIo {
    /// Store annotation tiles, replacing tiles with the same index.
    fn write_tiles(&mut self, id: &str, tiles: &[AnnotationTile]) -> AnnotationResult<()>;

    /// Read the stored tiles among `indices`. Missing tiles are skipped.
    fn read_tiles(&self, id: &str, indices: &[TileIndex]) -> AnnotationResult<Vec<AnnotationTile>>;

    /// Store annotation records, replacing records with the same uuid.
    fn write_data(&mut self, id: &str, data: &[AnnotationData]) -> AnnotationResult<()>;

    /// Read the records matching `references` (uuid and version). References
    /// without a matching record are skipped.
    fn read_data(&self, id: &str, references: &[Certificate]) -> AnnotationResult<Vec<AnnotationData>>;

    /// Delete tiles by index.
    fn remove_tiles(&mut self, id: &str, indices: &[TileIndex]) -> AnnotationResult<()>;

    /// Delete records by uuid.
    fn remove_data(&mut self, id: &str, data: &[AnnotationData]) -> AnnotationResult<()>;
}

#[derive(Debug, Default)]
struct Layer {
    tiles: HashMap<String, AnnotationTile>,
    /// Records kept in serialized form
    records: HashMap<Uuid, String>,
}

/// An [`AnnotationIo`] holding every layer in memory.
///
/// Records are stored as JSON, so a read goes through the same
/// serialization a persistent store would.
#[derive(Debug, Default)]
pub struct MemoryAnnotationIo {
    layers: HashMap<String, Layer>,
}

impl MemoryAnnotationIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a layer has been written to.
    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn layer(&self, id: &str) -> AnnotationResult<&Layer> {
        self.layers
            .get(id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))
    }

    fn layer_mut(&mut self, id: &str) -> AnnotationResult<&mut Layer> {
        self.layers
            .get_mut(id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))
    }
}

impl AnnotationIo for MemoryAnnotationIo {
    fn write_tiles(&mut self, id: &str, tiles: &[AnnotationTile]) -> AnnotationResult<()> {
        let layer = self.layers.entry(id.to_string()).or_default();
        for tile in tiles {
            layer.tiles.insert(tile.definition().cache_key(), tile.clone());
        }
        debug!(layer = id, count = tiles.len(), "Wrote annotation tiles");
        Ok(())
    }

    fn read_tiles(&self, id: &str, indices: &[TileIndex]) -> AnnotationResult<Vec<AnnotationTile>> {
        let layer = self.layer(id)?;
        Ok(indices
            .iter()
            .filter_map(|index| layer.tiles.get(&index.cache_key()).cloned())
            .collect())
    }

    fn write_data(&mut self, id: &str, data: &[AnnotationData]) -> AnnotationResult<()> {
        let layer = self.layers.entry(id.to_string()).or_default();
        for annotation in data {
            let serialized = serde_json::to_string(annotation)?;
            layer.records.insert(annotation.uuid, serialized);
        }
        debug!(layer = id, count = data.len(), "Wrote annotation records");
        Ok(())
    }

    fn read_data(&self, id: &str, references: &[Certificate]) -> AnnotationResult<Vec<AnnotationData>> {
        let layer = self.layer(id)?;
        let mut found = Vec::with_capacity(references.len());
        for reference in references {
            if let Some(serialized) = layer.records.get(&reference.id) {
                let annotation: AnnotationData = serde_json::from_str(serialized)?;
                if annotation.timestamp == reference.timestamp {
                    found.push(annotation);
                }
            }
        }
        Ok(found)
    }

    fn remove_tiles(&mut self, id: &str, indices: &[TileIndex]) -> AnnotationResult<()> {
        let layer = self.layer_mut(id)?;
        let removed = indices
            .iter()
            .filter(|index| layer.tiles.remove(&index.cache_key()).is_some())
            .count();
        debug!(layer = id, removed, "Removed annotation tiles");
        Ok(())
    }

    fn remove_data(&mut self, id: &str, data: &[AnnotationData]) -> AnnotationResult<()> {
        let layer = self.layer_mut(id)?;
        let removed = data
            .iter()
            .filter(|annotation| layer.records.remove(&annotation.uuid).is_some())
            .count();
        debug!(layer = id, removed, "Removed annotation records");
        Ok(())
    }
}
