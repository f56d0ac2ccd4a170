//! Filters selecting which annotations of a tile are served.

use binning_common::TileData;
use serde_json::Value;
use tracing::debug;

use crate::config::GroupCountConfig;
use crate::data::{AnnotationBin, AnnotationData, Certificate};
use crate::error::AnnotationResult;

/// Selects the annotations of a tile to serve.
pub trait AnnotationFilter {
    /// Pick certificates out of every bin of `tile`.
    fn filter_tile(&self, tile: &dyn TileData<Bin = Option<AnnotationBin>>) -> AnnotationResult<Vec<Certificate>>;

    /// Filter already resolved annotation records.
    fn filter_annotations(&self, annotations: Vec<AnnotationData>) -> Vec<AnnotationData>;
}

/// Serves the `n` most recent annotations of each configured group, per bin.
///
/// Groups missing from the configuration are dropped. Output is grouped by
/// bin (row-major), then by group name.
#[derive(Debug, Clone)]
pub struct NMostRecentByGroupFilter {
    counts_by_group: GroupCountConfig,
}

impl NMostRecentByGroupFilter {
    pub fn new(counts_by_group: GroupCountConfig) -> Self {
        debug!(groups = counts_by_group.len(), "Created most-recent-by-group filter");
        Self { counts_by_group }
    }

    /// Build a filter from a `{"group": count}` JSON object.
    pub fn from_json(config: &Value) -> AnnotationResult<Self> {
        Ok(Self::new(GroupCountConfig::from_json(config)?))
    }

    pub fn counts_by_group(&self) -> &GroupCountConfig {
        &self.counts_by_group
    }

    fn filter_bin(&self, bin: &AnnotationBin, filtered: &mut Vec<Certificate>) {
        for (group, count) in self.counts_by_group.iter() {
            let certificates = bin.certificates(group);
            // Bins are sorted newest first, so the head holds the n newest
            filtered.extend_from_slice(&certificates[..count.min(certificates.len())]);
        }
    }
}

impl AnnotationFilter for NMostRecentByGroupFilter {
    fn filter_tile(&self, tile: &dyn TileData<Bin = Option<AnnotationBin>>) -> AnnotationResult<Vec<Certificate>> {
        let definition = *tile.definition();
        let mut filtered = Vec::new();

        for y in 0..definition.y_bins {
            for x in 0..definition.x_bins {
                if let Some(bin) = tile.bin(x, y)? {
                    self.filter_bin(&bin, &mut filtered);
                }
            }
        }

        debug!(
            tile = %definition,
            selected = filtered.len(),
            "Filtered annotation tile"
        );
        Ok(filtered)
    }

    fn filter_annotations(&self, annotations: Vec<AnnotationData>) -> Vec<AnnotationData> {
        annotations
    }
}
