//! Loading stored tiles and rendering them through derived views.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use binning_common::{collect_bins, BinningResult, DenseTileData, TileData, TileIndex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tile_views::{AverageTileBucketView, BucketWindowConfig, TileDataView};
use tracing::info;

/// Bins of a tile as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectOutput {
    pub index: TileIndex,
    /// One row per bin row, top row first
    pub bins: Vec<Vec<f64>>,
    pub metadata: BTreeMap<String, String>,
}

/// Read a JSON-serialized dense tile and check it against its definition.
pub fn load_tile<T: DeserializeOwned + Clone>(path: &Path) -> Result<DenseTileData<T>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tile file {}", path.display()))?;
    let tile: DenseTileData<T> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse tile file {}", path.display()))?;
    tile.validate()
        .with_context(|| format!("Invalid tile in {}", path.display()))?;

    info!(path = %path.display(), tile = %tile.definition(), "Loaded tile");
    Ok(tile)
}

/// Render a scalar tile, optionally through a view for a descendant tile.
pub fn inspect_scalar(tile: &DenseTileData<f64>, target: Option<&TileIndex>) -> Result<InspectOutput> {
    match target {
        Some(target) => {
            let view = TileDataView::from_source_absolute(tile, target)
                .with_context(|| format!("Cannot serve {} from {}", target.cache_key(), tile.definition()))?;
            Ok(render(&view)?)
        }
        None => Ok(render(tile)?),
    }
}

/// Render a bucketed tile as bucket-window averages, optionally through a
/// view for a descendant tile.
pub fn inspect_buckets(
    tile: &DenseTileData<Vec<f64>>,
    target: Option<&TileIndex>,
    window: &BucketWindowConfig,
) -> Result<InspectOutput> {
    match target {
        Some(target) => {
            let view = TileDataView::from_source_absolute(tile, target)
                .with_context(|| format!("Cannot serve {} from {}", target.cache_key(), tile.definition()))?;
            Ok(render(&AverageTileBucketView::with_config(view, window))?)
        }
        None => Ok(render(&AverageTileBucketView::with_config(tile, window))?),
    }
}

fn render<D: TileData<Bin = f64>>(tile: &D) -> BinningResult<InspectOutput> {
    let dense = collect_bins(tile)?;
    let index = *dense.definition();
    let bins = dense
        .bins()
        .chunks(index.x_bins)
        .map(|row| row.to_vec())
        .collect();
    let metadata = dense
        .metadata_properties()
        .into_iter()
        .filter_map(|key| dense.metadata(&key).map(|value| (key, value)))
        .collect();

    Ok(InspectOutput {
        index,
        bins,
        metadata,
    })
}
