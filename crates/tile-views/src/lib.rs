//! Derived tile views.
//!
//! Views wrap a source tile without copying it and answer reads on demand:
//!
//! - [`TileDataView`] serves a deeper pyramid tile from the bins of an
//!   already materialized ancestor, at reduced resolution.
//! - [`AverageTileBucketView`] collapses bins holding bucket sequences into
//!   the mean of a configured bucket window.
//!
//! Views hold their source by value, which is usually a reference such as
//! `&DenseTileData<T>`, so the borrow checker keeps a view from outliving the
//! tile it reads. Nothing is cached; every read goes back to the source.
//!
//! ```
//! use binning_common::{DenseTileData, TileData, TileIndex};
//! use tile_views::TileDataView;
//!
//! let source = DenseTileData::new(TileIndex::new(0, 0, 0, 8, 8), 1.0f64);
//! let view = TileDataView::from_source_absolute(&source, &TileIndex::new(2, 1, 2, 8, 8)).unwrap();
//!
//! assert_eq!(view.definition().x_bins, 2);
//! assert_eq!(view.bin(0, 0).unwrap(), 1.0);
//! ```

pub mod bucket;
pub mod config;
pub mod subview;

pub use bucket::{window_average, AverageTileBucketView};
pub use config::BucketWindowConfig;
pub use subview::TileDataView;
