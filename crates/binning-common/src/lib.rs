//! Common types shared by the tile pyramid crates.
//!
//! A pyramid is a quadtree of tiles. Level `L` holds `2^L x 2^L` tiles and
//! every tile carries a fixed-size grid of bins. This crate defines how tiles
//! are addressed ([`TileIndex`]), how a finer tile maps onto the bins of a
//! coarser one ([`SubTileGeometry`]), and the capability traits every bin
//! grid implements ([`TileData`], [`TileDataMut`]).

pub mod error;
pub mod index;
pub mod tile;

pub use error::{BinningError, BinningResult};
pub use index::{SubTileGeometry, TileIndex};
pub use tile::{collect_bins, DenseTileData, TileData, TileDataMut};
