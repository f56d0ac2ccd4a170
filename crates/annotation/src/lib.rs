//! Point annotations stored alongside a tile pyramid.
//!
//! Annotation records live in a per-layer store and are referenced from tile
//! bins by [`Certificate`]s, grouped (e.g. by priority) and sorted newest
//! first. Filters decide which certificates of a tile are served.

pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod io;

pub use config::GroupCountConfig;
pub use data::{AnnotationBin, AnnotationData, AnnotationTile, Certificate};
pub use error::{AnnotationError, AnnotationResult};
pub use filter::{AnnotationFilter, NMostRecentByGroupFilter};
pub use io::{AnnotationIo, MemoryAnnotationIo};
