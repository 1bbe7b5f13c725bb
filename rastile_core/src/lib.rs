//! Building blocks for streaming large rasters tile by tile.
//!
//! - [`TileGrid`] splits a raster into [`TileRegion`]s (row strips or clipped squares).
//! - [`TileBlock`] is a reusable, pre-allocated tile payload with its descriptor.
//! - [`BoundedTileQueue`] is the fixed-capacity buffer between producers and consumers.
//! - [`WorkloadPartitioner`] splits a grid across reader and consumer threads.
//! - [`PipelineConfig`] holds the recognized run options.

pub mod config;
pub mod partition;
pub mod progress;
pub mod queue;
pub mod types;

pub use config::PipelineConfig;
pub use partition::{Workload, WorkloadPartitioner};
pub use queue::BoundedTileQueue;
pub use types::*;
