//! Producer/consumer pipelines that stream a raster through a bounded tile queue.
//!
//! Two variants share the same building blocks:
//!
//! - [`SingleProducerPipeline`]: one reader thread walks the whole tile grid,
//!   consumers claim tiles from a shared counter until every tile is taken.
//! - [`MultiProducerPipeline`]: several reader threads each walk a stripe of tile
//!   rows, consumers process a share of tiles fixed before the run starts.
//!
//! Both take the raster through the [`RasterSource`] trait and run one
//! caller-supplied [`ConsumerTask`] per consumer thread.
//!
//! ```
//! use rastile_core::{PipelineConfig, TileLayout};
//! use rastile_pipeline::{MemoryRaster, SingleProducerPipeline};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let raster = MemoryRaster::<u8>::from_fn(10, 10, 1, |x, y, _| (x + y) as u8);
//! let config = PipelineConfig::default()
//! 	.with_tile_size(4)
//! 	.with_layout(TileLayout::RowStrip)
//! 	.with_consumer_threads(2)
//! 	.with_queue_capacity(2);
//!
//! let pixels = AtomicUsize::new(0);
//! let mut pipeline = SingleProducerPipeline::new(&raster, config).unwrap();
//! pipeline.add_tasks_with(|_| {
//! 	let pixels = &pixels;
//! 	rastile_pipeline::ConsumerTask::tile(move |block| {
//! 		pixels.fetch_add(block.region().pixel_count(), Ordering::Relaxed);
//! 		Ok(())
//! 	})
//! });
//! let summary = pipeline.run().unwrap();
//! assert_eq!(summary.tiles, 3);
//! assert_eq!(pixels.load(Ordering::Relaxed), 100);
//! ```

mod consumer;
mod multi;
mod producer;
mod run_state;
mod runner;
mod single;
mod sources;
mod summary;
mod traits;

pub use consumer::{ConsumerPool, ConsumerQuota, ConsumerTask};
pub use multi::MultiProducerPipeline;
pub use producer::ProducerWorker;
pub use single::SingleProducerPipeline;
pub use sources::*;
pub use summary::RunSummary;
pub use traits::{RasterInfo, RasterSource, TileReader};
