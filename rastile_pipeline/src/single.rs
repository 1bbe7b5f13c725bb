use crate::{ConsumerQuota, ConsumerTask, ProducerWorker, RasterInfo, RasterSource, RunSummary, runner::Run, runner::Setup};
use anyhow::Result;
use rastile_core::{BoundedTileQueue, PipelineConfig, Pixel, TileBlock, TileGrid, progress::ProgressBar};

/// One reader thread feeding `consumer_threads` consumers.
///
/// The reader walks the whole grid in order. Consumers claim tiles from the
/// queue's shared counter, so faster consumers simply take more tiles.
pub struct SingleProducerPipeline<'a, T: Pixel> {
	setup: Setup<'a, T>,
}

impl<'a, T: Pixel> SingleProducerPipeline<'a, T> {
	/// Validates `config` and queries the raster's metadata.
	pub fn new(source: &'a dyn RasterSource<T>, config: PipelineConfig) -> Result<Self> {
		Ok(Self {
			setup: Setup::new(source, config)?,
		})
	}

	pub fn info(&self) -> &RasterInfo {
		&self.setup.info
	}

	pub fn grid(&self) -> &TileGrid {
		&self.setup.grid
	}

	pub fn config(&self) -> &PipelineConfig {
		&self.setup.config
	}

	pub fn task_count(&self) -> usize {
		self.setup.pool.len()
	}

	/// Registers a task that runs once per processed tile without looking at it.
	pub fn add_task(&mut self, task: impl FnMut() -> Result<()> + Send + 'a) {
		self.setup.pool.add_task(task);
	}

	/// Registers a task that receives every tile its consumer processes.
	pub fn add_tile_task(&mut self, task: impl FnMut(&TileBlock<T>) -> Result<()> + Send + 'a) {
		self.setup.pool.add_tile_task(task);
	}

	/// Registers one task per consumer thread, built by `factory(consumer_index)`.
	pub fn add_tasks_with(&mut self, factory: impl FnMut(usize) -> ConsumerTask<'a, T>) {
		self.setup.add_tasks_with(factory);
	}

	pub fn set_progress(&mut self, progress: ProgressBar) {
		self.setup.progress = Some(progress);
	}

	/// Streams every tile of the raster through the registered tasks.
	///
	/// Fails before any thread starts when the task count does not match
	/// `consumer_threads` or the reader cannot be opened. Otherwise the first
	/// read or task error aborts the run and is returned.
	pub fn run(&mut self) -> Result<RunSummary> {
		let setup = &mut self.setup;
		setup.check_tasks()?;

		let tiles = setup.grid.tile_count();
		let reader = setup.open_reader()?;
		let template = setup.template();
		let queue = BoundedTileQueue::new(setup.config.queue_capacity, &template)?;
		queue.reset(tiles);
		setup.start_progress(tiles);

		let producer = ProducerWorker::new(0, reader, setup.grid.regions(), &queue, template.clone());
		Run {
			tiles,
			pool: &mut setup.pool,
			quotas: vec![ConsumerQuota::Claimed; setup.config.consumer_threads],
			template: &template,
			progress: setup.progress.as_ref(),
		}
		.execute(&queue, vec![producer])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MemoryRaster;
	use anyhow::bail;
	use rastile_core::TileLayout;
	use std::sync::Mutex;

	fn config(consumers: usize) -> PipelineConfig {
		PipelineConfig::default()
			.with_tile_size(3)
			.with_layout(TileLayout::Square)
			.with_consumer_threads(consumers)
			.with_queue_capacity(2)
	}

	#[test]
	fn every_tile_is_processed_once() {
		let raster = MemoryRaster::<u8>::from_fn(10, 7, 1, |_, _, _| 1);
		let seen = Mutex::new(Vec::new());
		let mut pipeline = SingleProducerPipeline::new(&raster, config(3)).unwrap();
		pipeline.add_tasks_with(|_| {
			let seen = &seen;
			ConsumerTask::tile(move |block| {
				seen.lock().unwrap().push(block.region().index);
				Ok(())
			})
		});

		let summary = pipeline.run().unwrap();
		assert_eq!(summary.tiles, 12);
		assert_eq!(summary.produced, vec![12]);
		assert_eq!(summary.consumed_per_consumer.len(), 3);
		assert_eq!(summary.total_consumed(), 12);
		drop(pipeline);

		let mut seen = seen.into_inner().unwrap();
		seen.sort_unstable();
		assert_eq!(seen, (0..12).collect::<Vec<_>>());
	}

	#[test]
	fn task_count_must_match_consumer_threads() {
		let raster = MemoryRaster::<u8>::from_fn(4, 4, 1, |_, _, _| 0);
		let mut pipeline = SingleProducerPipeline::new(&raster, config(2)).unwrap();
		pipeline.add_task(|| Ok(()));
		assert_eq!(pipeline.task_count(), 1);
		assert_eq!(
			pipeline.run().unwrap_err().to_string(),
			"expected 2 processing tasks, one per consumer thread, got 1"
		);
	}

	#[test]
	fn invalid_bands_fail_setup() {
		let raster = MemoryRaster::<u8>::from_fn(4, 4, 2, |_, _, _| 0);
		let err = SingleProducerPipeline::new(&raster, config(1).with_bands(vec![3])).err().unwrap();
		assert_eq!(
			format!("{err:#}"),
			"Failed to set up pipeline: band 3 is out of range, dataset has 2 band(s)"
		);
	}

	#[test]
	fn reader_open_failure_is_a_setup_error() {
		struct Unreadable;
		impl RasterSource<u8> for Unreadable {
			fn info(&self) -> Result<RasterInfo> {
				Ok(RasterInfo::new(4, 4, 1))
			}
			fn open_reader(&self) -> Result<Box<dyn crate::TileReader<u8> + '_>> {
				bail!("permission denied")
			}
		}

		let mut pipeline = SingleProducerPipeline::new(&Unreadable, config(1)).unwrap();
		pipeline.add_task(|| Ok(()));
		let err = pipeline.run().unwrap_err();
		assert_eq!(format!("{err:#}"), "Failed to open raster reader: permission denied");
	}

	#[test]
	fn progress_reaches_tile_count() {
		let raster = MemoryRaster::<u8>::from_fn(9, 9, 1, |_, _, _| 0);
		let progress = ProgressBar::new("tiles", 0);
		let mut pipeline = SingleProducerPipeline::new(&raster, config(2)).unwrap();
		pipeline.add_task(|| Ok(()));
		pipeline.add_task(|| Ok(()));
		pipeline.set_progress(progress.clone());
		pipeline.run().unwrap();
		assert_eq!(progress.max_value(), 9);
		assert_eq!(progress.position(), 9);
	}
}
