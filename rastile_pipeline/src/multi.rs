use crate::{ConsumerQuota, ConsumerTask, ProducerWorker, RasterInfo, RasterSource, RunSummary, runner::Run, runner::Setup};
use anyhow::Result;
use rastile_core::{
	BoundedTileQueue, PipelineConfig, Pixel, TileBlock, TileGrid, Workload, WorkloadPartitioner, progress::ProgressBar,
};

/// `reader_threads` readers feeding `consumer_threads` consumers through one shared queue.
///
/// Each reader walks a contiguous stripe of tile rows, each consumer processes
/// a fixed number of tiles; see [`WorkloadPartitioner`]. When the grid has
/// fewer tiles than consumer threads, only the first tasks run.
pub struct MultiProducerPipeline<'a, T: Pixel> {
	setup: Setup<'a, T>,
	partitioner: WorkloadPartitioner,
}

impl<'a, T: Pixel> MultiProducerPipeline<'a, T> {
	/// Validates `config` and queries the raster's metadata.
	pub fn new(source: &'a dyn RasterSource<T>, config: PipelineConfig) -> Result<Self> {
		let setup = Setup::new(source, config)?;
		let partitioner = WorkloadPartitioner::new(setup.config.reader_threads, setup.config.consumer_threads)?;
		Ok(Self { setup, partitioner })
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

	/// The work distribution the next run will use.
	pub fn workload(&self) -> Workload {
		self.partitioner.partition(&self.setup.grid)
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
	/// One reader is opened per non-empty stripe before any thread starts.
	/// The first read or task error aborts the run and is returned.
	pub fn run(&mut self) -> Result<RunSummary> {
		self.setup.check_tasks()?;
		let Workload { readers, consumers } = self.workload();
		let setup = &mut self.setup;

		let tiles = setup.grid.tile_count();
		let template = setup.template();
		let queue = BoundedTileQueue::new(setup.config.read_queue_capacity, &template)?;
		queue.reset(tiles);

		let producers = readers
			.into_iter()
			.enumerate()
			.filter(|(_, regions)| !regions.is_empty())
			.map(|(id, regions)| -> Result<_> {
				let reader = setup.open_reader()?;
				Ok(ProducerWorker::new(id, reader, regions, &queue, template.clone()))
			})
			.collect::<Result<Vec<_>>>()?;
		setup.start_progress(tiles);

		Run {
			tiles,
			pool: &mut setup.pool,
			quotas: consumers.into_iter().map(ConsumerQuota::Fixed).collect(),
			template: &template,
			progress: setup.progress.as_ref(),
		}
		.execute(&queue, producers)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MemoryRaster;
	use rastile_core::TileLayout;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn workload_follows_config() {
		let raster = MemoryRaster::<u8>::from_fn(10, 10, 1, |_, _, _| 0);
		let config = PipelineConfig::default()
			.with_tile_size(1)
			.with_layout(TileLayout::Square)
			.with_reader_threads(3)
			.with_consumer_threads(4);
		let pipeline = MultiProducerPipeline::new(&raster, config).unwrap();
		let workload = pipeline.workload();
		assert_eq!(workload.readers.iter().map(Vec::len).collect::<Vec<_>>(), vec![30, 30, 40]);
		assert_eq!(workload.consumers, vec![25, 25, 25, 25]);
	}

	#[test]
	fn more_consumers_than_tiles() {
		let raster = MemoryRaster::<u8>::from_fn(4, 4, 1, |_, _, _| 0);
		let config = PipelineConfig::default()
			.with_tile_size(4)
			.with_reader_threads(2)
			.with_consumer_threads(3)
			.with_read_queue_capacity(2);
		let calls = AtomicUsize::new(0);
		let mut pipeline = MultiProducerPipeline::new(&raster, config).unwrap();
		pipeline.add_tasks_with(|_| {
			let calls = &calls;
			ConsumerTask::detached(move || {
				calls.fetch_add(1, Ordering::Relaxed);
				Ok(())
			})
		});

		let summary = pipeline.run().unwrap();
		assert_eq!(summary.tiles, 1);
		assert_eq!(summary.produced, vec![1]);
		assert_eq!(summary.consumed_per_consumer, vec![1]);
		assert_eq!(calls.load(Ordering::Relaxed), 1);
	}
}
