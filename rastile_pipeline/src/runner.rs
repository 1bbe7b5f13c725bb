//! Thread orchestration shared by both pipeline variants.

use crate::{
	ConsumerPool, ConsumerQuota, ConsumerTask, ProducerWorker, RasterInfo, RasterSource, RunSummary, TileReader,
	run_state::RunState,
};
use anyhow::{Context, Result, ensure};
use rastile_core::{BoundedTileQueue, PipelineConfig, Pixel, SpectralSubset, TileBlock, TileGrid, progress::ProgressBar};
use rastile_derive::context;
use std::{thread, time::Instant};

/// Everything a pipeline knows before a run: source, configuration, tile grid and tasks.
pub(crate) struct Setup<'a, T: Pixel> {
	pub source: &'a dyn RasterSource<T>,
	pub config: PipelineConfig,
	pub info: RasterInfo,
	pub grid: TileGrid,
	pub spectral: SpectralSubset,
	pub pool: ConsumerPool<'a, T>,
	pub progress: Option<ProgressBar>,
}

impl<'a, T: Pixel> Setup<'a, T> {
	#[context("Failed to set up pipeline")]
	pub fn new(source: &'a dyn RasterSource<T>, config: PipelineConfig) -> Result<Self> {
		config.validate()?;
		let info = source.info().context("Failed to query raster metadata")?;
		let spectral = config.spectral_subset(info.band_count)?;
		let grid = TileGrid::new(info.width, info.height, config.tile_size, config.layout)?;
		log::debug!(
			"{}x{} raster with {} band(s): {} {} tiles of size {}, bands {:?}",
			info.width,
			info.height,
			info.band_count,
			grid.tile_count(),
			grid.layout(),
			grid.tile_size(),
			spectral.bands()
		);
		Ok(Self {
			source,
			config,
			info,
			grid,
			spectral,
			pool: ConsumerPool::new(),
			progress: None,
		})
	}

	pub fn add_tasks_with(&mut self, mut factory: impl FnMut(usize) -> ConsumerTask<'a, T>) {
		for id in 0..self.config.consumer_threads {
			self.pool.add(factory(id));
		}
	}

	pub fn check_tasks(&self) -> Result<()> {
		ensure!(
			self.pool.len() == self.config.consumer_threads,
			"expected {} processing tasks, one per consumer thread, got {}",
			self.config.consumer_threads,
			self.pool.len()
		);
		Ok(())
	}

	pub fn open_reader(&self) -> Result<Box<dyn TileReader<T> + 'a>> {
		let source = self.source;
		source.open_reader().context("Failed to open raster reader")
	}

	/// A block sized for the largest tile of the grid.
	pub fn template(&self) -> TileBlock<T> {
		TileBlock::for_grid(&self.grid, self.spectral.clone(), self.config.interleave)
	}

	pub fn start_progress(&self, tiles: usize) {
		if let Some(progress) = &self.progress {
			progress.set_max_value(tiles as u64);
			progress.set_position(0);
		}
	}
}

pub(crate) struct Run<'p, 'a, T: Pixel> {
	pub tiles: usize,
	pub pool: &'p mut ConsumerPool<'a, T>,
	pub quotas: Vec<ConsumerQuota>,
	pub template: &'p TileBlock<T>,
	pub progress: Option<&'p ProgressBar>,
}

impl<T: Pixel> Run<'_, '_, T> {
	/// Starts every producer and consumer, waits for all of them and checks that every tile went through.
	pub fn execute(self, queue: &BoundedTileQueue<T>, producers: Vec<ProducerWorker<'_, '_, T>>) -> Result<RunSummary> {
		let start = Instant::now();
		let Run {
			tiles,
			pool,
			quotas,
			template,
			progress,
		} = self;

		log::debug!(
			"starting {} producer(s) and {} consumer(s) for {tiles} tiles, queue capacity {}",
			producers.len(),
			quotas.len(),
			queue.capacity()
		);

		let state = RunState::new(queue);
		let (produced, consumed_per_consumer) = thread::scope(|scope| {
			let producer_workers: Vec<_> = producers
				.into_iter()
				.filter_map(|producer| {
					let name = format!("rastile-producer-{}", producer.id());
					state.spawn(scope, name, move || producer.run())
				})
				.collect();
			let consumer_workers = pool.spawn(scope, &state, &quotas, template, progress);

			let produced: Vec<usize> = producer_workers
				.into_iter()
				.map(|worker| worker.join(&state).unwrap_or(0))
				.collect();
			let consumed: Vec<usize> = consumer_workers
				.into_iter()
				.map(|worker| worker.join(&state).unwrap_or(0))
				.collect();
			(produced, consumed)
		});

		if let Err(err) = state.into_result() {
			if let Some(progress) = progress {
				progress.abandon();
			}
			return Err(err);
		}

		let summary = RunSummary {
			tiles,
			produced,
			consumed_per_consumer,
			elapsed: start.elapsed(),
		};
		ensure!(
			summary.total_produced() == tiles && summary.total_consumed() == tiles,
			"run lost tiles: {tiles} expected, {} produced, {} consumed",
			summary.total_produced(),
			summary.total_consumed()
		);

		if let Some(progress) = progress {
			progress.finish();
		}
		log::debug!("finished {summary}");
		Ok(summary)
	}
}
