//! Consumer threads and the tasks they run.

use crate::run_state::{RunState, Worker};
use anyhow::{Context, Result};
use rastile_core::{BoundedTileQueue, Pixel, TileBlock, progress::ProgressBar};
use std::{fmt::Debug, thread::Scope};

/// Work run by one consumer thread for every tile it takes from the queue.
pub enum ConsumerTask<'a, T: Pixel> {
	/// Called once per dequeued tile without access to it. Useful when the task
	/// only needs to be paced by the queue, for example to count or to poll state
	/// it captured itself.
	Detached(Box<dyn FnMut() -> Result<()> + Send + 'a>),

	/// Called with every dequeued tile.
	Tile(Box<dyn FnMut(&TileBlock<T>) -> Result<()> + Send + 'a>),
}

impl<'a, T: Pixel> ConsumerTask<'a, T> {
	pub fn detached(task: impl FnMut() -> Result<()> + Send + 'a) -> Self {
		ConsumerTask::Detached(Box::new(task))
	}

	pub fn tile(task: impl FnMut(&TileBlock<T>) -> Result<()> + Send + 'a) -> Self {
		ConsumerTask::Tile(Box::new(task))
	}

	fn call(&mut self, block: &TileBlock<T>) -> Result<()> {
		match self {
			ConsumerTask::Detached(task) => task(),
			ConsumerTask::Tile(task) => task(block),
		}
	}
}

impl<T: Pixel> Debug for ConsumerTask<'_, T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ConsumerTask::Detached(_) => f.write_str("ConsumerTask::Detached"),
			ConsumerTask::Tile(_) => f.write_str("ConsumerTask::Tile"),
		}
	}
}

/// How a consumer decides that it is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsumerQuota {
	/// Claim tiles from the queue's shared counter until none are left.
	Claimed,
	/// Process exactly this many tiles.
	Fixed(usize),
}

/// The processing tasks of a run, one per consumer thread.
#[derive(Debug, Default)]
pub struct ConsumerPool<'a, T: Pixel> {
	tasks: Vec<ConsumerTask<'a, T>>,
}

impl<'a, T: Pixel> ConsumerPool<'a, T> {
	pub fn new() -> Self {
		Self { tasks: Vec::new() }
	}

	pub fn add(&mut self, task: ConsumerTask<'a, T>) {
		self.tasks.push(task);
	}

	pub fn add_task(&mut self, task: impl FnMut() -> Result<()> + Send + 'a) {
		self.add(ConsumerTask::detached(task));
	}

	pub fn add_tile_task(&mut self, task: impl FnMut(&TileBlock<T>) -> Result<()> + Send + 'a) {
		self.add(ConsumerTask::tile(task));
	}

	pub fn len(&self) -> usize {
		self.tasks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tasks.is_empty()
	}

	/// Starts one consumer thread per quota, pairing the `i`-th quota with the `i`-th task.
	pub(crate) fn spawn<'scope>(
		&'scope mut self,
		scope: &'scope Scope<'scope, '_>,
		state: &'scope RunState<'_, T>,
		quotas: &[ConsumerQuota],
		template: &TileBlock<T>,
		progress: Option<&ProgressBar>,
	) -> Vec<Worker<'scope, usize>> {
		self
			.tasks
			.iter_mut()
			.zip(quotas)
			.enumerate()
			.filter_map(|(id, (task, &quota))| {
				let consumer = ConsumerWorker {
					id,
					task,
					quota,
					queue: state.queue(),
					block: template.clone(),
					progress: progress.cloned(),
				};
				state.spawn(scope, format!("rastile-consumer-{id}"), move || consumer.run())
			})
			.collect()
	}
}

struct ConsumerWorker<'w, 'a, T: Pixel> {
	id: usize,
	task: &'w mut ConsumerTask<'a, T>,
	quota: ConsumerQuota,
	queue: &'w BoundedTileQueue<T>,
	block: TileBlock<T>,
	progress: Option<ProgressBar>,
}

impl<T: Pixel> ConsumerWorker<'_, '_, T> {
	/// Returns the number of tiles processed. Stops early, without error, when the queue gets closed.
	fn run(mut self) -> Result<usize> {
		let mut processed = 0;
		loop {
			let has_work = match self.quota {
				ConsumerQuota::Claimed => self.queue.try_claim(),
				ConsumerQuota::Fixed(quota) => processed < quota,
			};
			if !has_work {
				break;
			}

			if self.queue.pop_into(&mut self.block).is_err() {
				log::debug!("consumer {} stopped after {processed} tiles: queue closed", self.id);
				return Ok(processed);
			}

			let region = *self.block.region();
			log::trace!("consumer {} processing {region:?}", self.id);
			self
				.task
				.call(&self.block)
				.with_context(|| format!("Processing task of consumer {} failed on {region:?}", self.id))?;

			processed += 1;
			if let Some(progress) = &self.progress {
				progress.inc(1);
			}
		}
		log::debug!("consumer {} finished {processed} tiles", self.id);
		Ok(processed)
	}
}
