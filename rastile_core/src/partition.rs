//! Static work distribution for runs with several reader threads.
//!
//! Readers get contiguous stripes of tile rows: every reader takes
//! `rows / readers` rows and the last reader additionally takes the leftover
//! rows. Consumers get a fixed number of tiles: `tiles / consumers` each, with
//! the remainder added to the last consumer. Both shares are known before the
//! run starts, so consumers need no shared claim counter.
//!
//! ```
//! use rastile_core::{TileGrid, TileLayout, WorkloadPartitioner};
//!
//! let grid = TileGrid::new(100, 100, 10, TileLayout::Square).unwrap();
//! let workload = WorkloadPartitioner::new(3, 4).unwrap().partition(&grid);
//! let reader_tiles: Vec<usize> = workload.readers.iter().map(|r| r.len()).collect();
//! assert_eq!(reader_tiles, vec![30, 30, 40]);
//! assert_eq!(workload.consumers, vec![25, 25, 25, 25]);
//! ```

use crate::{TileGrid, TileRegion};
use anyhow::{Result, ensure};

/// Per-thread shares of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Workload {
	/// Regions each reader produces, in grid order.
	pub readers: Vec<Vec<TileRegion>>,
	/// Number of tiles each consumer processes.
	pub consumers: Vec<usize>,
}

impl Workload {
	pub fn tile_count(&self) -> usize {
		self.readers.iter().map(Vec::len).sum()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkloadPartitioner {
	reader_count: usize,
	consumer_count: usize,
}

impl WorkloadPartitioner {
	pub fn new(reader_count: usize, consumer_count: usize) -> Result<Self> {
		ensure!(reader_count >= 1, "at least one reader thread is required");
		ensure!(consumer_count >= 1, "at least one consumer thread is required");
		Ok(Self {
			reader_count,
			consumer_count,
		})
	}

	pub fn reader_count(&self) -> usize {
		self.reader_count
	}

	pub fn consumer_count(&self) -> usize {
		self.consumer_count
	}

	/// Consumer count actually used for `tile_count` tiles: never more consumers than tiles, never fewer than one.
	pub fn effective_consumers(&self, tile_count: usize) -> usize {
		self.consumer_count.clamp(1, tile_count.max(1))
	}

	/// Splits the tile rows of `grid` into one contiguous stripe per reader.
	///
	/// Readers that receive no rows get an empty list.
	pub fn partition_readers(&self, grid: &TileGrid) -> Vec<Vec<TileRegion>> {
		let rows = grid.region_rows();
		let per_reader = rows.len() / self.reader_count;

		let mut readers: Vec<Vec<TileRegion>> = vec![Vec::new(); self.reader_count];
		for (row_index, row) in rows.into_iter().enumerate() {
			let reader = if per_reader == 0 {
				self.reader_count - 1
			} else {
				(row_index / per_reader).min(self.reader_count - 1)
			};
			readers[reader].extend(row);
		}
		readers
	}

	/// Number of tiles each of the [effective](Self::effective_consumers) consumers processes.
	pub fn partition_consumers(&self, tile_count: usize) -> Vec<usize> {
		let consumers = self.effective_consumers(tile_count);
		let mut shares = vec![tile_count / consumers; consumers];
		shares[consumers - 1] += tile_count % consumers;
		shares
	}

	pub fn partition(&self, grid: &TileGrid) -> Workload {
		let workload = Workload {
			readers: self.partition_readers(grid),
			consumers: self.partition_consumers(grid.tile_count()),
		};
		log::debug!(
			"partitioned {} tiles: readers {:?}, consumers {:?}",
			grid.tile_count(),
			workload.readers.iter().map(Vec::len).collect::<Vec<_>>(),
			workload.consumers
		);
		workload
	}
}
