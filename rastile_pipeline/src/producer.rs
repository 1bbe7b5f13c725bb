use crate::TileReader;
use anyhow::Result;
use rastile_core::{BoundedTileQueue, Pixel, TileBlock, TileRegion};
use rastile_derive::context;

/// Reads a fixed list of tiles, in order, and pushes each into the queue.
///
/// The worker fills its own block outside the queue lock; only the copy into a
/// queue slot is serialized with other producers and consumers.
pub struct ProducerWorker<'q, 'r, T: Pixel> {
	id: usize,
	reader: Box<dyn TileReader<T> + 'r>,
	regions: Vec<TileRegion>,
	queue: &'q BoundedTileQueue<T>,
	block: TileBlock<T>,
}

impl<'q, 'r, T: Pixel> ProducerWorker<'q, 'r, T> {
	pub fn new(
		id: usize,
		reader: Box<dyn TileReader<T> + 'r>,
		regions: Vec<TileRegion>,
		queue: &'q BoundedTileQueue<T>,
		block: TileBlock<T>,
	) -> Self {
		Self {
			id,
			reader,
			regions,
			queue,
			block,
		}
	}

	pub fn id(&self) -> usize {
		self.id
	}

	pub fn tile_count(&self) -> usize {
		self.regions.len()
	}

	/// Produces every assigned tile. Returns the number of tiles pushed.
	///
	/// Stops early, without error, when the queue gets closed. A failed read is returned as error.
	pub fn run(mut self) -> Result<usize> {
		let regions = std::mem::take(&mut self.regions);
		let mut produced = 0;
		for region in regions {
			self.read(region)?;
			if self.queue.push(&self.block).is_err() {
				log::debug!("producer {} stopped after {produced} tiles: queue closed", self.id);
				return Ok(produced);
			}
			log::trace!("producer {} pushed {region:?}", self.id);
			produced += 1;
		}
		log::debug!("producer {} finished {produced} tiles", self.id);
		Ok(produced)
	}

	#[context("Failed to read {region:?}")]
	fn read(&mut self, region: TileRegion) -> Result<()> {
		self.block.update_spatial(region)?;
		self.reader.read_block(&mut self.block)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::bail;
	use rastile_core::{Interleave, SpectralSubset, TileGrid, TileLayout};

	fn setup() -> (TileGrid, TileBlock<u32>) {
		let grid = TileGrid::new(4, 4, 2, TileLayout::Square).unwrap();
		let block = TileBlock::for_grid(&grid, SpectralSubset::all(1), Interleave::Bip);
		(grid, block)
	}

	#[test]
	fn pushes_regions_in_order() {
		let (grid, block) = setup();
		let queue = BoundedTileQueue::new(8, &block).unwrap();
		let reader = |block: &mut TileBlock<u32>| {
			let index = block.region().index as u32;
			block.data_mut().fill(index);
			Ok(())
		};
		let producer = ProducerWorker::new(0, Box::new(reader), grid.regions(), &queue, block);
		assert_eq!(producer.tile_count(), 4);
		assert_eq!(producer.run().unwrap(), 4);

		for index in 0..4 {
			let tile = queue.pop().unwrap();
			assert_eq!(tile.region().index, index);
			assert!(tile.data().iter().all(|v| *v == index as u32));
		}
	}

	#[test]
	fn read_error_names_the_region() {
		let (grid, block) = setup();
		let queue = BoundedTileQueue::new(8, &block).unwrap();
		let reader = |block: &mut TileBlock<u32>| {
			if block.region().index == 2 {
				bail!("disk on fire");
			}
			Ok(())
		};
		let producer = ProducerWorker::new(0, Box::new(reader), grid.regions(), &queue, block);
		let err = producer.run().unwrap_err();
		assert_eq!(format!("{err:#}"), "Failed to read TileRegion#2(0, 2, 2x2): disk on fire");
		assert_eq!(queue.len(), 2);
	}

	#[test]
	fn closed_queue_stops_quietly() {
		let (grid, block) = setup();
		let queue = BoundedTileQueue::new(8, &block).unwrap();
		queue.close();
		let producer = ProducerWorker::new(0, Box::new(|_: &mut TileBlock<u32>| Ok(())), grid.regions(), &queue, block);
		assert_eq!(producer.run().unwrap(), 0);
	}
}
