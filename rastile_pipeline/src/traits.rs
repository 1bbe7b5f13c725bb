//! Interfaces to the storage layer.
//!
//! The pipelines never touch files themselves. They query the raster's metadata
//! once through [`RasterSource::info`] and then open one [`TileReader`] per
//! reader thread, which fills tile blocks on request.

use anyhow::Result;
use rastile_core::{Pixel, TileBlock};

/// Size and band count of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterInfo {
	pub width: u32,
	pub height: u32,
	pub band_count: usize,
}

impl RasterInfo {
	pub fn new(width: u32, height: u32, band_count: usize) -> Self {
		Self {
			width,
			height,
			band_count,
		}
	}
}

/// Fills tile blocks with pixel data. One reader is used by exactly one thread.
pub trait TileReader<T: Pixel>: Send {
	/// Reads the block's region for the block's spectral subset, in the block's interleave.
	fn read_block(&mut self, block: &mut TileBlock<T>) -> Result<()>;
}

impl<T, F> TileReader<T> for F
where
	T: Pixel,
	F: FnMut(&mut TileBlock<T>) -> Result<()> + Send,
{
	fn read_block(&mut self, block: &mut TileBlock<T>) -> Result<()> {
		self(block)
	}
}

/// A raster dataset that can be read concurrently through independent readers.
pub trait RasterSource<T: Pixel>: Send + Sync {
	fn info(&self) -> Result<RasterInfo>;

	/// Opens a new reader. Called once per reader thread before the run starts.
	fn open_reader(&self) -> Result<Box<dyn TileReader<T> + '_>>;
}
