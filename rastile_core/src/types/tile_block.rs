//! A reusable tile buffer.
//!
//! A [`TileBlock`] pairs a [`TileRegion`] with the pixel payload of that region.
//! Its buffer is allocated once for the largest tile of a grid and then recycled:
//! [`TileBlock::update_spatial`] only rewrites the descriptor, readers overwrite
//! the payload, and [`TileBlock::copy_from`] moves a tile between blocks without
//! allocating.

use crate::{Interleave, Pixel, SpectralSubset, TileGrid, TileRegion};
use anyhow::{Result, ensure};
use std::fmt::Debug;

#[derive(Clone)]
pub struct TileBlock<T: Pixel> {
	region: TileRegion,
	max_width: u32,
	max_height: u32,
	spectral: SpectralSubset,
	interleave: Interleave,
	data: Vec<T>,
}

impl<T: Pixel> TileBlock<T> {
	/// Allocates a block able to hold `max_width × max_height` pixels of every band in `spectral`.
	pub fn new(max_width: u32, max_height: u32, spectral: SpectralSubset, interleave: Interleave) -> Self {
		let capacity = max_width as usize * max_height as usize * spectral.len();
		Self {
			region: TileRegion::default(),
			max_width,
			max_height,
			spectral,
			interleave,
			data: vec![T::default(); capacity],
		}
	}

	/// Allocates a block large enough for every tile of `grid`.
	pub fn for_grid(grid: &TileGrid, spectral: SpectralSubset, interleave: Interleave) -> Self {
		let (width, height) = grid.max_tile_size();
		Self::new(width, height, spectral, interleave)
	}

	pub fn region(&self) -> &TileRegion {
		&self.region
	}

	pub fn spectral(&self) -> &SpectralSubset {
		&self.spectral
	}

	pub fn interleave(&self) -> Interleave {
		self.interleave
	}

	pub fn band_count(&self) -> usize {
		self.spectral.len()
	}

	pub fn max_size(&self) -> (u32, u32) {
		(self.max_width, self.max_height)
	}

	/// Points the block at a new region. The payload is left untouched until a reader fills it.
	pub fn update_spatial(&mut self, region: TileRegion) -> Result<()> {
		ensure!(
			region.width <= self.max_width && region.height <= self.max_height,
			"{region:?} does not fit into a {}x{} tile block",
			self.max_width,
			self.max_height
		);
		self.region = region;
		Ok(())
	}

	/// Number of valid payload elements for the current region.
	pub fn len(&self) -> usize {
		self.region.pixel_count() * self.spectral.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The payload of the current region, laid out according to [`Self::interleave`].
	pub fn data(&self) -> &[T] {
		&self.data[..self.len()]
	}

	pub fn data_mut(&mut self) -> &mut [T] {
		let len = self.len();
		&mut self.data[..len]
	}

	/// Payload index of pixel `(x, y)` (relative to the tile origin) in band position `band`.
	#[inline]
	pub fn index(&self, x: usize, y: usize, band: usize) -> usize {
		debug_assert!(x < self.region.width as usize && y < self.region.height as usize);
		debug_assert!(band < self.spectral.len());
		self.interleave.index(
			x,
			y,
			band,
			self.region.width as usize,
			self.region.height as usize,
			self.spectral.len(),
		)
	}

	#[inline]
	pub fn get(&self, x: usize, y: usize, band: usize) -> T {
		self.data[self.index(x, y, band)]
	}

	#[inline]
	pub fn set(&mut self, x: usize, y: usize, band: usize, value: T) {
		let index = self.index(x, y, band);
		self.data[index] = value;
	}

	/// All values of one band position, row-major.
	pub fn band_values(&self, band: usize) -> impl Iterator<Item = T> + '_ {
		let width = self.region.width as usize;
		let height = self.region.height as usize;
		(0..height).flat_map(move |y| (0..width).map(move |x| self.get(x, y, band)))
	}

	/// Copies descriptor and valid payload of `other` into this block, reusing the existing buffer.
	pub fn copy_from(&mut self, other: &TileBlock<T>) {
		self.max_width = self.max_width.max(other.max_width);
		self.max_height = self.max_height.max(other.max_height);
		if self.spectral != other.spectral {
			self.spectral = other.spectral.clone();
		}
		// storage must cover every region `update_spatial` accepts
		let capacity = self.max_width as usize * self.max_height as usize * self.spectral.len();
		if self.data.len() < capacity {
			self.data.resize(capacity, T::default());
		}
		self.interleave = other.interleave;
		self.region = other.region;
		let len = other.len();
		self.data[..len].copy_from_slice(&other.data[..len]);
	}
}

impl<T: Pixel> Debug for TileBlock<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TileBlock")
			.field("region", &self.region)
			.field("max_size", &(self.max_width, self.max_height))
			.field("spectral", &self.spectral)
			.field("interleave", &self.interleave)
			.finish_non_exhaustive()
	}
}
