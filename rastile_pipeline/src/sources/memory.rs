//! An in-memory raster, used for synthetic data and in tests.

use crate::{RasterInfo, RasterSource, TileReader};
use anyhow::{Result, ensure};
use rastile_core::{Pixel, TileBlock};
use std::fmt::Debug;

/// A raster held in memory, stored band-sequentially.
///
/// Bands are addressed 1-based, like everywhere else in rastile.
#[derive(Clone, PartialEq)]
pub struct MemoryRaster<T: Pixel> {
	width: u32,
	height: u32,
	band_count: usize,
	data: Vec<T>,
}

impl<T: Pixel> MemoryRaster<T> {
	pub fn new(width: u32, height: u32, band_count: usize, data: Vec<T>) -> Result<Self> {
		let expected = width as usize * height as usize * band_count;
		ensure!(
			data.len() == expected,
			"a {width}x{height} raster with {band_count} band(s) needs {expected} values, got {}",
			data.len()
		);
		Ok(Self {
			width,
			height,
			band_count,
			data,
		})
	}

	/// Builds a raster by evaluating `value(x, y, band)` for every pixel of every band.
	pub fn from_fn(width: u32, height: u32, band_count: usize, value: impl Fn(u32, u32, usize) -> T) -> Self {
		let mut data = Vec::with_capacity(width as usize * height as usize * band_count);
		for band in 1..=band_count {
			for y in 0..height {
				for x in 0..width {
					data.push(value(x, y, band));
				}
			}
		}
		Self {
			width,
			height,
			band_count,
			data,
		}
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn band_count(&self) -> usize {
		self.band_count
	}

	#[inline]
	pub fn get(&self, x: u32, y: u32, band: usize) -> T {
		let offset = ((band - 1) * self.height as usize + y as usize) * self.width as usize + x as usize;
		self.data[offset]
	}
}

impl<T: Pixel> Debug for MemoryRaster<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "MemoryRaster({}x{}x{})", self.width, self.height, self.band_count)
	}
}

impl<T: Pixel> RasterSource<T> for MemoryRaster<T> {
	fn info(&self) -> Result<RasterInfo> {
		Ok(RasterInfo::new(self.width, self.height, self.band_count))
	}

	fn open_reader(&self) -> Result<Box<dyn TileReader<T> + '_>> {
		Ok(Box::new(MemoryReader { raster: self }))
	}
}

struct MemoryReader<'r, T: Pixel> {
	raster: &'r MemoryRaster<T>,
}

impl<T: Pixel> TileReader<T> for MemoryReader<'_, T> {
	fn read_block(&mut self, block: &mut TileBlock<T>) -> Result<()> {
		let raster = self.raster;
		let region = *block.region();
		ensure!(
			region.x_end() <= raster.width && region.y_end() <= raster.height,
			"{region:?} lies outside of {raster:?}"
		);

		let spectral = block.spectral().clone();
		for (position, &band) in spectral.bands().iter().enumerate() {
			ensure!(
				(1..=raster.band_count).contains(&band),
				"band {band} does not exist in {raster:?}"
			);
			for y in 0..region.height {
				for x in 0..region.width {
					let value = raster.get(region.x_offset + x, region.y_offset + y, band);
					block.set(x as usize, y as usize, position, value);
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rastile_core::{Interleave, SpectralSubset, TileRegion};
	use rstest::rstest;

	#[test]
	fn new_checks_data_length() {
		assert!(MemoryRaster::new(2, 2, 1, vec![0u8; 4]).is_ok());
		assert_eq!(
			MemoryRaster::new(2, 2, 2, vec![0u8; 4]).unwrap_err().to_string(),
			"a 2x2 raster with 2 band(s) needs 8 values, got 4"
		);
	}

	#[test]
	fn from_fn_is_band_sequential() {
		let raster = MemoryRaster::<u16>::from_fn(3, 2, 2, |x, y, band| (band * 100) as u16 + (y * 10 + x) as u16);
		assert_eq!(raster.get(0, 0, 1), 100);
		assert_eq!(raster.get(2, 1, 1), 112);
		assert_eq!(raster.get(1, 0, 2), 201);
		assert_eq!(format!("{raster:?}"), "MemoryRaster(3x2x2)");
		assert_eq!(raster.info().unwrap(), RasterInfo::new(3, 2, 2));
	}

	#[rstest]
	#[case::bip(Interleave::Bip, vec![311, 411, 312, 412, 321, 421, 322, 422])]
	#[case::bil(Interleave::Bil, vec![311, 312, 411, 412, 321, 322, 421, 422])]
	#[case::bsq(Interleave::Bsq, vec![311, 312, 321, 322, 411, 412, 421, 422])]
	fn reads_region_in_interleave(#[case] interleave: Interleave, #[case] expected: Vec<u32>) {
		let raster = MemoryRaster::<u32>::from_fn(4, 4, 4, |x, y, band| band as u32 * 100 + y * 10 + x);
		let mut block = TileBlock::new(2, 2, SpectralSubset::from_bands(vec![3, 4]), interleave);
		block.update_spatial(TileRegion::new(0, 1, 1, 2, 2)).unwrap();

		let mut reader = raster.open_reader().unwrap();
		reader.read_block(&mut block).unwrap();
		assert_eq!(block.data(), expected.as_slice());
	}

	#[test]
	fn rejects_regions_outside_the_raster() {
		let raster = MemoryRaster::<u8>::from_fn(2, 2, 1, |_, _, _| 0);
		let mut block = TileBlock::new(4, 4, SpectralSubset::all(1), Interleave::Bip);
		block.update_spatial(TileRegion::new(0, 0, 0, 3, 2)).unwrap();
		let err = raster.open_reader().unwrap().read_block(&mut block).unwrap_err();
		assert_eq!(err.to_string(), "TileRegion#0(0, 0, 3x2) lies outside of MemoryRaster(2x2x1)");
	}

	#[test]
	fn rejects_unknown_bands() {
		let raster = MemoryRaster::<u8>::from_fn(2, 2, 1, |_, _, _| 0);
		let mut block = TileBlock::new(2, 2, SpectralSubset::from_bands(vec![2]), Interleave::Bip);
		block.update_spatial(TileRegion::new(0, 0, 0, 2, 2)).unwrap();
		let err = raster.open_reader().unwrap().read_block(&mut block).unwrap_err();
		assert_eq!(err.to_string(), "band 2 does not exist in MemoryRaster(2x2x1)");
	}
}
