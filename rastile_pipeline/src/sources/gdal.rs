//! Rasters read through GDAL.

use crate::{RasterInfo, RasterSource, TileReader};
use anyhow::{Context, Result};
use gdal::{Dataset, raster::GdalType};
use rastile_core::{Pixel, TileBlock};
use rastile_derive::context;
use std::path::{Path, PathBuf};

/// A raster file opened through GDAL. Every reader opens its own dataset handle.
#[derive(Debug)]
pub struct GdalRaster {
	path: PathBuf,
	info: RasterInfo,
}

impl GdalRaster {
	#[context("Failed to open GDAL raster {path:?}")]
	pub fn open(path: &Path) -> Result<Self> {
		let dataset = Dataset::open(path)?;
		let (width, height) = dataset.raster_size();
		let info = RasterInfo::new(
			u32::try_from(width).context("raster width exceeds u32")?,
			u32::try_from(height).context("raster height exceeds u32")?,
			dataset.raster_count(),
		);
		log::debug!("opened {path:?}: {info:?}");
		Ok(Self {
			path: path.to_path_buf(),
			info,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl<T: Pixel + GdalType> RasterSource<T> for GdalRaster {
	fn info(&self) -> Result<RasterInfo> {
		Ok(self.info)
	}

	fn open_reader(&self) -> Result<Box<dyn TileReader<T> + '_>> {
		let dataset =
			Dataset::open(&self.path).with_context(|| format!("Failed to open GDAL dataset {:?}", self.path))?;
		Ok(Box::new(GdalReader { dataset }))
	}
}

struct GdalReader {
	dataset: Dataset,
}

impl<T: Pixel + GdalType> TileReader<T> for GdalReader {
	fn read_block(&mut self, block: &mut TileBlock<T>) -> Result<()> {
		let region = *block.region();
		let window = (region.x_offset as isize, region.y_offset as isize);
		let size = (region.width as usize, region.height as usize);
		let spectral = block.spectral().clone();

		for (position, &band) in spectral.bands().iter().enumerate() {
			let buffer = self
				.dataset
				.rasterband(band)
				.with_context(|| format!("Failed to get raster band {band}"))?
				.read_as::<T>(window, size, size, None)
				.with_context(|| format!("Failed to read band {band} of {region:?}"))?;

			for (offset, value) in buffer.data().iter().enumerate() {
				block.set(offset % size.0, offset / size.0, position, *value);
			}
		}
		Ok(())
	}
}
