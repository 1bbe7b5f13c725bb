//! Turns a command-line source argument into a raster.

use anyhow::{Context, Result, bail};
use rastile_pipeline::{MemoryRaster, RasterSource};
use std::str::FromStr;

/// A raster named on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceArg {
	/// `synthetic:WIDTHxHEIGHTxBANDS`, a generated test pattern.
	Synthetic { width: u32, height: u32, bands: usize },
	/// A raster file, read through GDAL.
	File(String),
}

impl FromStr for SourceArg {
	type Err = anyhow::Error;

	fn from_str(value: &str) -> Result<Self> {
		let Some(size) = value.strip_prefix("synthetic:") else {
			return Ok(SourceArg::File(value.to_string()));
		};
		let parts: Vec<&str> = size.split('x').collect();
		if parts.len() != 3 {
			bail!("Invalid synthetic source '{value}'. Expected synthetic:WIDTHxHEIGHTxBANDS");
		}
		let context = || format!("Invalid synthetic source '{value}'");
		Ok(SourceArg::Synthetic {
			width: parts[0].parse().with_context(context)?,
			height: parts[1].parse().with_context(context)?,
			bands: parts[2].parse().with_context(context)?,
		})
	}
}

impl SourceArg {
	pub fn open(&self) -> Result<Box<dyn RasterSource<f64>>> {
		match self {
			SourceArg::Synthetic { width, height, bands } => {
				log::debug!("generating synthetic {width}x{height} raster with {bands} band(s)");
				Ok(Box::new(synthetic(*width, *height, *bands)))
			}
			SourceArg::File(path) => open_file(path),
		}
	}
}

/// A deterministic pattern: band `b` cycles through `0..=255` with a band-specific offset.
pub fn synthetic(width: u32, height: u32, bands: usize) -> MemoryRaster<f64> {
	MemoryRaster::from_fn(width, height, bands, |x, y, band| {
		((x as usize * 7 + y as usize * 13 + band * 31) % 256) as f64
	})
}

#[cfg(feature = "gdal")]
fn open_file(path: &str) -> Result<Box<dyn RasterSource<f64>>> {
	let raster = rastile_pipeline::GdalRaster::open(std::path::Path::new(path))?;
	Ok(Box::new(raster))
}

#[cfg(not(feature = "gdal"))]
fn open_file(path: &str) -> Result<Box<dyn RasterSource<f64>>> {
	bail!("Cannot open '{path}': reading raster files requires the 'gdal' feature")
}
