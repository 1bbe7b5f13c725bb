//! Run options shared by both pipeline variants.
//!
//! Configurations are usually built in code, but can also be loaded from YAML:
//!
//! ```
//! use rastile_core::{PipelineConfig, TileLayout};
//!
//! let config = PipelineConfig::from_string("tile_size: 256\nlayout: row-strip\nconsumer_threads: 2").unwrap();
//! assert_eq!(config.tile_size, 256);
//! assert_eq!(config.layout, TileLayout::RowStrip);
//! assert_eq!(config.queue_capacity, 16);
//! ```

use crate::{Interleave, SpectralSubset, TileLayout};
use anyhow::{Result, ensure};
use rastile_derive::context;
use serde::Deserialize;
use std::{fs::File, io::BufReader, io::Read, path::Path};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
	/// Number of consumer threads, each bound to one processing task.
	pub consumer_threads: usize,

	/// Slots of the tile queue in the single-reader pipeline.
	pub queue_capacity: usize,

	/// Edge length of square tiles, or height of row strips, in pixels.
	pub tile_size: u32,

	/// How the raster is cut into tiles.
	pub layout: TileLayout,

	/// Channel ordering of tile payloads.
	pub interleave: Interleave,

	/// 1-based band indices to read. All bands when omitted.
	pub bands: Option<Vec<usize>>,

	/// Number of reader threads in the multi-reader pipeline.
	pub reader_threads: usize,

	/// Slots of the shared tile queue in the multi-reader pipeline.
	pub read_queue_capacity: usize,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			consumer_threads: num_cpus::get(),
			queue_capacity: 16,
			tile_size: 128,
			layout: TileLayout::Square,
			interleave: Interleave::Bip,
			bands: None,
			reader_threads: 4,
			read_queue_capacity: 16,
		}
	}
}

impl PipelineConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	#[context("Failed to read pipeline config {path:?}")]
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path)?;
		let config = Self::from_reader(BufReader::new(file))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		ensure!(self.consumer_threads >= 1, "consumer_threads must be at least 1");
		ensure!(self.reader_threads >= 1, "reader_threads must be at least 1");
		ensure!(self.tile_size >= 1, "tile_size must be at least 1");
		ensure!(
			self.queue_capacity >= 2,
			"queue_capacity must be at least 2, got {}",
			self.queue_capacity
		);
		ensure!(
			self.read_queue_capacity >= 2,
			"read_queue_capacity must be at least 2, got {}",
			self.read_queue_capacity
		);
		if let Some(bands) = &self.bands {
			ensure!(!bands.is_empty(), "bands must not be empty when given");
		}
		Ok(())
	}

	/// The selected bands for a dataset with `band_count` bands.
	pub fn spectral_subset(&self, band_count: usize) -> Result<SpectralSubset> {
		let subset = match &self.bands {
			Some(bands) => SpectralSubset::from_bands(bands.clone()),
			None => SpectralSubset::all(band_count),
		};
		subset.validate(band_count)?;
		Ok(subset)
	}

	pub fn with_consumer_threads(mut self, consumer_threads: usize) -> Self {
		self.consumer_threads = consumer_threads;
		self
	}

	pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
		self.queue_capacity = queue_capacity;
		self
	}

	pub fn with_tile_size(mut self, tile_size: u32) -> Self {
		self.tile_size = tile_size;
		self
	}

	pub fn with_layout(mut self, layout: TileLayout) -> Self {
		self.layout = layout;
		self
	}

	pub fn with_interleave(mut self, interleave: Interleave) -> Self {
		self.interleave = interleave;
		self
	}

	pub fn with_bands(mut self, bands: Vec<usize>) -> Self {
		self.bands = Some(bands);
		self
	}

	pub fn with_reader_threads(mut self, reader_threads: usize) -> Self {
		self.reader_threads = reader_threads;
		self
	}

	pub fn with_read_queue_capacity(mut self, read_queue_capacity: usize) -> Self {
		self.read_queue_capacity = read_queue_capacity;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::io::Write;

	#[test]
	fn empty_yaml_is_default() {
		assert_eq!(PipelineConfig::from_string("").unwrap(), PipelineConfig::default());
	}

	#[test]
	fn full_yaml() {
		let yaml = "
consumer_threads: 3
queue_capacity: 8
tile_size: 64
layout: square
interleave: bsq
bands: [3, 2, 1]
reader_threads: 2
read_queue_capacity: 32
";
		assert_eq!(
			PipelineConfig::from_string(yaml).unwrap(),
			PipelineConfig {
				consumer_threads: 3,
				queue_capacity: 8,
				tile_size: 64,
				layout: TileLayout::Square,
				interleave: Interleave::Bsq,
				bands: Some(vec![3, 2, 1]),
				reader_threads: 2,
				read_queue_capacity: 32,
			}
		);
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(PipelineConfig::from_string("tilesize: 3").is_err());
		assert!(PipelineConfig::from_string("layout: hexagon").is_err());
	}

	#[test]
	fn validation() {
		let ok = PipelineConfig::default().with_consumer_threads(1);
		assert!(ok.validate().is_ok());
		assert!(ok.clone().with_consumer_threads(0).validate().is_err());
		assert!(ok.clone().with_reader_threads(0).validate().is_err());
		assert!(ok.clone().with_tile_size(0).validate().is_err());
		assert!(ok.clone().with_read_queue_capacity(1).validate().is_err());
		assert!(ok.clone().with_bands(vec![]).validate().is_err());
		assert_eq!(
			ok.with_queue_capacity(1).validate().unwrap_err().to_string(),
			"queue_capacity must be at least 2, got 1"
		);
	}

	#[test]
	fn spectral_subset() {
		let config = PipelineConfig::default();
		assert_eq!(config.spectral_subset(3).unwrap().bands(), &[1, 2, 3]);
		let config = config.with_bands(vec![2]);
		assert_eq!(config.spectral_subset(3).unwrap().bands(), &[2]);
		assert!(config.spectral_subset(1).is_err());
	}

	#[test]
	fn from_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "tile_size: 32\nreader_threads: 3").unwrap();
		let config = PipelineConfig::from_path(file.path()).unwrap();
		assert_eq!(config.tile_size, 32);
		assert_eq!(config.reader_threads, 3);

		let mut invalid = tempfile::NamedTempFile::new().unwrap();
		writeln!(invalid, "queue_capacity: 1").unwrap();
		let err = PipelineConfig::from_path(invalid.path()).unwrap_err();
		assert!(err.to_string().starts_with("Failed to read pipeline config"));
	}
}
