use anyhow::Result;
use rastile_core::{Interleave, PipelineConfig, TileLayout};
use std::path::PathBuf;

/// Pipeline options shared by all subcommands. Values given here override the config file.
#[derive(clap::Args, Debug, Default)]
pub struct PipelineArgs {
	/// YAML file with pipeline settings
	#[arg(long, short, value_name = "FILE", display_order = 1)]
	pub config: Option<PathBuf>,

	/// edge length of square tiles, or height of row strips, in pixels
	#[arg(long, short, value_name = "int", display_order = 2)]
	pub tile_size: Option<u32>,

	/// how the raster is cut into tiles
	#[arg(long, short, value_enum, display_order = 2)]
	pub layout: Option<TileLayout>,

	/// channel ordering of tile payloads
	#[arg(long, value_enum, display_order = 2)]
	pub interleave: Option<Interleave>,

	/// 1-based bands to read, e.g. "1,3"
	#[arg(long, short, value_name = "int,...", value_delimiter = ',', display_order = 2)]
	pub bands: Option<Vec<usize>>,

	/// number of consumer threads
	#[arg(long, short = 'j', value_name = "int", display_order = 3)]
	pub threads: Option<usize>,

	/// number of reader threads, only used with --multi
	#[arg(long, short, value_name = "int", display_order = 3)]
	pub readers: Option<usize>,

	/// number of tile slots in the queue
	#[arg(long, value_name = "int", display_order = 3)]
	pub queue: Option<usize>,
}

impl PipelineArgs {
	/// The configuration from `--config` (or the defaults), with every given option applied on top.
	pub fn to_config(&self) -> Result<PipelineConfig> {
		let mut config = match &self.config {
			Some(path) => PipelineConfig::from_path(path)?,
			None => PipelineConfig::default(),
		};
		if let Some(tile_size) = self.tile_size {
			config.tile_size = tile_size;
		}
		if let Some(layout) = self.layout {
			config.layout = layout;
		}
		if let Some(interleave) = self.interleave {
			config.interleave = interleave;
		}
		if let Some(bands) = &self.bands {
			config.bands = Some(bands.clone());
		}
		if let Some(threads) = self.threads {
			config.consumer_threads = threads;
		}
		if let Some(readers) = self.readers {
			config.reader_threads = readers;
		}
		if let Some(queue) = self.queue {
			config.queue_capacity = queue;
			config.read_queue_capacity = queue;
		}
		config.validate()?;
		log::debug!("pipeline config: {config:?}");
		Ok(config)
	}
}
