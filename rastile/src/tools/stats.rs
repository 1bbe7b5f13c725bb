use super::{options::PipelineArgs, source::SourceArg};
use anyhow::Result;
use parking_lot::Mutex;
use rastile_core::{PipelineConfig, Pixel, TileBlock, progress::get_progress_bar};
use rastile_pipeline::{ConsumerTask, MultiProducerPipeline, RasterSource, RunSummary, SingleProducerPipeline};
use std::fmt::Display;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// raster to analyse: a file (needs the gdal feature) or synthetic:WIDTHxHEIGHTxBANDS
	#[arg(required = true, verbatim_doc_comment)]
	source: SourceArg,

	#[command(flatten)]
	pipeline: PipelineArgs,

	/// read with several reader threads instead of one
	#[arg(long, short, display_order = 4)]
	multi: bool,

	/// show a progress bar
	#[arg(long, short, display_order = 4)]
	progress: bool,
}

/// Running statistics of one band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandStats {
	pub count: u64,
	pub min: f64,
	pub max: f64,
	pub sum: f64,
}

impl Default for BandStats {
	fn default() -> Self {
		Self {
			count: 0,
			min: f64::INFINITY,
			max: f64::NEG_INFINITY,
			sum: 0.0,
		}
	}
}

impl BandStats {
	pub fn add(&mut self, value: f64) {
		self.count += 1;
		self.min = self.min.min(value);
		self.max = self.max.max(value);
		self.sum += value;
	}

	pub fn merge(&mut self, other: &BandStats) {
		self.count += other.count;
		self.min = self.min.min(other.min);
		self.max = self.max.max(other.max);
		self.sum += other.sum;
	}

	pub fn mean(&self) -> Option<f64> {
		(self.count > 0).then(|| self.sum / self.count as f64)
	}
}

impl Display for BandStats {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.mean() {
			Some(mean) => write!(f, "min {}, max {}, mean {mean:.3}", self.min, self.max),
			None => f.write_str("no pixels"),
		}
	}
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("computing statistics of {:?}", arguments.source);

	let config = arguments.pipeline.to_config()?;
	let source = arguments.source.open()?;
	let bands = config.spectral_subset(source.info()?.band_count)?;

	let (stats, summary) = compute_stats(source.as_ref(), config, arguments.multi, arguments.progress)?;
	for (band, stats) in bands.bands().iter().zip(&stats) {
		println!("band {band}: {stats}");
	}

	eprintln!("{summary}");
	Ok(())
}

/// Streams `source` through a pipeline and returns statistics per selected band, in selection order.
pub fn compute_stats<T: Pixel>(
	source: &dyn RasterSource<T>,
	config: PipelineConfig,
	multi: bool,
	progress: bool,
) -> Result<(Vec<BandStats>, RunSummary)> {
	let band_count = config.spectral_subset(source.info()?.band_count)?.len();
	let partials: Vec<Mutex<Vec<BandStats>>> = (0..config.consumer_threads)
		.map(|_| Mutex::new(vec![BandStats::default(); band_count]))
		.collect();

	let factory = |id: usize| {
		let partial = &partials[id];
		ConsumerTask::tile(move |block: &TileBlock<T>| {
			let mut partial = partial.lock();
			for (band, stats) in partial.iter_mut().enumerate() {
				block.band_values(band).for_each(|value| stats.add(value.to_f64()));
			}
			Ok(())
		})
	};

	let progress = progress.then(|| get_progress_bar("computing statistics", 0));
	let summary = if multi {
		let mut pipeline = MultiProducerPipeline::new(source, config)?;
		pipeline.add_tasks_with(factory);
		if let Some(progress) = progress {
			pipeline.set_progress(progress);
		}
		pipeline.run()?
	} else {
		let mut pipeline = SingleProducerPipeline::new(source, config)?;
		pipeline.add_tasks_with(factory);
		if let Some(progress) = progress {
			pipeline.set_progress(progress);
		}
		pipeline.run()?
	};

	let mut totals = vec![BandStats::default(); band_count];
	for partial in partials {
		for (total, stats) in totals.iter_mut().zip(partial.into_inner().iter()) {
			total.merge(stats);
		}
	}
	Ok((totals, summary))
}
