use super::{options::PipelineArgs, source::SourceArg};
use anyhow::Result;
use itertools::Itertools;
use rastile_core::{TileGrid, WorkloadPartitioner};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// raster to probe: a file (needs the gdal feature) or synthetic:WIDTHxHEIGHTxBANDS
	#[arg(required = true, verbatim_doc_comment)]
	source: SourceArg,

	#[command(flatten)]
	pipeline: PipelineArgs,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.source);
	print!("{}", describe(arguments)?);
	Ok(())
}

fn describe(arguments: &Subcommand) -> Result<String> {
	let config = arguments.pipeline.to_config()?;
	let source = arguments.source.open()?;
	let info = source.info()?;
	let spectral = config.spectral_subset(info.band_count)?;
	let grid = TileGrid::new(info.width, info.height, config.tile_size, config.layout)?;
	let workload = WorkloadPartitioner::new(config.reader_threads, config.consumer_threads)?.partition(&grid);
	let (tile_width, tile_height) = grid.max_tile_size();

	let mut lines = vec![
		format!("raster: {}x{}, {} band(s)", info.width, info.height, info.band_count),
		format!("bands: {}", spectral.bands().iter().join(", ")),
		format!(
			"grid: {} tiles, {} columns x {} rows, largest tile {tile_width}x{tile_height}",
			grid.layout(),
			grid.columns(),
			grid.rows()
		),
		format!("tiles: {}", grid.tile_count()),
		format!("interleave: {}", config.interleave),
	];
	lines.push(format!(
		"readers: {}",
		workload.readers.iter().map(|stripe| stripe.len()).join(", ")
	));
	lines.push(format!("consumers: {}", workload.consumers.iter().join(", ")));
	Ok(lines.iter().map(|line| format!("{line}\n")).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use clap::Parser;
	use pretty_assertions::assert_eq;

	#[derive(Parser, Debug)]
	struct Wrapper {
		#[command(flatten)]
		subcommand: Subcommand,
	}

	fn describe_args(args: &[&str]) -> String {
		let wrapper = Wrapper::try_parse_from(std::iter::once("probe").chain(args.iter().copied())).unwrap();
		describe(&wrapper.subcommand).unwrap()
	}

	#[test]
	fn describes_synthetic_raster() {
		assert_eq!(
			describe_args(&["synthetic:100x100x3", "-t", "10", "-r", "3", "-j", "4", "-b", "3,1"]),
			"raster: 100x100, 3 band(s)\n\
			bands: 3, 1\n\
			grid: square tiles, 10 columns x 10 rows, largest tile 10x10\n\
			tiles: 100\n\
			interleave: bip\n\
			readers: 30, 30, 40\n\
			consumers: 25, 25, 25, 25\n"
		);
	}

	#[test]
	fn describes_row_strips() {
		assert_eq!(
			describe_args(&["synthetic:10x10x1", "-t", "4", "-l", "row-strip", "-r", "1", "-j", "2"]),
			"raster: 10x10, 1 band(s)\n\
			bands: 1\n\
			grid: row-strip tiles, 1 columns x 3 rows, largest tile 10x4\n\
			tiles: 3\n\
			interleave: bip\n\
			readers: 3\n\
			consumers: 1, 2\n"
		);
	}

	#[test]
	fn probe_command() {
		run_command(vec!["rastile", "probe", "-q", "synthetic:64x64x1"]).unwrap();
	}

	#[test]
	fn missing_file_support() {
		#[cfg(not(feature = "gdal"))]
		{
			let err = run_command(vec!["rastile", "probe", "missing.tif"]).unwrap_err();
			assert_eq!(
				err.to_string(),
				"Cannot open 'missing.tif': reading raster files requires the 'gdal' feature"
			);
		}
		#[cfg(feature = "gdal")]
		assert!(run_command(vec!["rastile", "probe", "missing.tif"]).is_err());
	}
}
