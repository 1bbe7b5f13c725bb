mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Show raster metadata, the tile grid and how work would be split
	Probe(tools::probe::Subcommand),

	#[clap(alias = "statistics")]
	/// Compute per-band minimum, maximum and mean by streaming the raster through a pipeline
	Stats(tools::stats::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Probe(arguments) => tools::probe::run(arguments),
		Commands::Stats(arguments) => tools::stats::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["rastile"]).unwrap_err().to_string();
		assert!(err.starts_with("A concurrency core for streaming large rasters"));
		assert!(err.contains("\nUsage: rastile [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["rastile", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("rastile "));
	}

	#[test]
	fn probe_subcommand() {
		let output = run_command(vec!["rastile", "probe"]).unwrap_err().to_string();
		assert!(output.starts_with("Show raster metadata"));
	}

	#[test]
	fn stats_subcommand() {
		let output = run_command(vec!["rastile", "stats"]).unwrap_err().to_string();
		assert!(output.starts_with("Compute per-band minimum"));
	}
}
