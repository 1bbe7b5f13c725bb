use std::{fmt::Display, time::Duration};

/// Outcome of a successful pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
	/// Tiles in the grid.
	pub tiles: usize,
	/// Tiles pushed by each producer.
	pub produced: Vec<usize>,
	/// Tiles processed by each started consumer.
	pub consumed_per_consumer: Vec<usize>,
	pub elapsed: Duration,
}

impl RunSummary {
	pub fn total_produced(&self) -> usize {
		self.produced.iter().sum()
	}

	pub fn total_consumed(&self) -> usize {
		self.consumed_per_consumer.iter().sum()
	}

	/// Tiles per second, 0 for an instant run.
	pub fn throughput(&self) -> f64 {
		let seconds = self.elapsed.as_secs_f64();
		if seconds > 0.0 {
			self.tiles as f64 / seconds
		} else {
			0.0
		}
	}
}

impl Display for RunSummary {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} tiles by {} producer(s) and {} consumer(s) in {:.3}s",
			self.tiles,
			self.produced.len(),
			self.consumed_per_consumer.len(),
			self.elapsed.as_secs_f64()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn totals_and_display() {
		let summary = RunSummary {
			tiles: 10,
			produced: vec![4, 6],
			consumed_per_consumer: vec![3, 3, 4],
			elapsed: Duration::from_millis(500),
		};
		assert_eq!(summary.total_produced(), 10);
		assert_eq!(summary.total_consumed(), 10);
		assert_eq!(summary.throughput(), 20.0);
		assert_eq!(
			summary.to_string(),
			"10 tiles by 2 producer(s) and 3 consumer(s) in 0.500s"
		);
	}

	#[test]
	fn instant_run_has_zero_throughput() {
		assert_eq!(RunSummary::default().throughput(), 0.0);
	}
}
