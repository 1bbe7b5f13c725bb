use anyhow::{Result, ensure};
use std::{fmt::Debug, sync::Arc};

/// Ordered selection of 1-based band indices to read from a dataset.
///
/// Cloning is cheap: every tile block of a run shares the same band list.
///
/// ```
/// use rastile_core::SpectralSubset;
///
/// let all = SpectralSubset::all(3);
/// assert_eq!(all.bands(), &[1, 2, 3]);
///
/// let nir = SpectralSubset::from_range(4, 5).unwrap();
/// assert_eq!(nir.len(), 2);
/// assert!(nir.validate(3).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SpectralSubset {
	bands: Arc<[usize]>,
}

impl SpectralSubset {
	/// All bands `1..=band_count` of a dataset.
	pub fn all(band_count: usize) -> Self {
		Self {
			bands: (1..=band_count).collect(),
		}
	}

	pub fn from_bands(bands: Vec<usize>) -> Self {
		Self { bands: bands.into() }
	}

	/// The inclusive range `first..=last`.
	pub fn from_range(first: usize, last: usize) -> Result<Self> {
		ensure!(first >= 1, "band indices are 1-based, got {first}");
		ensure!(first <= last, "invalid band range {first}..={last}");
		Ok(Self {
			bands: (first..=last).collect(),
		})
	}

	pub fn bands(&self) -> &[usize] {
		&self.bands
	}

	pub fn len(&self) -> usize {
		self.bands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bands.is_empty()
	}

	/// Checks the selection against the band count of a dataset.
	pub fn validate(&self, band_count: usize) -> Result<()> {
		ensure!(!self.bands.is_empty(), "spectral subset must select at least one band");
		for &band in self.bands.iter() {
			ensure!(
				(1..=band_count).contains(&band),
				"band {band} is out of range, dataset has {band_count} band(s)"
			);
		}
		Ok(())
	}
}

impl Debug for SpectralSubset {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "SpectralSubset({:?})", self.bands)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn all_bands() {
		assert_eq!(SpectralSubset::all(4).bands(), &[1, 2, 3, 4]);
		assert!(SpectralSubset::all(0).is_empty());
	}

	#[test]
	fn range() {
		assert_eq!(SpectralSubset::from_range(2, 3).unwrap().bands(), &[2, 3]);
		assert!(SpectralSubset::from_range(0, 3).is_err());
		assert!(SpectralSubset::from_range(3, 2).is_err());
	}

	#[test]
	fn validate() {
		let subset = SpectralSubset::from_bands(vec![3, 1]);
		assert!(subset.validate(3).is_ok());
		assert_eq!(
			subset.validate(2).unwrap_err().to_string(),
			"band 3 is out of range, dataset has 2 band(s)"
		);
		assert!(SpectralSubset::from_bands(vec![]).validate(3).is_err());
		assert!(SpectralSubset::from_bands(vec![0]).validate(3).is_err());
	}

	#[test]
	fn debug() {
		assert_eq!(format!("{:?}", SpectralSubset::all(2)), "SpectralSubset([1, 2])");
	}
}
