//! In-memory channel ordering of multi-band tile payloads.
//!
//! ```
//! use rastile_core::Interleave;
//!
//! // 2×2 pixels, 3 bands: pixel (1, 0), band 2
//! assert_eq!(Interleave::Bsq.index(1, 0, 2, 2, 2, 3), 9);
//! assert_eq!(Interleave::Bil.index(1, 0, 2, 2, 2, 3), 5);
//! assert_eq!(Interleave::Bip.index(1, 0, 2, 2, 2, 3), 5);
//! ```

use anyhow::{Result, bail};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use serde::Deserialize;
use std::{fmt::Display, str::FromStr};

/// Layout of pixel values of several bands inside one buffer.
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Interleave {
	/// Band-sequential: each band's full plane follows the previous one.
	Bsq,
	/// Band-interleaved-by-line: one row of every band, then the next row.
	Bil,
	/// Band-interleaved-by-pixel: all bands of one pixel are adjacent.
	#[default]
	Bip,
}

impl Interleave {
	pub fn as_str(&self) -> &str {
		match self {
			Interleave::Bsq => "bsq",
			Interleave::Bil => "bil",
			Interleave::Bip => "bip",
		}
	}

	/// Buffer index of pixel `(x, y)` in band position `band` of a `width × height` payload with `bands` bands.
	#[inline]
	pub fn index(&self, x: usize, y: usize, band: usize, width: usize, height: usize, bands: usize) -> usize {
		match self {
			Interleave::Bsq => (band * height + y) * width + x,
			Interleave::Bil => (y * bands + band) * width + x,
			Interleave::Bip => (y * width + x) * bands + band,
		}
	}
}

impl Display for Interleave {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Interleave {
	type Err = anyhow::Error;

	fn from_str(value: &str) -> Result<Self> {
		Ok(match value.trim().to_lowercase().as_str() {
			"bsq" | "band-sequential" => Interleave::Bsq,
			"bil" | "band-interleaved-by-line" => Interleave::Bil,
			"bip" | "band-interleaved-by-pixel" => Interleave::Bip,
			_ => bail!("Unknown interleave '{value}'. Expected bsq, bil or bip"),
		})
	}
}
