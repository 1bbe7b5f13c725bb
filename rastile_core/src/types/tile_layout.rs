use anyhow::{Result, bail};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use serde::Deserialize;
use std::{fmt::Display, str::FromStr};

/// How a raster is cut into tiles.
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TileLayout {
	/// Full-width horizontal strips of `tile_size` rows.
	RowStrip,
	/// `tile_size × tile_size` squares, clipped at the right and bottom edges.
	#[default]
	Square,
}

impl TileLayout {
	pub fn as_str(&self) -> &str {
		match self {
			TileLayout::RowStrip => "row-strip",
			TileLayout::Square => "square",
		}
	}
}

impl Display for TileLayout {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TileLayout {
	type Err = anyhow::Error;

	fn from_str(value: &str) -> Result<Self> {
		Ok(match value.trim().to_lowercase().as_str() {
			"row-strip" | "rowstrip" | "line" | "rows" => TileLayout::RowStrip,
			"square" | "block" => TileLayout::Square,
			_ => bail!("Unknown tile layout '{value}'. Expected row-strip or square"),
		})
	}
}
