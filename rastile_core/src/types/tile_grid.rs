//! Partitioning of a raster into tiles.
//!
//! A [`TileGrid`] describes how a `width × height` raster is cut into tiles of
//! `tile_size` pixels. Tiles are enumerated row-major: the outer loop runs over
//! tile rows (top to bottom), the inner loop over tile columns (left to right).
//! Tiles at the right and bottom edges are clipped to the remaining extent, so
//! the regions never overlap and together cover the raster exactly.
//!
//! ```
//! use rastile_core::{TileGrid, TileLayout};
//!
//! let grid = TileGrid::new(7, 7, 4, TileLayout::Square).unwrap();
//! let regions: Vec<_> = grid.iter_regions().map(|r| r.as_tuple()).collect();
//! assert_eq!(regions, vec![(0, 0, 4, 4), (4, 0, 3, 4), (0, 4, 4, 3), (4, 4, 3, 3)]);
//! ```

use crate::{TileLayout, TileRegion};
use anyhow::{Result, ensure};
use itertools::Itertools;
use rastile_derive::context;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
	width: u32,
	height: u32,
	tile_size: u32,
	layout: TileLayout,
}

impl TileGrid {
	#[context("Failed to create tile grid for a {width}x{height} raster with tile size {tile_size}")]
	pub fn new(width: u32, height: u32, tile_size: u32, layout: TileLayout) -> Result<Self> {
		ensure!(tile_size > 0, "tile size must be greater than 0");
		Ok(Self {
			width,
			height,
			tile_size,
			layout,
		})
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn tile_size(&self) -> u32 {
		self.tile_size
	}

	pub fn layout(&self) -> TileLayout {
		self.layout
	}

	fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Number of tile columns. Row strips always span the full width.
	pub fn columns(&self) -> u32 {
		if self.is_empty() {
			return 0;
		}
		match self.layout {
			TileLayout::RowStrip => 1,
			TileLayout::Square => self.width.div_ceil(self.tile_size),
		}
	}

	/// Number of tile rows.
	pub fn rows(&self) -> u32 {
		if self.is_empty() {
			return 0;
		}
		self.height.div_ceil(self.tile_size)
	}

	/// Total number of tiles. This is the number of tiles a producer pushes and
	/// consumers claim during one run over this grid.
	pub fn tile_count(&self) -> usize {
		self.rows() as usize * self.columns() as usize
	}

	/// Largest tile extent `(width, height)` this grid produces; tile buffers are
	/// allocated with these dimensions.
	pub fn max_tile_size(&self) -> (u32, u32) {
		let height = self.tile_size.min(self.height);
		match self.layout {
			TileLayout::RowStrip => (self.width, height),
			TileLayout::Square => (self.tile_size.min(self.width), height),
		}
	}

	fn region_at(&self, index: usize, row: u32, column: u32) -> TileRegion {
		let y_offset = row * self.tile_size;
		let height = self.tile_size.min(self.height - y_offset);
		let (x_offset, width) = match self.layout {
			TileLayout::RowStrip => (0, self.width),
			TileLayout::Square => {
				let x_offset = column * self.tile_size;
				(x_offset, self.tile_size.min(self.width - x_offset))
			}
		};
		TileRegion::new(index, x_offset, y_offset, width, height)
	}

	/// Returns the region with the given sequence index, if it exists.
	pub fn region(&self, index: usize) -> Option<TileRegion> {
		if index >= self.tile_count() {
			return None;
		}
		let columns = self.columns() as usize;
		Some(self.region_at(index, (index / columns) as u32, (index % columns) as u32))
	}

	/// Iterates over all regions in row-major order.
	pub fn iter_regions(&self) -> impl Iterator<Item = TileRegion> + '_ {
		(0..self.rows())
			.cartesian_product(0..self.columns())
			.enumerate()
			.map(move |(index, (row, column))| self.region_at(index, row, column))
	}

	pub fn regions(&self) -> Vec<TileRegion> {
		self.iter_regions().collect()
	}

	/// Regions grouped by tile row, top to bottom.
	pub fn region_rows(&self) -> Vec<Vec<TileRegion>> {
		let columns = self.columns() as usize;
		if columns == 0 {
			return Vec::new();
		}
		self.regions().chunks(columns).map(<[TileRegion]>::to_vec).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn tuples(grid: &TileGrid) -> Vec<(u32, u32, u32, u32)> {
		grid.iter_regions().map(|r| r.as_tuple()).collect()
	}

	#[test]
	fn row_strips_10x10_by_4() -> Result<()> {
		let grid = TileGrid::new(10, 10, 4, TileLayout::RowStrip)?;
		assert_eq!(grid.tile_count(), 3);
		assert_eq!(tuples(&grid), vec![(0, 0, 10, 4), (0, 4, 10, 4), (0, 8, 10, 2)]);
		assert_eq!(grid.max_tile_size(), (10, 4));
		Ok(())
	}

	#[test]
	fn squares_7x7_by_4() -> Result<()> {
		let grid = TileGrid::new(7, 7, 4, TileLayout::Square)?;
		assert_eq!(grid.tile_count(), 4);
		assert_eq!(
			tuples(&grid),
			vec![(0, 0, 4, 4), (4, 0, 3, 4), (0, 4, 4, 3), (4, 4, 3, 3)]
		);
		assert_eq!(grid.max_tile_size(), (4, 4));
		Ok(())
	}

	#[rstest]
	#[case(10, 10, 4)]
	#[case(1, 1, 1)]
	#[case(1, 100, 7)]
	#[case(513, 257, 256)]
	#[case(30, 12, 12)]
	#[case(5, 3, 100)]
	fn row_strips_cover_height(#[case] width: u32, #[case] height: u32, #[case] size: u32) -> Result<()> {
		let grid = TileGrid::new(width, height, size, TileLayout::RowStrip)?;
		let regions = grid.regions();
		assert_eq!(regions.len(), height.div_ceil(size) as usize);
		assert_eq!(regions.iter().map(|r| r.height).sum::<u32>(), height);
		assert!(regions.iter().all(|r| r.width == width && r.x_offset == 0));
		Ok(())
	}

	#[rstest]
	#[case(7, 7, 4)]
	#[case(10, 10, 4)]
	#[case(1, 1, 1)]
	#[case(9, 4, 3)]
	#[case(17, 33, 8)]
	#[case(3, 5, 100)]
	fn squares_cover_exactly_once(#[case] width: u32, #[case] height: u32, #[case] size: u32) -> Result<()> {
		let grid = TileGrid::new(width, height, size, TileLayout::Square)?;
		let regions = grid.regions();
		assert_eq!(
			regions.len(),
			(width.div_ceil(size) * height.div_ceil(size)) as usize
		);

		let mut hits = vec![0u8; (width * height) as usize];
		for r in &regions {
			assert_eq!(r.width, size.min(width - r.x_offset));
			assert_eq!(r.height, size.min(height - r.y_offset));
			for y in r.y_offset..r.y_end() {
				for x in r.x_offset..r.x_end() {
					hits[(y * width + x) as usize] += 1;
				}
			}
		}
		assert!(hits.iter().all(|&h| h == 1));

		for (i, a) in regions.iter().enumerate() {
			for b in &regions[i + 1..] {
				assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
			}
		}
		Ok(())
	}

	#[test]
	fn indices_follow_iteration_order() -> Result<()> {
		let grid = TileGrid::new(9, 7, 2, TileLayout::Square)?;
		for (i, region) in grid.iter_regions().enumerate() {
			assert_eq!(region.index, i);
			assert_eq!(grid.region(i), Some(region));
		}
		assert_eq!(grid.region(grid.tile_count()), None);
		Ok(())
	}

	#[test]
	fn region_rows() -> Result<()> {
		let grid = TileGrid::new(7, 9, 4, TileLayout::Square)?;
		let rows = grid.region_rows();
		assert_eq!(rows.len(), 3);
		assert!(rows.iter().all(|row| row.len() == 2));
		assert_eq!(rows[2][1].as_tuple(), (4, 8, 3, 1));

		let strips = TileGrid::new(7, 9, 4, TileLayout::RowStrip)?.region_rows();
		assert_eq!(strips.iter().map(|row| row.len()).collect::<Vec<_>>(), vec![1, 1, 1]);
		Ok(())
	}

	#[rstest]
	#[case(0, 10)]
	#[case(10, 0)]
	#[case(0, 0)]
	fn empty_raster_has_no_tiles(#[case] width: u32, #[case] height: u32) -> Result<()> {
		for layout in [TileLayout::RowStrip, TileLayout::Square] {
			let grid = TileGrid::new(width, height, 4, layout)?;
			assert_eq!(grid.tile_count(), 0);
			assert_eq!(grid.iter_regions().count(), 0);
			assert!(grid.region_rows().is_empty());
		}
		Ok(())
	}

	#[test]
	fn small_raster_clamps_tile_size() -> Result<()> {
		let grid = TileGrid::new(5, 3, 100, TileLayout::Square)?;
		assert_eq!(grid.max_tile_size(), (5, 3));
		assert_eq!(tuples(&grid), vec![(0, 0, 5, 3)]);
		Ok(())
	}

	#[test]
	fn zero_tile_size_is_rejected() {
		let err = TileGrid::new(10, 10, 0, TileLayout::Square).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Failed to create tile grid for a 10x10 raster with tile size 0"
		);
		assert_eq!(err.root_cause().to_string(), "tile size must be greater than 0");
	}
}
