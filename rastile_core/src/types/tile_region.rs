use std::fmt::Debug;

/// Position and extent of one tile inside a raster, in pixels.
///
/// Regions are produced by [`TileGrid`](crate::TileGrid) and never change
/// afterwards. `index` is the position of the tile in grid iteration order and
/// is unique within a grid.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileRegion {
	pub index: usize,
	pub x_offset: u32,
	pub y_offset: u32,
	pub width: u32,
	pub height: u32,
}

impl TileRegion {
	pub fn new(index: usize, x_offset: u32, y_offset: u32, width: u32, height: u32) -> Self {
		Self {
			index,
			x_offset,
			y_offset,
			width,
			height,
		}
	}

	/// Exclusive right edge.
	pub fn x_end(&self) -> u32 {
		self.x_offset + self.width
	}

	/// Exclusive bottom edge.
	pub fn y_end(&self) -> u32 {
		self.y_offset + self.height
	}

	pub fn pixel_count(&self) -> usize {
		self.width as usize * self.height as usize
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	pub fn contains(&self, x: u32, y: u32) -> bool {
		x >= self.x_offset && x < self.x_end() && y >= self.y_offset && y < self.y_end()
	}

	pub fn overlaps(&self, other: &TileRegion) -> bool {
		!self.is_empty()
			&& !other.is_empty()
			&& self.x_offset < other.x_end()
			&& other.x_offset < self.x_end()
			&& self.y_offset < other.y_end()
			&& other.y_offset < self.y_end()
	}

	/// `(x_offset, y_offset, width, height)`
	pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
		(self.x_offset, self.y_offset, self.width, self.height)
	}
}

impl Debug for TileRegion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"TileRegion#{}({}, {}, {}x{})",
			self.index, self.x_offset, self.y_offset, self.width, self.height
		)
	}
}
