mod interleave;
mod pixel;
mod spectral_subset;
mod tile_block;
mod tile_grid;
mod tile_layout;
mod tile_region;

pub use interleave::Interleave;
pub use pixel::Pixel;
pub use spectral_subset::SpectralSubset;
pub use tile_block::TileBlock;
pub use tile_grid::TileGrid;
pub use tile_layout::TileLayout;
pub use tile_region::TileRegion;
