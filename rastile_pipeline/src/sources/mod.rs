mod memory;
pub use memory::MemoryRaster;

#[cfg(feature = "gdal")]
mod gdal;
#[cfg(feature = "gdal")]
pub use gdal::GdalRaster;
