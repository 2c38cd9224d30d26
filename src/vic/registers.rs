pub mod interrupt;
pub mod raster;
pub mod sprites;
