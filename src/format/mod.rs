//! On-disk raster format: header codec and row geometry.

/// 24-bit BMP header encoding, validation and padding rules.
pub mod bmp;
/// Offset/stride calculators for rectangles inside a canvas file.
pub mod geometry;
