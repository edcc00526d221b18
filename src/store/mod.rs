//! Everything that touches the workspace directory.

/// Raster files backing each canvas.
pub mod canvas_file;
/// Persistent canvas id counter.
pub mod ids;
/// JSON records holding canvas dimensions and written regions.
pub mod metadata;
/// Throwaway files for synthesized reads.
pub mod scratch;
