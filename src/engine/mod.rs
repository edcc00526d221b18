//! Fragment splicing and extraction against canvas files.

/// Rectangle extraction, including reads past the canvas edges.
pub mod reader;
/// Fragment upload into an existing canvas.
pub mod writer;
