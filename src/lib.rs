//! Chartographer stores very large 24-bit BMP canvases on disk and assembles them from uploaded
//! fragments.
//!
//! Fragments are spliced straight into the right byte ranges of the canvas file with positioned
//! writes, and arbitrary rectangles are read back the same way, so a canvas is never held in
//! memory as a whole.
//!
//! - Open a workspace with [`Chartographer::open`]
//! - [`Chartographer::create`] a blank canvas, [`Chartographer::upload`] fragments into it
//! - [`Chartographer::fetch`] any rectangle, even one running past the canvas edges
#![forbid(unsafe_code)]

/// Workspace directory configuration.
pub mod config;
/// Fragment splicing and rectangle extraction.
pub mod engine;
/// BMP layout and byte-offset geometry.
pub mod format;
mod foundation;
/// Written-region ledger kept per canvas.
pub mod ledger;
/// Request-level canvas operations.
pub mod service;
/// On-disk storage: raster files, records, id counter, scratch files.
pub mod store;

pub use crate::config::WorkspaceConfig;
pub use crate::foundation::core::{
    CanvasDims, CanvasId, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, Region,
};
pub use crate::foundation::error::{ChartaError, ChartaErrorKind, ChartaResult, IoContext};
pub use crate::ledger::CanvasRecord;
pub use crate::service::Chartographer;
