use std::io::{Read, Write};

use crate::config::WorkspaceConfig;
use crate::engine::reader::read_fragment;
use crate::engine::writer::splice_fragment;
use crate::foundation::core::{CanvasDims, CanvasId, Region};
use crate::foundation::error::{ChartaError, ChartaResult};
use crate::ledger::CanvasRecord;
use crate::store::canvas_file::CanvasStore;
use crate::store::ids::IdAllocator;
use crate::store::metadata::MetadataStore;

/// Canvas operations over one workspace directory.
///
/// Argument errors are reported before anything on disk changes. Access to a single canvas is not
/// serialized here; callers that upload and fetch the same canvas concurrently must coordinate.
#[derive(Debug)]
pub struct Chartographer {
    config: WorkspaceConfig,
    canvases: CanvasStore,
    records: MetadataStore,
    ids: IdAllocator,
}

impl Chartographer {
    /// Open the workspace, loading (or initializing) the persisted id counter.
    pub fn open(config: WorkspaceConfig) -> ChartaResult<Self> {
        let ids = IdAllocator::load(config.options_path())?;
        Ok(Self {
            canvases: CanvasStore::new(&config.root),
            records: MetadataStore::new(&config.root),
            ids,
            config,
        })
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn canvases(&self) -> &CanvasStore {
        &self.canvases
    }

    /// Create a blank canvas and return its id.
    #[tracing::instrument(skip(self))]
    pub fn create(&mut self, width: u32, height: u32) -> ChartaResult<CanvasId> {
        let dims = CanvasDims::new(width, height)?;
        let id = self.ids.allocate()?;
        self.canvases.create(id, dims)?;
        if let Err(err) = self.records.save(&CanvasRecord::new(id, dims)) {
            if let Err(cleanup) = self.canvases.delete(id) {
                tracing::warn!(%id, %cleanup, "failed to remove canvas file after record error");
            }
            return Err(err);
        }
        tracing::info!(%id, width, height, "canvas created");
        Ok(id)
    }

    /// Splice a BMP fragment into canvas `id` at `rect`, then record `rect` as written.
    #[tracing::instrument(skip(self, fragment))]
    pub fn upload<R: Read>(&self, id: CanvasId, rect: Region, mut fragment: R) -> ChartaResult<()> {
        id.validate()?;
        rect.dims()?;
        let mut record = self.records.load(id)?;
        if !rect.fits_within(record.dims()) {
            return Err(ChartaError::out_of_range(format!(
                "fragment {rect} exceeds canvas {id} ({}x{})",
                record.width, record.height
            )));
        }

        let mut canvas = self.canvases.open(id, record.dims())?;
        splice_fragment(&mut canvas, rect, &mut fragment)?;
        drop(canvas);

        record.record_written(rect);
        self.records.save(&record)?;
        tracing::info!(%id, %rect, "fragment stored");
        Ok(())
    }

    /// Write `rect` of canvas `id` into `sink` as a standalone BMP.
    ///
    /// The rectangle may extend past the canvas; the missing area is blank. At least one written
    /// region must intersect it.
    #[tracing::instrument(skip(self, sink))]
    pub fn fetch<W: Write>(&self, id: CanvasId, rect: Region, sink: &mut W) -> ChartaResult<()> {
        id.validate()?;
        rect.dims()?;
        let record = self.records.load(id)?;
        if !record.has_fragment_in_area(rect) {
            return Err(ChartaError::NoData(rect));
        }

        let mut canvas = self.canvases.open(id, record.dims())?;
        read_fragment(&mut canvas, &self.canvases.scratch(), rect, sink)
    }

    /// [`Chartographer::fetch`] into an owned buffer.
    pub fn fetch_to_vec(&self, id: CanvasId, rect: Region) -> ChartaResult<Vec<u8>> {
        let mut out = Vec::new();
        self.fetch(id, rect, &mut out)?;
        Ok(out)
    }

    /// Remove both the raster file and the record of canvas `id`.
    ///
    /// Removing only one of the two is reported as [`ChartaError::PartialDelete`] and left for
    /// manual reconciliation.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: CanvasId) -> ChartaResult<()> {
        id.validate()?;
        let record = self.records.delete(id);
        let file = self.canvases.delete(id);

        match (record, file) {
            (Ok(true), Ok(true)) => {
                tracing::info!(%id, "canvas deleted");
                Ok(())
            }
            (Ok(false), Ok(false)) => Err(ChartaError::NotFound(id)),
            (Err(err), Ok(false) | Err(_)) | (Ok(false), Err(err)) => Err(err),
            (record, file) => {
                let detail = format!(
                    "record: {}, raster file: {}",
                    describe_removal(&record),
                    describe_removal(&file)
                );
                tracing::warn!(%id, %detail, "canvas only partially deleted");
                Err(ChartaError::PartialDelete { id, detail })
            }
        }
    }

    /// Current metadata record of canvas `id`.
    pub fn record(&self, id: CanvasId) -> ChartaResult<CanvasRecord> {
        id.validate()?;
        self.records.load(id)
    }

    /// Persist the id counter. Call on shutdown.
    pub fn shutdown(self) -> ChartaResult<()> {
        self.ids.persist()
    }
}

fn describe_removal(outcome: &ChartaResult<bool>) -> String {
    match outcome {
        Ok(true) => "removed".to_string(),
        Ok(false) => "missing".to_string(),
        Err(err) => format!("failed ({err})"),
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
