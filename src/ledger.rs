use crate::foundation::core::{CanvasDims, CanvasId, Region};

/// Persisted description of a canvas: identity, size and the rectangles written so far.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasRecord {
    pub id: CanvasId,
    pub width: u32,
    pub height: u32,
    /// Written-region ledger, in upload order. Append-only.
    #[serde(default)]
    pub pieces: Vec<Region>,
}

impl CanvasRecord {
    pub fn new(id: CanvasId, dims: CanvasDims) -> Self {
        Self {
            id,
            width: dims.width,
            height: dims.height,
            pieces: Vec::new(),
        }
    }

    pub fn dims(&self) -> CanvasDims {
        CanvasDims {
            width: self.width,
            height: self.height,
        }
    }

    /// Append a rectangle that now holds real pixel data.
    pub fn record_written(&mut self, region: Region) {
        debug_assert!(region.fits_within(self.dims()));
        self.pieces.push(region);
    }

    pub fn written_regions(&self) -> &[Region] {
        &self.pieces
    }

    /// Return `true` when any written rectangle shares a pixel with `area`.
    pub fn has_fragment_in_area(&self, area: Region) -> bool {
        if !area.intersects(self.dims().bounds()) {
            return false;
        }
        self.pieces.iter().any(|piece| piece.intersects(area))
    }
}

#[cfg(test)]
#[path = "../tests/unit/ledger.rs"]
mod tests;
