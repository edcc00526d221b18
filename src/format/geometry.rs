//! Byte-offset arithmetic for rectangles inside a bottom-up canvas file.
//!
//! Pure functions only; the engine modules feed these plans to positioned I/O.

use crate::foundation::core::{CanvasDims, Region};
use crate::foundation::error::{ChartaError, ChartaResult};
use crate::format::bmp::{BYTES_PER_PIXEL, HEADER_LEN, row_padding, row_stride};

/// Placement of a rectangle's rows inside a canvas file.
///
/// Rows are enumerated in storage order: row `0` is the rectangle's visually lowest row, which is
/// also the first row of a bottom-up fragment stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectLayout {
    /// Absolute file offset of the first pixel of row `0`.
    pub first_row_offset: u64,
    /// Number of rows.
    pub rows: u32,
    /// Pixel bytes per row (`width * 3`), padding excluded.
    pub row_len: usize,
    /// Distance between the starts of consecutive rows (the canvas row stride).
    pub stride: u64,
}

impl RectLayout {
    /// Lay out `rect` inside a canvas of `canvas` dimensions.
    ///
    /// The rectangle must fit entirely inside the canvas.
    pub fn new(canvas: CanvasDims, rect: Region) -> ChartaResult<Self> {
        if rect.is_empty() || !rect.fits_within(canvas) {
            return Err(ChartaError::out_of_range(format!(
                "rectangle {rect} does not fit a {}x{} canvas",
                canvas.width, canvas.height
            )));
        }
        // Visually lowest row of the rectangle, counted bottom-up.
        let bottom_row = canvas.height - rect.y - rect.height;
        Ok(Self {
            first_row_offset: HEADER_LEN + pixel_offset(canvas, rect.x, bottom_row),
            rows: rect.height,
            row_len: rect.width as usize * BYTES_PER_PIXEL as usize,
            stride: row_stride(canvas.width),
        })
    }

    /// Absolute file offset of row `i` (storage order).
    pub fn row_offset(&self, i: u32) -> u64 {
        self.first_row_offset + u64::from(i) * self.stride
    }

    /// Bytes to skip after writing one row to reach the start of the next.
    pub fn gap(&self) -> u64 {
        self.stride - self.row_len as u64
    }
}

/// Offset within the pixel payload of pixel `x` on stored row `physical_row`.
pub fn pixel_offset(canvas: CanvasDims, x: u32, physical_row: u32) -> u64 {
    u64::from(physical_row) * row_stride(canvas.width) + u64::from(x) * u64::from(BYTES_PER_PIXEL)
}

/// Offset within the pixel payload of the visually topmost row.
pub fn top_row_offset(canvas: CanvasDims) -> u64 {
    pixel_offset(canvas, 0, canvas.height - 1)
}

/// Destination of the first fragment byte, expressed relative to the topmost row.
///
/// Equals `RectLayout::first_row_offset` for the same rectangle; kept as a separate formula so the
/// two derivations can be checked against each other.
pub fn splice_offset_from_top(canvas: CanvasDims, rect: Region) -> u64 {
    // Signed: for a one-row rectangle on the top row, `back` is negative.
    let last = i64::from(rect.y) + i64::from(rect.height) - 1;
    let back = (i64::from(canvas.width) * last - i64::from(rect.x)) * i64::from(BYTES_PER_PIXEL)
        + i64::from(row_padding(canvas.width)) * last;
    (HEADER_LEN as i64 + top_row_offset(canvas) as i64 - back) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/format/geometry.rs"]
mod tests;
