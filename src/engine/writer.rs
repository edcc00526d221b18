use std::io::{ErrorKind, Read};

use crate::foundation::core::Region;
use crate::foundation::error::{ChartaError, ChartaResult};
use crate::format::bmp;
use crate::format::geometry::RectLayout;
use crate::store::canvas_file::CanvasFile;

/// Copy a bottom-up BMP fragment into `canvas` so that its top-left pixel lands on
/// `(rect.x, rect.y)` (top-down coordinates).
///
/// Only the `rect.width * 3` pixel bytes of each destination row are written; everything else in
/// the canvas file is left untouched. Fragment pad bytes are read and dropped.
///
/// Geometry and header problems are reported before the canvas is modified. An I/O failure or a
/// truncated stream midway leaves the rows copied so far in place.
pub fn splice_fragment<R: Read>(
    canvas: &mut CanvasFile,
    rect: Region,
    fragment: &mut R,
) -> ChartaResult<()> {
    let layout = RectLayout::new(canvas.dims(), rect)?;
    let header = bmp::read_fragment_header(fragment)?;
    header.ensure_fragment(rect.dims()?)?;

    let fragment_row_len = layout.row_len + bmp::row_padding(rect.width) as usize;
    tracing::debug!(
        %rect,
        first_row_offset = layout.first_row_offset,
        stride = layout.stride,
        gap = layout.gap(),
        "splicing fragment"
    );

    let mut row = vec![0u8; fragment_row_len];
    canvas.seek_to(layout.first_row_offset)?;
    for i in 0..layout.rows {
        fragment.read_exact(&mut row).map_err(|err| {
            let context = if err.kind() == ErrorKind::UnexpectedEof {
                format!("fragment ended after {i} of {} rows", layout.rows)
            } else {
                format!("read fragment row {i}")
            };
            ChartaError::io(context, err)
        })?;
        canvas.write_next(&row[..layout.row_len])?;
        if i + 1 < layout.rows {
            canvas.skip(layout.gap())?;
        }
    }
    canvas.flush()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/writer.rs"]
mod tests;
