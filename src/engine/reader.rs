use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use crate::engine::writer::splice_fragment;
use crate::format::bmp;
use crate::format::geometry::RectLayout;
use crate::foundation::core::Region;
use crate::foundation::error::{ChartaResult, IoContext};
use crate::store::canvas_file::{CanvasFile, create_blank};
use crate::store::scratch::ScratchSpace;

/// Write the pixels of `request` as a standalone BMP into `sink`.
///
/// Requests that fit the canvas are copied row by row. Requests that run past the right or bottom
/// edge are synthesized: the overlap with the canvas is pasted into a blank image of the requested
/// size, at the overlap's position relative to the request. Pixels outside the overlap are zero.
pub fn read_fragment<W: Write>(
    canvas: &mut CanvasFile,
    scratch: &ScratchSpace,
    request: Region,
    sink: &mut W,
) -> ChartaResult<()> {
    if request.fits_within(canvas.dims()) {
        write_region(canvas, request, sink)
    } else {
        read_out_of_bounds(canvas, scratch, request, sink)
    }
}

/// Write the part of `request` that exists in `canvas` as a standalone BMP.
///
/// Returns the rectangle actually extracted, in canvas coordinates, or `None` (writing nothing)
/// when the request does not overlap the canvas at all.
pub fn extract_clamped<W: Write>(
    canvas: &mut CanvasFile,
    request: Region,
    sink: &mut W,
) -> ChartaResult<Option<Region>> {
    let Some(overlap) = request.intersection(canvas.dims().bounds()) else {
        return Ok(None);
    };
    write_region(canvas, overlap, sink)?;
    Ok(Some(overlap))
}

fn write_region<W: Write>(canvas: &mut CanvasFile, rect: Region, sink: &mut W) -> ChartaResult<()> {
    let layout = RectLayout::new(canvas.dims(), rect)?;
    let padding = [0u8; 3];
    let padding = &padding[..bmp::row_padding(rect.width) as usize];

    let ctx = || format!("write extracted {rect}");
    sink.write_all(&bmp::encode_header(rect.dims()?))
        .io_context(ctx)?;
    let mut row = vec![0u8; layout.row_len];
    for i in 0..layout.rows {
        canvas.read_at(layout.row_offset(i), &mut row)?;
        sink.write_all(&row).io_context(ctx)?;
        sink.write_all(padding).io_context(ctx)?;
    }
    sink.flush().io_context(ctx)
}

fn read_out_of_bounds<W: Write>(
    canvas: &mut CanvasFile,
    scratch: &ScratchSpace,
    request: Region,
    sink: &mut W,
) -> ChartaResult<()> {
    let dims = request.dims()?;

    let clamped = scratch.reserve("clamped")?;
    let overlap = {
        let file = File::create(clamped.path())
            .io_context(|| format!("create '{}'", clamped.path().display()))?;
        let mut out = BufWriter::new(file);
        let overlap = extract_clamped(canvas, request, &mut out)?;
        out.flush()
            .io_context(|| format!("write '{}'", clamped.path().display()))?;
        overlap
    };
    tracing::debug!(%request, overlap = ?overlap, "synthesizing out-of-bounds read");

    let target = scratch.reserve("synth")?;
    create_blank(target.path(), dims)?;
    if let Some(overlap) = overlap {
        // The overlap never starts left of or above the request, so these cannot underflow.
        let anchor = Region::new(
            overlap.x - request.x,
            overlap.y - request.y,
            overlap.width,
            overlap.height,
        );
        let file = File::open(clamped.path())
            .io_context(|| format!("open '{}'", clamped.path().display()))?;
        let mut fragment = BufReader::new(file);
        let mut synth = CanvasFile::open(target.path(), dims)?;
        splice_fragment(&mut synth, anchor, &mut fragment)?;
    }

    let mut synth = File::open(target.path())
        .io_context(|| format!("open '{}'", target.path().display()))?;
    std::io::copy(&mut synth, sink).io_context(|| format!("copy synthesized {request}"))?;
    sink.flush().io_context(|| format!("copy synthesized {request}"))
}

#[cfg(test)]
#[path = "../../tests/unit/engine/reader.rs"]
mod tests;
