use std::io::Cursor;
use std::path::PathBuf;

use super::*;
use crate::foundation::core::{CanvasDims, CanvasId};
use crate::store::canvas_file::CanvasStore;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "chartographer_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// RGB of pixel `(x, y)` (top-down) read straight from a canvas file.
fn pixel(bytes: &[u8], dims: CanvasDims, x: u32, y: u32) -> [u8; 3] {
    let row = u64::from(dims.height - 1 - y);
    let at = (bmp::HEADER_LEN + row * bmp::row_stride(dims.width) + u64::from(x) * 3) as usize;
    [bytes[at + 2], bytes[at + 1], bytes[at]]
}

/// Fragment whose pixel `(x, y)` is `[base + x, base + y, 7]`.
fn gradient(dims: CanvasDims, base: u8) -> Vec<u8> {
    let mut rgb = Vec::new();
    for y in 0..dims.height {
        for x in 0..dims.width {
            rgb.extend_from_slice(&[base + x as u8, base + y as u8, 7]);
        }
    }
    bmp::encode_rgb8(dims, &rgb).unwrap()
}

#[test]
fn fragment_lands_at_top_down_coordinates() {
    let tmp = temp_dir("writer_lands");
    let store = CanvasStore::new(&tmp);
    let dims = CanvasDims::new(5, 4).unwrap();
    store.create(CanvasId(1), dims).unwrap();

    let frag_dims = CanvasDims::new(2, 3).unwrap();
    let mut canvas = store.open(CanvasId(1), dims).unwrap();
    splice_fragment(
        &mut canvas,
        Region::new(3, 1, 2, 3),
        &mut Cursor::new(gradient(frag_dims, 100)),
    )
    .unwrap();
    drop(canvas);

    let bytes = std::fs::read(store.path_for(CanvasId(1))).unwrap();
    for y in 0..4 {
        for x in 0..5 {
            let inside = (3..5).contains(&x) && (1..4).contains(&y);
            let expected = if inside {
                [100 + (x - 3) as u8, 100 + (y - 1) as u8, 7]
            } else {
                [0, 0, 0]
            };
            assert_eq!(pixel(&bytes, dims, x, y), expected, "pixel ({x}, {y})");
        }
    }

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn bytes_outside_destination_are_untouched() {
    let tmp = temp_dir("writer_untouched");
    let store = CanvasStore::new(&tmp);
    let dims = CanvasDims::new(7, 6).unwrap();
    store.create(CanvasId(1), dims).unwrap();
    let before = std::fs::read(store.path_for(CanvasId(1))).unwrap();

    let rect = Region::new(2, 2, 3, 2);
    let mut canvas = store.open(CanvasId(1), dims).unwrap();
    splice_fragment(
        &mut canvas,
        rect,
        &mut Cursor::new(gradient(rect.dims().unwrap(), 1)),
    )
    .unwrap();
    drop(canvas);

    let after = std::fs::read(store.path_for(CanvasId(1))).unwrap();
    assert_eq!(before.len(), after.len());

    let layout = RectLayout::new(dims, rect).unwrap();
    let mut written = vec![false; after.len()];
    for i in 0..layout.rows {
        let start = layout.row_offset(i) as usize;
        written[start..start + layout.row_len].fill(true);
    }
    for (i, (b, a)) in before.iter().zip(&after).enumerate() {
        if !written[i] {
            assert_eq!(b, a, "byte {i} changed");
        }
    }

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn out_of_range_rect_leaves_file_unchanged() {
    let tmp = temp_dir("writer_out_of_range");
    let store = CanvasStore::new(&tmp);
    let dims = CanvasDims::new(4, 4).unwrap();
    store.create(CanvasId(1), dims).unwrap();
    let before = std::fs::read(store.path_for(CanvasId(1))).unwrap();

    let mut canvas = store.open(CanvasId(1), dims).unwrap();
    let err = splice_fragment(
        &mut canvas,
        Region::new(3, 0, 2, 2),
        &mut Cursor::new(gradient(CanvasDims::new(2, 2).unwrap(), 1)),
    )
    .unwrap_err();
    assert!(matches!(err, ChartaError::OutOfRange(_)));
    drop(canvas);

    assert_eq!(std::fs::read(store.path_for(CanvasId(1))).unwrap(), before);
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn bad_header_is_rejected_before_writing() {
    let tmp = temp_dir("writer_bad_header");
    let store = CanvasStore::new(&tmp);
    let dims = CanvasDims::new(4, 4).unwrap();
    store.create(CanvasId(1), dims).unwrap();
    let before = std::fs::read(store.path_for(CanvasId(1))).unwrap();

    let mut fragment = gradient(CanvasDims::new(2, 2).unwrap(), 1);
    fragment[0] = b'X';
    let mut canvas = store.open(CanvasId(1), dims).unwrap();
    let err = splice_fragment(
        &mut canvas,
        Region::new(0, 0, 2, 2),
        &mut Cursor::new(fragment),
    )
    .unwrap_err();
    assert!(matches!(err, ChartaError::InvalidArgument(_)));

    // Declared size disagrees with the requested rectangle.
    let err = splice_fragment(
        &mut canvas,
        Region::new(0, 0, 2, 1),
        &mut Cursor::new(gradient(CanvasDims::new(2, 2).unwrap(), 1)),
    )
    .unwrap_err();
    assert!(matches!(err, ChartaError::InvalidArgument(_)));
    drop(canvas);

    assert_eq!(std::fs::read(store.path_for(CanvasId(1))).unwrap(), before);
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn truncated_fragment_fails_after_partial_copy() {
    let tmp = temp_dir("writer_truncated");
    let store = CanvasStore::new(&tmp);
    let dims = CanvasDims::new(2, 3).unwrap();
    store.create(CanvasId(1), dims).unwrap();

    let mut fragment = gradient(dims, 10);
    // Keep the header and the first stored row (8 bytes incl. padding) plus a partial second row.
    fragment.truncate(bmp::HEADER_LEN as usize + 8 + 3);

    let mut canvas = store.open(CanvasId(1), dims).unwrap();
    let err = splice_fragment(&mut canvas, dims.bounds(), &mut Cursor::new(fragment)).unwrap_err();
    assert!(matches!(err, ChartaError::Io { .. }));
    drop(canvas);

    let bytes = std::fs::read(store.path_for(CanvasId(1))).unwrap();
    // The bottom row was already copied; the rows above stay blank.
    assert_eq!(pixel(&bytes, dims, 1, 2), [11, 12, 7]);
    assert_eq!(pixel(&bytes, dims, 0, 0), [0, 0, 0]);

    std::fs::remove_dir_all(&tmp).ok();
}
