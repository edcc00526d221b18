use super::*;

#[test]
fn dims_accept_bounds_and_reject_outside() {
    assert!(CanvasDims::new(MAX_WIDTH, MAX_HEIGHT).is_ok());
    assert!(CanvasDims::new(1, 1).is_ok());
    assert!(CanvasDims::new(0, 1).is_err());
    assert!(CanvasDims::new(1, 0).is_err());
    assert!(CanvasDims::new(MAX_WIDTH + 1, 1).is_err());
    assert!(CanvasDims::new(1, MAX_HEIGHT + 1).is_err());
}

#[test]
fn canvas_id_zero_is_rejected() {
    assert!(CanvasId(0).validate().is_err());
    assert_eq!(CanvasId(5).validate().unwrap(), CanvasId(5));
}

#[test]
fn intersects_is_strict_on_shared_edges() {
    let a = Region::new(0, 0, 10, 10);
    assert!(a.intersects(Region::new(9, 9, 5, 5)));
    assert!(!a.intersects(Region::new(10, 0, 5, 5)));
    assert!(!a.intersects(Region::new(0, 10, 5, 5)));
    assert!(Region::new(3, 3, 1, 1).intersects(a));
}

#[test]
fn intersection_clamps_to_overlap() {
    let canvas = Region::new(0, 0, 100, 100);
    let request = Region::new(40, 90, 200, 200);
    assert_eq!(
        request.intersection(canvas),
        Some(Region::new(40, 90, 60, 10))
    );
    assert_eq!(Region::new(100, 0, 5, 5).intersection(canvas), None);
}

#[test]
fn edges_do_not_overflow() {
    let r = Region::new(u32::MAX, u32::MAX, u32::MAX, 1);
    assert_eq!(r.right(), 2 * u64::from(u32::MAX));
    assert_eq!(r.bottom(), u64::from(u32::MAX) + 1);
    assert!(!r.fits_within(CanvasDims::new(10, 10).unwrap()));
}

#[test]
fn fits_within_checks_both_axes() {
    let dims = CanvasDims::new(100, 50).unwrap();
    assert!(Region::new(50, 0, 50, 50).fits_within(dims));
    assert!(!Region::new(51, 0, 50, 50).fits_within(dims));
    assert!(!Region::new(0, 1, 1, 50).fits_within(dims));
}

#[test]
fn region_serializes_with_named_fields() {
    let json = serde_json::to_string(&Region::new(1, 2, 3, 4)).unwrap();
    assert_eq!(json, r#"{"x":1,"y":2,"width":3,"height":4}"#);
}
