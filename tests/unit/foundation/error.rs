use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChartaError::invalid_argument("x")
            .to_string()
            .contains("invalid argument:")
    );
    assert!(
        ChartaError::out_of_range("x")
            .to_string()
            .contains("out of range:")
    );
    assert!(
        ChartaError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(
        ChartaError::NotFound(CanvasId(7)).to_string(),
        "canvas 7 not found"
    );
}

#[test]
fn kinds_follow_taxonomy() {
    assert_eq!(
        ChartaError::invalid_argument("x").kind(),
        ChartaErrorKind::InvalidArgument
    );
    assert_eq!(
        ChartaError::NotFound(CanvasId(1)).kind(),
        ChartaErrorKind::NotFound
    );
    assert_eq!(
        ChartaError::out_of_range("x").kind(),
        ChartaErrorKind::OutOfRange
    );
    assert_eq!(
        ChartaError::NoData(Region::new(0, 0, 1, 1)).kind(),
        ChartaErrorKind::NoData
    );
    assert_eq!(
        ChartaError::io("read", std::io::Error::other("boom")).kind(),
        ChartaErrorKind::IoFailure
    );
    assert_eq!(
        ChartaError::PartialDelete {
            id: CanvasId(3),
            detail: "x".to_string()
        }
        .kind(),
        ChartaErrorKind::PartialDelete
    );
}

#[test]
fn io_preserves_source() {
    let err = ChartaError::io("write row", std::io::Error::other("disk full"));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("disk full"));
    assert!(err.to_string().contains("write row"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ChartaError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
