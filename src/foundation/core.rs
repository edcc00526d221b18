use std::fmt;

use crate::foundation::error::{ChartaError, ChartaResult};

/// Smallest accepted canvas (and fragment) width.
pub const MIN_WIDTH: u32 = 1;
/// Largest accepted canvas (and fragment) width.
pub const MAX_WIDTH: u32 = 20_000;
/// Smallest accepted canvas (and fragment) height.
pub const MIN_HEIGHT: u32 = 1;
/// Largest accepted canvas (and fragment) height.
pub const MAX_HEIGHT: u32 = 50_000;

/// Identifier of a persisted canvas. Issued ids are always `> 0`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CanvasId(pub u64);

impl CanvasId {
    /// Reject the reserved id `0`.
    pub fn validate(self) -> ChartaResult<Self> {
        if self.0 == 0 {
            return Err(ChartaError::invalid_argument("canvas id must be > 0"));
        }
        Ok(self)
    }
}

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated pixel dimensions of a canvas or a requested rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasDims {
    /// Width in pixels, in `[MIN_WIDTH, MAX_WIDTH]`.
    pub width: u32,
    /// Height in pixels, in `[MIN_HEIGHT, MAX_HEIGHT]`.
    pub height: u32,
}

impl CanvasDims {
    /// Create dimensions, rejecting anything outside the accepted bounds.
    pub fn new(width: u32, height: u32) -> ChartaResult<Self> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(ChartaError::invalid_argument(format!(
                "width {width} must be in [{MIN_WIDTH}, {MAX_WIDTH}]"
            )));
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
            return Err(ChartaError::invalid_argument(format!(
                "height {height} must be in [{MIN_HEIGHT}, {MAX_HEIGHT}]"
            )));
        }
        Ok(Self { width, height })
    }

    /// The full extent as a rectangle anchored at the origin.
    pub fn bounds(self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }
}

/// Axis-aligned rectangle in top-down pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge (y grows downwards).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge. Computed in `u64` so `x + width` cannot overflow.
    pub fn right(self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Dimensions of the rectangle, validated against the canvas bounds.
    pub fn dims(self) -> ChartaResult<CanvasDims> {
        CanvasDims::new(self.width, self.height)
    }

    /// Return `true` when `self` lies entirely inside a canvas of `dims`.
    pub fn fits_within(self, dims: CanvasDims) -> bool {
        self.right() <= u64::from(dims.width) && self.bottom() <= u64::from(dims.height)
    }

    /// Return `true` when the two rectangles share at least one pixel.
    pub fn intersects(self, other: Region) -> bool {
        self.right() > u64::from(other.x)
            && u64::from(self.x) < other.right()
            && self.bottom() > u64::from(other.y)
            && u64::from(self.y) < other.bottom()
    }

    /// Overlapping rectangle, or `None` when the rectangles are disjoint.
    pub fn intersection(self, other: Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        // Both edges are bounded by a u32 edge of the non-empty overlap, so the narrowing holds.
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Region::new(
            x,
            y,
            (right - u64::from(x)) as u32,
            (bottom - u64::from(y)) as u32,
        ))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
