use crate::foundation::core::{CanvasId, Region};

/// Result alias used throughout the crate.
pub type ChartaResult<T> = Result<T, ChartaError>;

/// Coarse classification of a [`ChartaError`].
///
/// Front ends map this onto their own status codes (HTTP status, process exit code, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartaErrorKind {
    /// Bad dimensions, coordinates, ids or a malformed fragment header.
    InvalidArgument,
    /// Unknown canvas id.
    NotFound,
    /// Fragment rectangle does not fit the target canvas.
    OutOfRange,
    /// No written fragment intersects the requested area.
    NoData,
    /// Backing storage unreadable, unwritable or truncated mid-operation.
    IoFailure,
    /// Delete removed only part of a canvas; needs manual reconciliation.
    PartialDelete,
}

#[derive(thiserror::Error, Debug)]
pub enum ChartaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("canvas {0} not found")]
    NotFound(CanvasId),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("no fragment has been written in area {0}")]
    NoData(Region),

    #[error("i/o failure: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("canvas {id} partially deleted: {detail}")]
    PartialDelete { id: CanvasId, detail: String },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChartaError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn kind(&self) -> ChartaErrorKind {
        match self {
            Self::InvalidArgument(_) => ChartaErrorKind::InvalidArgument,
            Self::NotFound(_) => ChartaErrorKind::NotFound,
            Self::OutOfRange(_) => ChartaErrorKind::OutOfRange,
            Self::NoData(_) => ChartaErrorKind::NoData,
            Self::PartialDelete { .. } => ChartaErrorKind::PartialDelete,
            Self::Io { .. } | Self::Serde(_) | Self::Other(_) => ChartaErrorKind::IoFailure,
        }
    }
}

/// Attach a lazily built context message to an `std::io::Result`, producing [`ChartaError::Io`].
pub trait IoContext<T> {
    fn io_context<C, F>(self, f: F) -> ChartaResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C, F>(self, f: F) -> ChartaResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| ChartaError::io(f(), source))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
