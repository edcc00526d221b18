use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::foundation::core::CanvasId;
use crate::foundation::error::{ChartaError, ChartaResult};
use crate::store::metadata::write_json_atomic;

/// Process options persisted across restarts (`options.json`).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Most recently issued canvas id; `0` before the first canvas.
    pub last_issued_id: u64,
}

/// Hands out canvas ids that are never reused, even across restarts.
#[derive(Debug)]
pub struct IdAllocator {
    path: PathBuf,
    options: StartOptions,
}

impl IdAllocator {
    /// Load the counter from `path`, creating it at zero when absent.
    pub fn load(path: impl Into<PathBuf>) -> ChartaResult<Self> {
        let path = path.into();
        let options: StartOptions = match std::fs::File::open(&path) {
            Ok(f) => serde_json::from_reader(BufReader::new(f))
                .map_err(|e| ChartaError::serde(format!("parse '{}': {e}", path.display())))?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let options = StartOptions::default();
                write_json_atomic(&path, &options)?;
                options
            }
            Err(err) => {
                return Err(ChartaError::io(
                    format!("open options '{}'", path.display()),
                    err,
                ));
            }
        };
        tracing::debug!(path = %path.display(), last = options.last_issued_id, "loaded id counter");
        Ok(Self { path, options })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recently issued id, if any.
    pub fn last_issued(&self) -> Option<CanvasId> {
        (self.options.last_issued_id > 0).then_some(CanvasId(self.options.last_issued_id))
    }

    /// Issue the next id. The counter is persisted before the id is handed out.
    pub fn allocate(&mut self) -> ChartaResult<CanvasId> {
        let next = self
            .options
            .last_issued_id
            .checked_add(1)
            .ok_or_else(|| ChartaError::invalid_argument("canvas id space exhausted"))?;
        let options = StartOptions {
            last_issued_id: next,
        };
        write_json_atomic(&self.path, &options)?;
        self.options = options;
        Ok(CanvasId(next))
    }

    /// Write the current counter to disk.
    pub fn persist(&self) -> ChartaResult<()> {
        write_json_atomic(&self.path, &self.options)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/ids.rs"]
mod tests;
