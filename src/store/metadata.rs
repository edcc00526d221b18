use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::foundation::core::CanvasId;
use crate::foundation::error::{ChartaError, ChartaResult, IoContext};
use crate::ledger::CanvasRecord;

/// JSON persistence of [`CanvasRecord`]s as `<id>.json` files.
#[derive(Clone, Debug)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, id: CanvasId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Load the record of canvas `id`.
    pub fn load(&self, id: CanvasId) -> ChartaResult<CanvasRecord> {
        let path = self.path_for(id);
        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ChartaError::NotFound(id));
            }
            Err(err) => {
                return Err(ChartaError::io(
                    format!("open canvas record '{}'", path.display()),
                    err,
                ));
            }
        };
        let record: CanvasRecord = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ChartaError::serde(format!("parse '{}': {e}", path.display())))?;
        if record.id != id {
            return Err(ChartaError::serde(format!(
                "'{}' describes canvas {}",
                path.display(),
                record.id
            )));
        }
        Ok(record)
    }

    /// Persist `record`, replacing any previous version atomically.
    pub fn save(&self, record: &CanvasRecord) -> ChartaResult<()> {
        write_json_atomic(&self.path_for(record.id), record)
    }

    /// Remove the record. Returns `false` when there was nothing to remove.
    pub fn delete(&self, id: CanvasId) -> ChartaResult<bool> {
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ChartaError::io(
                format!("remove canvas record '{}'", path.display()),
                err,
            )),
        }
    }
}

/// Serialize `value` next to `path` and rename it into place.
pub(crate) fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> ChartaResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file =
        std::fs::File::create(&tmp).io_context(|| format!("create '{}'", tmp.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, value)
        .map_err(|e| ChartaError::serde(format!("serialize '{}': {e}", path.display())))?;
    out.flush()
        .io_context(|| format!("write '{}'", tmp.display()))?;
    drop(out);

    std::fs::rename(&tmp, path)
        .io_context(|| format!("replace '{}'", path.display()))
}

#[cfg(test)]
#[path = "../../tests/unit/store/metadata.rs"]
mod tests;
