use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::error::{ChartaResult, IoContext};

static NEXT_SCRATCH: AtomicU64 = AtomicU64::new(0);

/// Directory holding throwaway canvases.
#[derive(Clone, Debug)]
pub struct ScratchSpace {
    dir: PathBuf,
}

impl ScratchSpace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a unique file path inside the scratch directory.
    ///
    /// The file itself is not created; it is removed (if present) when the guard drops.
    pub fn reserve(&self, label: &str) -> ChartaResult<ScratchFile> {
        std::fs::create_dir_all(&self.dir)
            .io_context(|| format!("create scratch dir '{}'", self.dir.display()))?;
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seq = NEXT_SCRATCH.fetch_add(1, Ordering::Relaxed);
        let name = format!("{label}_{}_{seq}_{nanos}.bmp", std::process::id());
        Ok(ScratchFile {
            path: self.dir.join(name),
        })
    }
}

/// Path guard for one scratch file; deletes the file on drop, on every exit path.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), %err, "failed to remove scratch file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/scratch.rs"]
mod tests;
