use std::path::{Path, PathBuf};

use crate::foundation::error::{ChartaError, ChartaResult};

/// File name of the persisted process options inside the workspace.
pub const OPTIONS_FILE: &str = "options.json";

/// Where canvases, their records and the id counter live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Workspace directory; must exist and be writable.
    pub root: PathBuf,
}

impl WorkspaceConfig {
    /// Use `root` as-is. Fails when it is not a writable directory.
    pub fn new(root: impl Into<PathBuf>) -> ChartaResult<Self> {
        let root = root.into();
        if !is_writable_dir(&root) {
            return Err(ChartaError::invalid_argument(format!(
                "workspace '{}' is not a writable directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Use `requested` when it is a writable directory, otherwise fall back to the current
    /// directory with a warning.
    pub fn resolve(requested: Option<&Path>) -> ChartaResult<Self> {
        if let Some(path) = requested {
            if is_writable_dir(path) {
                return Ok(Self {
                    root: path.to_path_buf(),
                });
            }
            tracing::warn!(
                path = %path.display(),
                "unable to use requested workspace, falling back to current directory"
            );
        }
        let cwd = std::env::current_dir()
            .map_err(|e| ChartaError::io("resolve current directory", e))?;
        Self::new(cwd)
    }

    pub fn options_path(&self) -> PathBuf {
        self.root.join(OPTIONS_FILE)
    }
}

fn is_writable_dir(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
