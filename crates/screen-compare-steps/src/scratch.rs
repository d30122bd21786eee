//! Scratch directory handle and temporary artifact cleanup.

use std::path::{Path, PathBuf};

use crate::error::{StepError, StepResult};

/// Directory holding reference images, captured screenshots and downloads.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Open the scratch directory, creating it if missing.
    pub fn open(path: impl Into<PathBuf>) -> StepResult<Self> {
        let root = path.into();
        if let Err(source) = std::fs::create_dir_all(&root) {
            return Err(StepError::Scratch { path: root, source });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the scratch directory.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Find the file a capture tool actually wrote for `requested`.
    ///
    /// An existing file at the requested name is used as-is. Otherwise the
    /// capture tool may have decorated the name (`compare_home_0.png` for
    /// `compare_home.png`), so any entry starting with the stem of the
    /// requested name matches. The last match in directory order wins; with
    /// no match the requested name is returned unchanged.
    pub fn resolve_capture(&self, requested: &str) -> StepResult<String> {
        if self.path_of(requested).is_file() {
            return Ok(requested.to_string());
        }

        let stem = requested.split('.').next().unwrap_or(requested);
        let mut found = requested.to_string();

        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) => return Err(self.io_error(source)),
        };
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(stem) {
                    found = name.to_string();
                }
            }
        }

        tracing::debug!("Resolved capture {requested} -> {found}");
        Ok(found)
    }

    fn io_error(&self, source: std::io::Error) -> StepError {
        StepError::Scratch {
            path: self.root.clone(),
            source,
        }
    }
}

/// A file that is removed when the guard is dropped.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {e}", self.path.display()),
        }
    }
}
