//! Storage for the name of the last project that received an upload.
//!
//! The value is a single scalar. Writes replace it (last writer wins) and no
//! history is kept. Readers never observe a half-written value.

use crate::{StoreError, StoreResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub trait LastProjectStore: Send + Sync {
    /// Returns the stored project name, or `None` if nothing has been recorded.
    fn read(&self) -> StoreResult<Option<String>>;

    /// Replaces the stored project name.
    fn write(&self, project: &str) -> StoreResult<()>;
}

/// Keeps the last project in a plain text file outside the photo hierarchy.
#[derive(Debug, Clone)]
pub struct FileLastProjectStore {
    path: PathBuf,
}

impl FileLastProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LastProjectStore for FileLastProjectStore {
    fn read(&self) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::LastProject(e)),
        }
    }

    fn write(&self, project: &str) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        // Replace the file by rename so a concurrent read sees the old or the new name.
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(StoreError::LastProject)?;
        tmp.write_all(project.as_bytes())
            .map_err(StoreError::LastProject)?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::LastProject(e.error))?;

        Ok(())
    }
}

/// In-memory store, for tests and for tools that do not need persistence.
#[derive(Debug, Default)]
pub struct InMemoryLastProjectStore {
    value: RwLock<Option<String>>,
}

impl LastProjectStore for InMemoryLastProjectStore {
    fn read(&self) -> StoreResult<Option<String>> {
        let guard = self.value.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn write(&self, project: &str) -> StoreResult<()> {
        let mut guard = self.value.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(project.to_owned());
        Ok(())
    }
}
