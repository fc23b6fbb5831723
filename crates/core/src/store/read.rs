//! Read access to stored files and the last project.

use super::PhotoStore;
use crate::{StoreError, StoreResult};
use std::fs;
use std::io::ErrorKind;

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Raw contents of a stored file with its sniffed media type.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

impl PhotoStore {
    /// Reads the file at `path` as stored, without any transformation.
    ///
    /// The media type is detected from the file contents and defaults to
    /// `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `path` escapes the root or is the root,
    /// - `NotFound` if it does not exist or is a folder,
    /// - `FileRead` if it cannot be read.
    pub fn read_file(&self, path: &str) -> StoreResult<StoredFile> {
        let resolved = self.resolver.resolve_entry(path)?;
        if !resolved.is_file() {
            return Err(StoreError::NotFound(path.to_owned()));
        }

        let bytes = fs::read(&resolved).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.to_owned()),
            _ => StoreError::FileRead(e),
        })?;
        let media_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(DEFAULT_MEDIA_TYPE);

        Ok(StoredFile { bytes, media_type })
    }

    /// The project of the most recent stored upload, if any.
    pub fn last_project(&self) -> StoreResult<Option<String>> {
        self.last_project.read()
    }
}
