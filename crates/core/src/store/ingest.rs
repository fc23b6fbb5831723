//! Ingestion of uploaded photos.
//!
//! An upload goes through these steps:
//!
//! 1. **Validate**: uuid, file and project name must all be present ([`UploadRequest::validate`])
//! 2. **Locate**: derive the month/project/day path from server time
//! 3. **Deduplicate**: if the file already exists the upload is a no-op success
//! 4. **Annotate**: caption the image with the project and time
//! 5. **Persist**: write to a temporary file next to the target and rename it into place
//! 6. **Record**: remember the project as the last one used
//!
//! Steps 2 to 6 hold the mutation lock. Because the file name is the client
//! identifier, a retried upload (e.g. after a client timeout) lands on the
//! same path and is recognised as a duplicate.

use super::PhotoStore;
use crate::constants::{CAPTION_TIME_FORMAT, INCOMING_FILE_PREFIX};
use crate::{StoreError, StoreResult};
use chrono::NaiveDateTime;
use qphotos_types::PathSegment;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Upload as received from a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub photo_id: Option<String>,
    pub project_name: Option<String>,
    pub file: Option<Vec<u8>>,
}

impl UploadRequest {
    /// Checks that every required part is present.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if the uuid is missing or blank, if there
    /// is no file (or it is empty), or if the trimmed project name is empty.
    /// Both the uuid and project name must be usable as a single path component.
    /// The project name is trimmed; the uuid becomes the file name as given, so
    /// surrounding whitespace in it is rejected rather than stripped.
    pub fn validate(self) -> StoreResult<ValidatedUpload> {
        let photo_id = self
            .photo_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| StoreError::InvalidInput("Missing unique ID (uuid)".into()))?;
        let segment = PathSegment::new(&photo_id)
            .map_err(|e| StoreError::InvalidInput(format!("uuid: {e}")))?;
        if segment.as_str() != photo_id {
            return Err(StoreError::InvalidInput(format!(
                "uuid: '{photo_id}' has surrounding whitespace"
            )));
        }
        let photo_id = segment;

        let bytes = self
            .file
            .ok_or_else(|| StoreError::InvalidInput("No file part in the request".into()))?;

        let project_name = self.project_name.unwrap_or_default();
        if bytes.is_empty() || project_name.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "Missing file or project name".into(),
            ));
        }
        let project = PathSegment::new(project_name)
            .map_err(|e| StoreError::InvalidInput(format!("project name: {e}")))?;

        Ok(ValidatedUpload {
            photo_id,
            project,
            bytes,
        })
    }
}

/// An upload whose required parts have been checked.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    photo_id: PathSegment,
    project: PathSegment,
    bytes: Vec<u8>,
}

impl ValidatedUpload {
    pub fn photo_id(&self) -> &PathSegment {
        &self.photo_id
    }

    pub fn project(&self) -> &PathSegment {
        &self.project
    }
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The photo was annotated and stored at `path`.
    Stored { path: String },
    /// A photo with the same identifier already exists at `path`; nothing was written.
    DuplicateIgnored { path: String },
}

impl IngestOutcome {
    /// Logical path of the photo, relative to the storage root.
    pub fn path(&self) -> &str {
        match self {
            IngestOutcome::Stored { path } | IngestOutcome::DuplicateIgnored { path } => path,
        }
    }
}

impl PhotoStore {
    /// Stores an upload received at `received_at` (server wall-clock time).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if:
    /// - the directory chain cannot be created (`StorageDirCreation`),
    /// - the annotator rejects the image (`Annotation`); nothing is written,
    /// - the photo cannot be written (`FileWrite`),
    /// - the last project cannot be recorded (`LastProject`); the photo is kept,
    ///   so a retry reports a duplicate.
    pub fn ingest(
        &self,
        upload: ValidatedUpload,
        received_at: NaiveDateTime,
    ) -> StoreResult<IngestOutcome> {
        let _guard = self.lock_mutations();

        let location =
            self.hierarchy
                .locate(received_at, upload.project.as_str(), upload.photo_id.as_str())?;
        let path = location.paths.logical_path();

        if location.file.exists() {
            tracing::debug!("duplicate upload ignored: {}", path);
            return Ok(IngestOutcome::DuplicateIgnored { path });
        }

        let caption = format!(
            "{} - {}",
            upload.project,
            received_at.format(CAPTION_TIME_FORMAT)
        );
        let annotated = self
            .annotator
            .annotate(&upload.bytes, &caption)
            .map_err(StoreError::Annotation)?;

        if !persist_new_file(&location.file, &annotated)? {
            tracing::debug!("photo appeared before persisting, ignoring upload: {}", path);
            return Ok(IngestOutcome::DuplicateIgnored { path });
        }

        self.last_project.write(upload.project.as_str())?;

        tracing::info!("stored photo {}", path);
        Ok(IngestOutcome::Stored { path })
    }
}

/// Writes `bytes` to `target` through a temporary file in the same directory.
///
/// The temporary name carries no photo extension, so listings never show a
/// partially written photo. Returns `false` without touching `target` if it
/// already exists.
fn persist_new_file(target: &Path, bytes: &[u8]) -> StoreResult<bool> {
    let dir = target.parent().ok_or_else(|| {
        StoreError::FileWrite(std::io::Error::new(
            ErrorKind::InvalidInput,
            "photo path has no parent directory",
        ))
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(INCOMING_FILE_PREFIX)
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(StoreError::FileWrite)?;
    tmp.write_all(bytes).map_err(StoreError::FileWrite)?;
    tmp.as_file().sync_all().map_err(StoreError::FileWrite)?;

    match tmp.persist_noclobber(target) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(StoreError::FileWrite(e.error)),
    }
}
