//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables.

use crate::{StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    upload_dir: PathBuf,
    last_project_file: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The upload directory is created when missing and stored in canonical form, so that every
    /// later confinement check compares against the real location. The last project file must
    /// live outside the upload directory; it is not part of the photo hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if:
    /// - the upload directory cannot be created or canonicalised,
    /// - the upload path exists but is not a directory,
    /// - the last project file would be stored inside the upload directory.
    pub fn new(upload_dir: PathBuf, last_project_file: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&upload_dir).map_err(StoreError::StorageDirCreation)?;

        let upload_dir = upload_dir.canonicalize().map_err(|e| {
            StoreError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                upload_dir.display(),
                e
            ))
        })?;

        if !upload_dir.is_dir() {
            return Err(StoreError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                upload_dir.display()
            )));
        }

        let last_project_file = absolute_file_path(&last_project_file)?;
        if last_project_file.starts_with(&upload_dir) {
            return Err(StoreError::InvalidInput(
                "last project file must not be stored inside the upload directory".into(),
            ));
        }

        Ok(Self {
            upload_dir,
            last_project_file,
        })
    }

    /// Canonical storage root.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn last_project_file(&self) -> &Path {
        &self.last_project_file
    }
}

/// Makes `file` absolute, resolving its parent directory when it already exists.
fn absolute_file_path(file: &Path) -> StoreResult<PathBuf> {
    let file_name = file.file_name().ok_or_else(|| {
        StoreError::InvalidInput(format!("not a file path: {}", file.display()))
    })?;

    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let parent = match parent.canonicalize() {
        Ok(p) => p,
        Err(_) if parent.is_absolute() => parent,
        Err(_) => std::env::current_dir()
            .map_err(StoreError::FileRead)?
            .join(parent),
    };

    Ok(parent.join(file_name))
}

/// Parse a positive integer setting from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn positive_usize_from_env_value(
    name: &str,
    value: Option<String>,
    default: usize,
) -> StoreResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(StoreError::InvalidInput(format!(
                "{name} must be a positive integer, got '{v}'"
            ))),
        },
    }
}
