//! Placement of uploads in the month/project/day hierarchy.

use crate::paths::layout::{PhotoPaths, StorageCoordinate};
use crate::{StoreError, StoreResult};
use chrono::NaiveDateTime;
use qphotos_types::PathSegment;
use std::fs;
use std::path::{Path, PathBuf};

/// Where an upload goes, both as a coordinate and as paths.
#[derive(Debug, Clone)]
pub struct PhotoLocation {
    pub coordinate: StorageCoordinate,
    pub paths: PhotoPaths,
    /// Absolute path of the photo file.
    pub file: PathBuf,
}

/// Maps uploads to their location under the storage root and creates the
/// directories leading to it.
///
/// Locations are derived from server time only, never from client paths, so no
/// path resolution is needed here; the project name and photo identifier are
/// each restricted to a single path component instead.
#[derive(Debug, Clone)]
pub struct HierarchicalStore {
    root: PathBuf,
}

impl HierarchicalStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Computes the location of photo `photo_id` of `project` received at
    /// `timestamp`, creating the month, project and day directories if missing.
    ///
    /// Does not write the photo itself. Creating an existing chain is not an
    /// error, including when another thread creates it concurrently.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if `project` or `photo_id` is blank or
    /// is not a single path component, and `StoreError::StorageDirCreation` if the
    /// directories cannot be created.
    pub fn locate(
        &self,
        timestamp: NaiveDateTime,
        project: &str,
        photo_id: &str,
    ) -> StoreResult<PhotoLocation> {
        let project = PathSegment::new(project)
            .map_err(|e| StoreError::InvalidInput(format!("project name: {e}")))?;
        let photo_id = PathSegment::new(photo_id)
            .map_err(|e| StoreError::InvalidInput(format!("uuid: {e}")))?;

        let coordinate = StorageCoordinate::new(timestamp, project);
        let paths = PhotoPaths::new(&coordinate, &photo_id);

        fs::create_dir_all(self.root.join(paths.dir())).map_err(StoreError::StorageDirCreation)?;

        Ok(PhotoLocation {
            file: self.root.join(paths.file()),
            coordinate,
            paths,
        })
    }
}
