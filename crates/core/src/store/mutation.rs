//! Rename and delete of folders and photos.
//!
//! Targets are untrusted logical paths and go through the resolver first, so
//! an escaping path fails with `Forbidden` before anything is touched. Every
//! operation runs under the mutation lock.

use super::PhotoStore;
use crate::{StoreError, StoreResult};
use qphotos_types::{PathSegment, TextError};
use std::fs;
use std::path::Path;

impl PhotoStore {
    /// Renames the entry at `target` to `new_name`, keeping it in the same parent folder.
    ///
    /// Returns the new logical path. Renaming an entry to its current name is a no-op.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `target` escapes the root or is the root,
    /// - `InvalidInput` if `new_name` is blank or not a single path component,
    /// - `NotFound` if `target` does not exist,
    /// - `Conflict` if an entry named `new_name` already exists next to it,
    /// - `Rename` if the filesystem rename fails.
    pub fn rename(&self, target: &str, new_name: &str) -> StoreResult<String> {
        let source = self.resolver.resolve_entry(target)?;
        let new_name = PathSegment::new(new_name).map_err(|e| match e {
            TextError::Empty => StoreError::InvalidInput("New name not provided".into()),
            other => StoreError::InvalidInput(format!("new name: {other}")),
        })?;

        let _guard = self.lock_mutations();

        if !exists_no_follow(&source) {
            return Err(StoreError::NotFound(target.to_owned()));
        }

        let parent = source.parent().ok_or(StoreError::Forbidden)?;
        let destination = parent.join(&new_name);
        let new_path = self
            .resolver
            .logical_path(&destination)
            .ok_or(StoreError::Forbidden)?;

        if destination == source {
            return Ok(new_path);
        }
        if exists_no_follow(&destination) {
            return Err(StoreError::Conflict(new_path));
        }

        fs::rename(&source, &destination).map_err(StoreError::Rename)?;

        tracing::info!("renamed {} to {}", target, new_path);
        Ok(new_path)
    }

    /// Deletes the entry at `target`: a folder with everything under it, or a single file.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `target` escapes the root or is the root,
    /// - `NotFound` if `target` does not exist,
    /// - `Remove` if the filesystem removal fails.
    pub fn delete(&self, target: &str) -> StoreResult<()> {
        let path = self.resolver.resolve_entry(target)?;
        let _guard = self.lock_mutations();

        let metadata = fs::symlink_metadata(&path)
            .map_err(|_| StoreError::NotFound(target.to_owned()))?;

        if metadata.is_dir() {
            fs::remove_dir_all(&path).map_err(StoreError::Remove)?;
        } else {
            fs::remove_file(&path).map_err(StoreError::Remove)?;
        }

        tracing::info!("deleted {}", target);
        Ok(())
    }

    /// Deletes the single photo at `target`.
    ///
    /// # Errors
    ///
    /// As [`PhotoStore::delete`], plus `InvalidInput` if `target` is a folder.
    pub fn delete_photo(&self, target: &str) -> StoreResult<()> {
        let path = self.resolver.resolve_entry(target)?;
        let _guard = self.lock_mutations();

        let metadata = fs::symlink_metadata(&path)
            .map_err(|_| StoreError::NotFound(target.to_owned()))?;
        if metadata.is_dir() {
            return Err(StoreError::InvalidInput(format!("{target} is a folder")));
        }

        fs::remove_file(&path).map_err(StoreError::Remove)?;

        tracing::info!("deleted photo {}", target);
        Ok(())
    }
}

fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use crate::store::ingest::UploadRequest;
    use crate::store::test_support::{at, fixture, Fixture};
    use crate::StoreError;

    fn seed(fx: &Fixture, id: &str, project: &str) -> String {
        let upload = UploadRequest {
            photo_id: Some(id.into()),
            project_name: Some(project.into()),
            file: Some(b"img".to_vec()),
        }
        .validate()
        .unwrap();
        fx.store
            .ingest(upload, at(2025, 9, 10))
            .unwrap()
            .path()
            .to_owned()
    }

    #[test]
    fn test_rename_project_folder() {
        let fx = fixture();
        seed(&fx, "abc123", "Wedding");

        let new_path = fx
            .store
            .rename("09 SETIEMBRE/Wedding", "Boda Ana")
            .unwrap();

        assert_eq!(new_path, "09 SETIEMBRE/Boda Ana");
        assert!(!fx.root().join("09 SETIEMBRE/Wedding").exists());
        assert!(fx
            .root()
            .join("09 SETIEMBRE/Boda Ana/2025-09-10/abc123.jpg")
            .is_file());
    }

    #[test]
    fn test_rename_trims_new_name() {
        let fx = fixture();
        seed(&fx, "abc123", "Wedding");

        let new_path = fx.store.rename("09 SETIEMBRE/Wedding", "  Boda ").unwrap();
        assert_eq!(new_path, "09 SETIEMBRE/Boda");
    }

    #[test]
    fn test_rename_rejects_blank_name() {
        let fx = fixture();
        seed(&fx, "abc123", "Wedding");

        for name in ["", "   "] {
            assert!(matches!(
                fx.store.rename("09 SETIEMBRE/Wedding", name),
                Err(StoreError::InvalidInput(ref m)) if m == "New name not provided"
            ));
        }
        assert!(fx.root().join("09 SETIEMBRE/Wedding").is_dir());
    }

    #[test]
    fn test_rename_rejects_name_with_separator() {
        let fx = fixture();
        seed(&fx, "abc123", "Wedding");

        for name in ["../../escaped", "a/b", ".."] {
            assert!(matches!(
                fx.store.rename("09 SETIEMBRE/Wedding", name),
                Err(StoreError::InvalidInput(_))
            ));
        }
        assert!(fx.root().join("09 SETIEMBRE/Wedding").is_dir());
    }

    #[test]
    fn test_rename_missing_target() {
        let fx = fixture();

        assert!(matches!(
            fx.store.rename("09 SETIEMBRE/Nope", "Other"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_rejects_existing_destination() {
        let fx = fixture();
        seed(&fx, "a", "Wedding");
        seed(&fx, "b", "Obra");

        let err = fx.store.rename("09 SETIEMBRE/Wedding", "Obra").unwrap_err();

        assert!(matches!(err, StoreError::Conflict(ref p) if p == "09 SETIEMBRE/Obra"));
        assert!(fx.root().join("09 SETIEMBRE/Wedding/2025-09-10/a.jpg").is_file());
        assert!(fx.root().join("09 SETIEMBRE/Obra/2025-09-10/b.jpg").is_file());
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let fx = fixture();
        seed(&fx, "a", "Wedding");

        let new_path = fx.store.rename("09 SETIEMBRE/Wedding", "Wedding").unwrap();
        assert_eq!(new_path, "09 SETIEMBRE/Wedding");
        assert!(fx.root().join("09 SETIEMBRE/Wedding/2025-09-10/a.jpg").is_file());
    }

    #[test]
    fn test_rename_rejects_traversal_and_root() {
        let fx = fixture();

        assert!(matches!(
            fx.store.rename("../outside", "x"),
            Err(StoreError::Forbidden)
        ));
        assert!(matches!(fx.store.rename("", "x"), Err(StoreError::Forbidden)));
    }

    #[test]
    fn test_delete_folder_recursively() {
        let fx = fixture();
        seed(&fx, "a", "Wedding");
        seed(&fx, "b", "Wedding");

        fx.store.delete("09 SETIEMBRE/Wedding").unwrap();

        assert!(!fx.root().join("09 SETIEMBRE/Wedding").exists());
        assert!(fx.root().join("09 SETIEMBRE").is_dir());
    }

    #[test]
    fn test_delete_single_file() {
        let fx = fixture();
        let path = seed(&fx, "a", "Wedding");
        seed(&fx, "b", "Wedding");

        fx.store.delete(&path).unwrap();

        assert!(!fx.root().join(&path).exists());
        assert!(fx.root().join("09 SETIEMBRE/Wedding/2025-09-10/b.jpg").is_file());
    }

    #[test]
    fn test_delete_missing_and_forbidden() {
        let fx = fixture();

        assert!(matches!(
            fx.store.delete("01 ENERO/Nope"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            fx.store.delete("../last_project.txt"),
            Err(StoreError::Forbidden)
        ));
        assert!(matches!(fx.store.delete(""), Err(StoreError::Forbidden)));
        assert!(fx.root().is_dir());
    }

    #[test]
    fn test_delete_photo_requires_file() {
        let fx = fixture();
        let path = seed(&fx, "a", "Wedding");

        assert!(matches!(
            fx.store.delete_photo("09 SETIEMBRE/Wedding"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(fx.root().join(&path).is_file());

        fx.store.delete_photo(&path).unwrap();
        assert!(!fx.root().join(&path).exists());
        assert!(matches!(
            fx.store.delete_photo(&path),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_deletes_of_same_target() {
        let fx = fixture();
        seed(&fx, "a", "Wedding");

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let store = &fx.store;
                    s.spawn(move || store.delete("09 SETIEMBRE/Wedding"))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StoreError::NotFound(_))));
        assert!(!fx.root().join("09 SETIEMBRE/Wedding").exists());
    }
}
