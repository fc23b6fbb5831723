//! Confinement of untrusted paths to the storage root.
//!
//! Clients address entries with `/`-separated logical paths such as
//! `09 SETIEMBRE/Wedding/2025-09-10/abc123.jpg`, independent of the host's
//! separator. [`PathResolver`] turns such a path into an absolute location and
//! guarantees it lies under the root.
//!
//! Confinement is checked with [`Path::starts_with`], which compares whole
//! components. A raw string prefix check would accept a sibling such as
//! `uploadArchive` for a root named `upload`.

use crate::{StoreError, StoreResult};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for `root`, which is canonicalised here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRootDirectory`] if the root cannot be canonicalised.
    pub fn new(root: &Path) -> StoreResult<Self> {
        let root = root.canonicalize().map_err(|e| {
            StoreError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an untrusted logical path to an absolute path under the root.
    ///
    /// Empty and `.` segments are skipped and `..` removes the previous component;
    /// a `..` at the root is rejected even if later segments would lead back in.
    /// Each remaining segment must be one plain path component on this host.
    /// An empty path resolves to the root itself. If the result exists, it is
    /// canonicalised as well so that symlinks cannot lead outside the root.
    ///
    /// The resolved path is not required to exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Forbidden`] when the path would leave the root at any point.
    pub fn resolve(&self, untrusted: &str) -> StoreResult<PathBuf> {
        let mut resolved = self.root.clone();

        for segment in untrusted.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if resolved == self.root {
                        return Err(StoreError::Forbidden);
                    }
                    resolved.pop();
                }
                _ => {
                    let mut components = Path::new(segment).components();
                    match (components.next(), components.next()) {
                        (Some(Component::Normal(name)), None) => resolved.push(name),
                        _ => return Err(StoreError::Forbidden),
                    }
                }
            }
        }

        if !resolved.starts_with(&self.root) {
            return Err(StoreError::Forbidden);
        }

        if let Ok(canonical) = resolved.canonicalize() {
            if !canonical.starts_with(&self.root) {
                tracing::warn!("symlink leads outside the storage root: {}", untrusted);
                return Err(StoreError::Forbidden);
            }
        }

        Ok(resolved)
    }

    /// Resolves a path that must name an entry *inside* the root.
    ///
    /// Used by operations that act on a single entry (rename, delete, serving a
    /// file). The root itself is never such an entry.
    pub fn resolve_entry(&self, untrusted: &str) -> StoreResult<PathBuf> {
        let resolved = self.resolve(untrusted)?;
        if resolved == self.root {
            return Err(StoreError::Forbidden);
        }
        Ok(resolved)
    }

    /// Components of `path` below the root, or `None` if `path` is not under it.
    pub fn relative_components(&self, path: &Path) -> Option<Vec<String>> {
        let relative = path.strip_prefix(&self.root).ok()?;
        Some(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect(),
        )
    }

    /// The `/`-separated logical path of `path` relative to the root.
    pub fn logical_path(&self, path: &Path) -> Option<String> {
        self.relative_components(path).map(|parts| parts.join("/"))
    }
}
