//! The photo storage engine.
//!
//! [`PhotoStore`] owns the storage root and is the only writer of the photo
//! hierarchy. Its operations are split by concern:
//!
//! - `hierarchy`: maps an upload to its month/project/day location
//! - `ingest`: validation, deduplication, annotation and atomic persistence of uploads
//! - `mutation`: rename and delete of folders and photos
//! - `browse`: classified, sorted directory listings
//! - `read`: serving stored files and the last project name
//!
//! ## Concurrency
//!
//! Every mutation (ingest, rename, delete) holds the store's mutation lock for
//! its whole filesystem sequence, so mutations apply in lock-acquisition order
//! and never interleave. Reads take no lock. A read running next to a mutation
//! can see a transient state, e.g. a photo missing while its folder is being
//! renamed, or a listing without an upload that is still in flight.

pub mod browse;
pub mod hierarchy;
pub mod ingest;
pub mod mutation;
pub mod read;

use crate::annotate::Annotator;
use crate::config::CoreConfig;
use crate::last_project::LastProjectStore;
use crate::paths::resolver::PathResolver;
use crate::StoreResult;
use hierarchy::HierarchicalStore;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage engine for the photo hierarchy.
///
/// Share one instance (behind an `Arc`) between all request handlers; the
/// mutation lock only serialises mutations issued through the same instance.
pub struct PhotoStore {
    cfg: Arc<CoreConfig>,
    resolver: PathResolver,
    hierarchy: HierarchicalStore,
    annotator: Arc<dyn Annotator>,
    last_project: Arc<dyn LastProjectStore>,
    mutation_lock: Mutex<()>,
}

impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("upload_dir", &self.cfg.upload_dir())
            .finish_non_exhaustive()
    }
}

impl PhotoStore {
    /// Creates a store over the configured upload directory.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Core configuration with the (canonical) upload directory
    /// * `annotator` - Captions uploads before they are stored
    /// * `last_project` - Records the project of the latest stored upload
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRootDirectory` if the upload directory cannot be resolved.
    pub fn new(
        cfg: Arc<CoreConfig>,
        annotator: Arc<dyn Annotator>,
        last_project: Arc<dyn LastProjectStore>,
    ) -> StoreResult<Self> {
        let resolver = PathResolver::new(cfg.upload_dir())?;
        let hierarchy = HierarchicalStore::new(resolver.root());

        Ok(Self {
            cfg,
            resolver,
            hierarchy,
            annotator,
            last_project,
            mutation_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Acquires the mutation lock; the guard releases it on every exit path.
    ///
    /// The lock guards no data, so a panic in another mutation leaves nothing
    /// inconsistent behind and a poisoned lock is simply taken over.
    fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.mutation_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
