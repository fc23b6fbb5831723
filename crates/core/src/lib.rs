//! # QPhotos Core
//!
//! Storage engine of the QPhotos upload server.
//!
//! This crate contains the filesystem operations on the photo hierarchy under
//! the configured upload directory:
//! - Confinement of client paths to the storage root
//! - Placement of uploads by month, project and day
//! - Idempotent ingestion keyed by the client's photo identifier
//! - Rename and delete of folders and photos, serialised by one mutation lock
//! - Classified browsing of the hierarchy
//!
//! **No API concerns**: HTTP routing and image codecs belong in `api-rest` and
//! `qphotos_media`. The caption drawing is reached through the [`Annotator`] trait.

pub mod annotate;
pub mod config;
pub mod constants;
pub mod error;
pub mod last_project;
pub mod paths;
pub mod store;

pub use annotate::{AnnotateError, Annotator};
pub use config::{positive_usize_from_env_value, CoreConfig};
pub use error::{StoreError, StoreResult};
pub use last_project::{FileLastProjectStore, InMemoryLastProjectStore, LastProjectStore};
pub use paths::resolver::PathResolver;
pub use store::browse::{BrowseEntry, EntryKind};
pub use store::ingest::{IngestOutcome, UploadRequest, ValidatedUpload};
pub use store::read::StoredFile;
pub use store::PhotoStore;
