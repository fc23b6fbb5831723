//! # API Shared
//!
//! Shared request and response types for the QPhotos APIs.
//!
//! Contains:
//! - JSON bodies exchanged with the mobile client and the web UI
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; the types carry `utoipa` schemas for the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod health;

pub use health::HealthService;

/// Message returned by a successful upload that stored a new photo.
pub const UPLOAD_STORED_MESSAGE: &str = "File uploaded successfully.";

/// Message returned by an upload whose identifier was already stored.
pub const UPLOAD_DUPLICATE_MESSAGE: &str = "Duplicate ignored.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessRes {
    pub success: String,
}

impl SuccessRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: message.into(),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RenameReq {
    #[serde(default)]
    pub new_name: String,
}

/// The project of the latest upload; empty when nothing has been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LastProjectRes {
    pub last_project: String,
}

/// One child of a browsed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BrowseItem {
    pub name: String,
    /// Path relative to the storage root, usable with the other endpoints.
    pub path: String,
    /// One of `month`, `project`, `day`, `photo`.
    #[serde(rename = "type")]
    pub kind: String,
}
