//! Constants used throughout the QPhotos core crate.
//!
//! This module contains the path, filename and naming constants of the storage
//! layout so the on-disk format is defined in one place.

/// Default storage root for uploaded photos when no explicit directory is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "upload";

/// Default file holding the last project name used for an upload.
pub const DEFAULT_LAST_PROJECT_FILE: &str = "last_project.txt";

/// Month names used for month folders, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SETIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

/// Extension given to every stored photo.
pub const PHOTO_EXTENSION: &str = "jpg";

/// Extensions recognised as photos when browsing a day folder (compared case-insensitively).
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Prefix of in-flight upload files. They never carry a photo extension, so browsing skips them.
pub const INCOMING_FILE_PREFIX: &str = ".incoming-";

/// Caption timestamp format, e.g. `2025-09-10 14:03:59`.
pub const CAPTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Day folder name format, e.g. `2025-09-10`.
pub const DAY_FOLDER_FORMAT: &str = "%Y-%m-%d";
