//! Photo hierarchy on-disk layout.
//!
//! This module defines the relative filesystem structure of the photo store.
//! It contains **no I/O**. Its sole responsibility is to provide typed,
//! canonical paths so that layout invariants are defined in exactly one place.
//!
//! # Path Structure
//!
//! ```text
//! <NN MONTHNAME>/
//!     <project>/
//!         <YYYY-MM-DD>/
//!             <uuid>.jpg
//! ```
//!
//! For example `09 SETIEMBRE/Wedding/2025-09-10/abc123.jpg`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use qphotos_types::PathSegment;

use crate::constants::{DAY_FOLDER_FORMAT, MONTH_NAMES, PHOTO_EXTENSION, PHOTO_EXTENSIONS};

/// Month folder name for `month` (1-12): zero-padded number, a space, and the month name.
///
/// Returns `None` for months outside `1..=12`.
pub fn month_folder_name(month: u32) -> Option<String> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    let name = MONTH_NAMES.get(index)?;
    Some(format!("{month:02} {name}"))
}

/// Whether `name` is exactly four digits, a dash, two digits, a dash, two digits.
pub fn is_date_folder(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Leading decimal number of a folder name, e.g. `11` for `11 NOVIEMBRE`.
pub fn month_number_prefix(name: &str) -> Option<u32> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    name[..digits].parse().ok()
}

/// Orders month folders by their numeric prefix, falling back to the name.
///
/// Names without a numeric prefix sort before any numbered folder, so a descending
/// sort places them last.
pub fn compare_month_folders(a: &str, b: &str) -> Ordering {
    match (month_number_prefix(a), month_number_prefix(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Whether a file name carries a recognised photo extension (case-insensitive).
pub fn has_photo_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PHOTO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Where a photo belongs: month, project and day, derived from server time.
///
/// A coordinate is computed once per upload and never from client-supplied timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCoordinate {
    month: u32,
    month_name: &'static str,
    project: PathSegment,
    date: NaiveDate,
}

impl StorageCoordinate {
    /// Derives the coordinate for an upload received at `timestamp` for `project`.
    pub fn new(timestamp: NaiveDateTime, project: PathSegment) -> Self {
        let month = timestamp.month();
        Self {
            month,
            // chrono guarantees month() is within 1..=12
            month_name: MONTH_NAMES[(month - 1) as usize],
            project,
            date: timestamp.date(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        self.month_name
    }

    pub fn project(&self) -> &PathSegment {
        &self.project
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// e.g. `09 SETIEMBRE`
    pub fn month_dir_name(&self) -> String {
        format!("{:02} {}", self.month, self.month_name)
    }

    /// e.g. `2025-09-10`
    pub fn day_dir_name(&self) -> String {
        self.date.format(DAY_FOLDER_FORMAT).to_string()
    }
}

/// Relative on-disk paths for a single photo.
///
/// The paths are relative to the storage root and must be joined to it
/// before filesystem access.
#[derive(Debug, Clone)]
pub struct PhotoPaths {
    relative_dir: PathBuf,
    file_name: String,
}

impl PhotoPaths {
    /// The file name is the photo identifier plus the photo extension, nothing else,
    /// so the same identifier always maps to the same file.
    pub fn new(coordinate: &StorageCoordinate, photo_id: &PathSegment) -> Self {
        Self {
            relative_dir: PathBuf::from(coordinate.month_dir_name())
                .join(coordinate.project())
                .join(coordinate.day_dir_name()),
            file_name: format!("{}.{}", photo_id, PHOTO_EXTENSION),
        }
    }

    /// Relative path to the day directory holding the photo.
    pub fn dir(&self) -> &Path {
        &self.relative_dir
    }

    /// Relative path to the photo file.
    pub fn file(&self) -> PathBuf {
        self.relative_dir.join(&self.file_name)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The photo path with `/` separators, as reported to clients.
    pub fn logical_path(&self) -> String {
        self.file()
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
