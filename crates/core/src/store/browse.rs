//! Classified listings of the photo hierarchy.

use super::PhotoStore;
use crate::paths::layout::{compare_month_folders, has_photo_extension, is_date_folder, month_folder_name};
use crate::{StoreError, StoreResult};
use chrono::{Datelike, NaiveDateTime};
use std::fs;

/// Kind of an entry, derived from its depth and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Month,
    Project,
    Day,
    Photo,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Month => "month",
            EntryKind::Project => "project",
            EntryKind::Day => "day",
            EntryKind::Photo => "photo",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseEntry {
    pub name: String,
    /// Logical path relative to the storage root, `/`-separated.
    pub path: String,
    pub kind: EntryKind,
}

impl PhotoStore {
    /// Lists the immediate children of the folder at `path` (empty for the root).
    ///
    /// Children of the root are months, sorted by month number, newest first.
    /// Below that, folders named like a date are days and any other folder is a
    /// project; these are sorted by name. Files are listed only inside a day
    /// folder, and only if they carry a photo extension. Entries that cannot be
    /// read while listing are skipped.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `path` escapes the root,
    /// - `NotFound` if it does not exist or is not a folder,
    /// - `FileRead` if the folder cannot be listed.
    pub fn browse(&self, path: &str) -> StoreResult<Vec<BrowseEntry>> {
        let dir = self.resolver.resolve(path)?;
        if !dir.is_dir() {
            return Err(StoreError::NotFound(path.to_owned()));
        }

        let components = self
            .resolver
            .relative_components(&dir)
            .ok_or(StoreError::Forbidden)?;
        let depth = components.len();
        let in_day_folder = components.last().is_some_and(|name| is_date_folder(name));

        let mut entries = Vec::new();
        for item in fs::read_dir(&dir).map_err(StoreError::FileRead)? {
            let Ok(item) = item else { continue };
            let Ok(file_type) = item.file_type() else { continue };
            let name = item.file_name().to_string_lossy().into_owned();

            let kind = if file_type.is_dir() {
                if depth == 0 {
                    EntryKind::Month
                } else if is_date_folder(&name) {
                    EntryKind::Day
                } else {
                    EntryKind::Project
                }
            } else if in_day_folder && has_photo_extension(&name) {
                EntryKind::Photo
            } else {
                continue;
            };

            let entry_path = components
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(name.as_str()))
                .collect::<Vec<_>>()
                .join("/");

            entries.push(BrowseEntry {
                name,
                path: entry_path,
                kind,
            });
        }

        if depth == 0 {
            entries.sort_by(|a, b| compare_month_folders(&b.name, &a.name));
        } else {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(entries)
    }

    /// Names of the projects in the month folder of `now`, sorted by name.
    ///
    /// Returns an empty list if the month folder does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `FileRead` if the month folder exists but cannot be listed.
    pub fn projects_in_month(&self, now: NaiveDateTime) -> StoreResult<Vec<String>> {
        let Some(month_dir) = month_folder_name(now.month()) else {
            return Ok(Vec::new());
        };

        match self.browse(&month_dir) {
            Ok(entries) => Ok(entries
                .into_iter()
                .filter(|e| e.kind == EntryKind::Project)
                .map(|e| e.name)
                .collect()),
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}
