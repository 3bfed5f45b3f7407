//! Archive naming convention
//!
//! Archives are written as `<base_name>_<YYYY-MM-DD-HH-MM>.<ext>`. The matcher
//! also recognises the older date-only form `<base_name>_<YYYYMMDD>.<ext>` so
//! archives written under that scheme are still located and rotated.

use crate::utils::scanner::ScanEntry;
use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Timestamp appended to the base name of every new archive
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Base name used when a source path has no usable last segment
const FALLBACK_BASE_NAME: &str = "backup";

/// An existing archive in a target directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub file_name: String,
    pub base_name: String,
    pub modified: DateTime<Local>,
}

impl ArchiveFile {
    pub fn from_entry(entry: ScanEntry, base_name: &str) -> Self {
        Self {
            path: entry.path,
            file_name: entry.file_name,
            base_name: base_name.to_string(),
            modified: entry.modified,
        }
    }
}

/// File stem of an archive created at `now`
pub fn archive_stem(base_name: &str, now: DateTime<Local>) -> String {
    format!("{}_{}", base_name, now.format(TIMESTAMP_FORMAT))
}

/// Full file name of an archive created at `now`
pub fn archive_file_name(base_name: &str, now: DateTime<Local>, extension: &str) -> String {
    format!("{}.{}", archive_stem(base_name, now), extension)
}

/// Regex matching the whole file name of any archive of `base_name`
///
/// The base name is matched exactly; only the extension ignores case.
pub fn archive_matcher(base_name: &str, extensions: &[&str]) -> Result<Regex, regex::Error> {
    let extensions = extensions
        .iter()
        .map(|ext| regex::escape(ext.trim_start_matches('.')))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(
        r"^{}_(?:\d{{8}}|\d{{4}}-\d{{2}}-\d{{2}}-\d{{2}}-\d{{2}})\.(?i:{})$",
        regex::escape(base_name),
        extensions
    ))
}

/// Base name derived from a source path
///
/// Last path segment with spaces replaced by underscores; the extension is
/// dropped when the source is an existing file.
pub fn default_base_name(source: &Path) -> String {
    let segment = if source.is_file() {
        source.file_stem()
    } else {
        source.file_name()
    };

    match segment {
        Some(segment) if !segment.is_empty() => segment.to_string_lossy().replace(' ', "_"),
        _ => FALLBACK_BASE_NAME.to_string(),
    }
}
