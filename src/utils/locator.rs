//! Backup locator
//!
//! Finds the archives of a base name in a target directory, and the most
//! recent one inside the recency window.

use crate::utils::error::ScanError;
use crate::utils::naming::{self, ArchiveFile};
use crate::utils::scanner::{scan, ScanFilter};
use chrono::{DateTime, Duration, Local};
use tracing::debug;

/// Archives older than this do not count as a previous backup
pub const RECENCY_WINDOW_DAYS: i64 = 500;

/// Oldest modify time that still counts as a previous backup at `now`
pub fn recency_horizon(now: DateTime<Local>) -> DateTime<Local> {
    now - Duration::days(RECENCY_WINDOW_DAYS)
}

/// All archives of `base_name` at the top level of `target_dir`, in name order
pub fn list_archives(
    target_dir: &std::path::Path,
    base_name: &str,
    extensions: &[&str],
) -> Result<Vec<ArchiveFile>, ScanError> {
    let matcher = naming::archive_matcher(base_name, extensions).map_err(|source| {
        ScanError::Pattern {
            pattern: base_name.to_string(),
            source,
        }
    })?;
    let filter = ScanFilter::new()
        .extensions(extensions)
        .top_only(true)
        .name_regex(matcher);

    scan(target_dir, &filter)?
        .map(|entry| entry.map(|e| ArchiveFile::from_entry(e, base_name)))
        .collect()
}

/// Most recent archive of `base_name` modified after the recency horizon
///
/// Equal modify times resolve to the greatest file name.
pub fn find_last_backup(
    target_dir: &std::path::Path,
    base_name: &str,
    extensions: &[&str],
    now: DateTime<Local>,
) -> Result<Option<ArchiveFile>, ScanError> {
    let horizon = recency_horizon(now);
    let mut last: Option<ArchiveFile> = None;

    for archive in list_archives(target_dir, base_name, extensions)? {
        if archive.modified <= horizon {
            debug!("Ignoring {} (outside recency window)", archive.file_name);
            continue;
        }

        let newer = match last {
            Some(ref current) => {
                (archive.modified, &archive.file_name) > (current.modified, &current.file_name)
            }
            None => true,
        };
        if newer {
            last = Some(archive);
        }
    }

    Ok(last)
}
