//! Retention purger
//!
//! Grandfather-father-son rotation over the archives of one base name. Each
//! bucket keeps the newest archive of each of its N most recent periods; an
//! archive survives when at least one bucket keeps it.

use crate::config::RetentionPolicy;
use crate::utils::error::ScanError;
use crate::utils::locator;
use crate::utils::naming::ArchiveFile;
use chrono::{DateTime, Datelike, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Calendar period a retention count applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Day,
    Week,
    Month,
    Year,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Day, Bucket::Week, Bucket::Month, Bucket::Year];

    /// Identifier of the period containing `at`, in local time
    fn period(self, at: DateTime<Local>) -> (i32, u32) {
        match self {
            Bucket::Day => (at.year(), at.ordinal()),
            Bucket::Week => {
                let week = at.iso_week();
                (week.year(), week.week())
            }
            Bucket::Month => (at.year(), at.month()),
            Bucket::Year => (at.year(), 0),
        }
    }

    fn count(self, policy: &RetentionPolicy) -> u32 {
        match self {
            Bucket::Day => policy.daily,
            Bucket::Week => policy.weekly,
            Bucket::Month => policy.monthly,
            Bucket::Year => policy.yearly,
        }
    }
}

/// Outcome of applying a policy to a set of archives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Newest first
    pub keep: Vec<ArchiveFile>,
    /// Newest first
    pub remove: Vec<ArchiveFile>,
}

/// Split `archives` into the ones `policy` keeps and the ones it removes
pub fn plan_retention(mut archives: Vec<ArchiveFile>, policy: &RetentionPolicy) -> RetentionPlan {
    archives.sort_by(|a, b| {
        (b.modified, &b.file_name).cmp(&(a.modified, &a.file_name))
    });

    if policy.is_empty() {
        return RetentionPlan {
            keep: archives,
            remove: Vec::new(),
        };
    }

    let mut kept = vec![false; archives.len()];
    for bucket in Bucket::ALL {
        let count = bucket.count(policy) as usize;
        if count == 0 {
            continue;
        }

        let mut periods = HashSet::new();
        for (index, archive) in archives.iter().enumerate() {
            if periods.len() >= count {
                break;
            }
            if periods.insert(bucket.period(archive.modified)) {
                kept[index] = true;
            }
        }
    }

    let mut plan = RetentionPlan::default();
    for (archive, keep) in archives.into_iter().zip(kept) {
        if keep {
            plan.keep.push(archive);
        } else {
            plan.remove.push(archive);
        }
    }
    plan
}

/// A deletion that failed during a purge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeFailure {
    pub path: PathBuf,
    pub error: String,
}

/// What a purge pass kept, removed and failed to remove
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub dry_run: bool,
    pub kept: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Apply `policy` to the archives of `base_name` in `target_dir`
///
/// With `dry_run` the report lists what would be removed and nothing is
/// deleted. Deletion failures are collected and the pass continues.
pub fn purge(
    target_dir: &Path,
    base_name: &str,
    extensions: &[&str],
    policy: &RetentionPolicy,
    dry_run: bool,
) -> Result<PurgeReport, ScanError> {
    let archives = locator::list_archives(target_dir, base_name, extensions)?;
    debug!(
        "Applying retention to {} archive(s) of '{}' in {:?}",
        archives.len(),
        base_name,
        target_dir
    );

    let plan = plan_retention(archives, policy);
    let mut report = PurgeReport {
        dry_run,
        kept: plan.keep.into_iter().map(|a| a.path).collect(),
        ..Default::default()
    };

    for archive in plan.remove {
        if dry_run {
            info!("Would remove {:?}", archive.path);
            report.removed.push(archive.path);
            continue;
        }

        match fs::remove_file(&archive.path) {
            Ok(()) => {
                info!("Removed {:?}", archive.path);
                report.removed.push(archive.path);
            }
            Err(e) => {
                warn!("Failed to remove {:?}: {}", archive.path, e);
                report.failures.push(PurgeFailure {
                    path: archive.path,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
