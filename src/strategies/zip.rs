//! Archive backup strategy for `zip` tasks
//!
//! The container (zip or tar, optionally compressed) comes from the task's
//! `archive_format`.
//!
//! Handles:
//! - Target locking
//! - Retention before archiving
//! - Due-date check against the most recent archive
//! - Archive creation

use super::{BackupAction, BackupStrategy, RunContext, StrategyOutput, TaskError};
use crate::config::ResolvedTask;
use crate::utils::archiver::{self, ArchiveRequest};
use crate::utils::locator;
use crate::utils::locker::TargetLock;
use crate::utils::naming::ArchiveFile;
use crate::utils::retention::{self, PurgeReport};
use crate::utils::schedule;
use chrono::{DateTime, Local};
use tracing::{info, warn};

pub struct ZipStrategy;

impl ZipStrategy {
    pub fn new() -> Self {
        Self
    }

    fn ensure_target(task: &ResolvedTask) -> Result<(), TaskError> {
        if task.target.is_dir() {
            Ok(())
        } else {
            Err(TaskError::TargetNotDirectory(task.target.clone()))
        }
    }

    fn apply_retention(task: &ResolvedTask, dry_run: bool) -> Result<Option<PurgeReport>, TaskError> {
        let policy = match task.retention {
            Some(ref policy) if !policy.is_empty() => policy,
            _ => return Ok(None),
        };

        let report = retention::purge(
            &task.target,
            &task.base_name,
            &[task.archive_format.extension()],
            policy,
            dry_run,
        )
        .map_err(TaskError::Purge)?;

        for failure in &report.failures {
            warn!(
                "Task '{}': could not remove {:?}: {}",
                task.name, failure.path, failure.error
            );
        }

        Ok(Some(report))
    }
}

impl Default for ZipStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupStrategy for ZipStrategy {
    fn run(&self, task: &ResolvedTask, ctx: &RunContext) -> Result<StrategyOutput, TaskError> {
        info!(
            "Starting zip task '{}': {:?} -> {:?} every {}",
            task.name, task.source, task.target, task.frequency
        );

        Self::ensure_target(task)?;

        let mut lock = if ctx.lock_targets {
            Some(TargetLock::open(&task.target)?)
        } else {
            None
        };
        let _guard = match lock.as_mut() {
            Some(lock) => Some(lock.try_acquire()?),
            None => None,
        };

        let purge = Self::apply_retention(task, false)?;

        let last = self.last_backup(task, ctx.now)?;
        let last_modified = last.as_ref().map(|archive| archive.modified);

        if !schedule::is_due(last_modified, &task.frequency, ctx.now) {
            if let (Some(last), Some(next_due)) =
                (last, schedule::next_due(last_modified, &task.frequency))
            {
                info!(
                    "Task '{}' not due: last archive {} at {}, next due {}",
                    task.name,
                    last.file_name,
                    last.modified.format("%Y-%m-%d %H:%M"),
                    next_due.format("%Y-%m-%d %H:%M")
                );
                return Ok(StrategyOutput {
                    action: BackupAction::NotDue {
                        last: last.modified,
                        next_due,
                    },
                    purge,
                });
            }
        }

        let request = ArchiveRequest {
            source: &task.source,
            target_dir: &task.target,
            base_name: &task.base_name,
            format: task.archive_format,
            compression: task.compression,
        };

        let action = match archiver::create_archive(&request, ctx.now)? {
            Some(path) => BackupAction::Created(path),
            None => {
                warn!("Task '{}': source {:?} does not exist", task.name, task.source);
                BackupAction::SourceMissing
            }
        };

        Ok(StrategyOutput { action, purge })
    }

    fn purge(
        &self,
        task: &ResolvedTask,
        ctx: &RunContext,
        dry_run: bool,
    ) -> Result<Option<PurgeReport>, TaskError> {
        Self::ensure_target(task)?;

        let mut lock = if ctx.lock_targets && !dry_run {
            Some(TargetLock::open(&task.target)?)
        } else {
            None
        };
        let _guard = match lock.as_mut() {
            Some(lock) => Some(lock.try_acquire()?),
            None => None,
        };

        Self::apply_retention(task, dry_run)
    }

    fn last_backup(&self, task: &ResolvedTask, now: DateTime<Local>) -> Result<Option<ArchiveFile>, TaskError> {
        Self::ensure_target(task)?;
        let last = locator::find_last_backup(
            &task.target,
            &task.base_name,
            &[task.archive_format.extension()],
            now,
        )?;
        Ok(last)
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}
