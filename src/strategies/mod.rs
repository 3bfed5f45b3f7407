pub mod zip;

use crate::config::ResolvedTask;
use crate::utils::error::{ArchiveError, LockError, ScanError};
use crate::utils::naming::ArchiveFile;
use crate::utils::retention::PurgeReport;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single task failed
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(
        "Task #{index} ('{name}') has unsupported type '{task_type}' \
         (source {source_path:?}, target {target:?})"
    )]
    UnsupportedTask {
        index: usize,
        name: String,
        task_type: String,
        source_path: PathBuf,
        target: PathBuf,
    },

    #[error("Target {0:?} does not exist or is not a directory")]
    TargetNotDirectory(PathBuf),

    #[error("Target {0:?} is locked by another run")]
    Locked(PathBuf),

    #[error("Failed to lock target: {0}")]
    Lock(LockError),

    #[error("Failed to look up previous archives: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to apply retention: {0}")]
    Purge(#[source] ScanError),

    #[error("Failed to create archive: {0}")]
    Archive(ArchiveError),
}

impl From<LockError> for TaskError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Held(path) => TaskError::Locked(path.parent().map(PathBuf::from).unwrap_or(path)),
            other => TaskError::Lock(other),
        }
    }
}

impl From<ArchiveError> for TaskError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::TargetNotDirectory(path) => TaskError::TargetNotDirectory(path),
            other => TaskError::Archive(other),
        }
    }
}

/// Inputs shared by every task of one run
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub now: DateTime<Local>,
    pub lock_targets: bool,
}

/// What a strategy did for a task that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    Created(PathBuf),
    NotDue {
        last: DateTime<Local>,
        next_due: DateTime<Local>,
    },
    SourceMissing,
}

#[derive(Debug, Clone)]
pub struct StrategyOutput {
    pub action: BackupAction,
    /// Present when a retention pass ran
    pub purge: Option<PurgeReport>,
}

/// Trait for backup strategies
pub trait BackupStrategy {
    /// Run one scheduled pass for a task
    fn run(&self, task: &ResolvedTask, ctx: &RunContext) -> Result<StrategyOutput, TaskError>;

    /// Apply the task's retention policy only
    ///
    /// Returns `None` when the task has no policy.
    fn purge(
        &self,
        task: &ResolvedTask,
        ctx: &RunContext,
        dry_run: bool,
    ) -> Result<Option<PurgeReport>, TaskError>;

    /// Most recent archive of the task inside the recency window
    fn last_backup(&self, task: &ResolvedTask, now: DateTime<Local>) -> Result<Option<ArchiveFile>, TaskError>;

    /// Get strategy name (for logging)
    fn name(&self) -> &'static str;
}

/// Strategy handling `task_type`, if any
pub fn strategy_for(task_type: &str) -> Option<Box<dyn BackupStrategy>> {
    match task_type {
        "zip" => Some(Box::new(zip::ZipStrategy::new())),
        _ => None,
    }
}
