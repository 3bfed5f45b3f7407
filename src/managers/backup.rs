//! Backup manager - dispatches tasks to their strategies
//!
//! Tasks run one after another in configuration order. A failing task is
//! recorded in the [`RunReport`] and the remaining tasks still run, unless
//! `global.fail_fast` is set.

use crate::config::{self, Config, ResolvedTask};
use crate::strategies::{self, BackupAction, BackupStrategy, RunContext, TaskError};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::naming::ArchiveFile;
use crate::utils::retention::PurgeReport;
use crate::utils::schedule;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of one task in a run or purge pass
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Created(PathBuf),
    NotDue {
        last: DateTime<Local>,
        next_due: DateTime<Local>,
    },
    SourceMissing,
    Disabled,
    /// Purge pass only: retention applied
    Purged,
    /// Purge pass only: the task has no retention policy
    NoPolicy,
    Failed(#[serde(serialize_with = "serialize_error")] TaskError),
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

fn serialize_error<S: Serializer>(err: &TaskError, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&err.to_string())
}

#[derive(Debug, Serialize)]
pub struct TaskReport {
    pub index: usize,
    pub name: String,
    pub task_type: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub outcome: TaskOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge: Option<PurgeReport>,
}

impl TaskReport {
    fn new(task: &ResolvedTask, outcome: TaskOutcome, purge: Option<PurgeReport>) -> Self {
        Self {
            index: task.index,
            name: task.name.clone(),
            task_type: task.task_type.clone(),
            source: task.source.clone(),
            target: task.target.clone(),
            outcome,
            purge,
        }
    }
}

/// Every task visited by one run, in order
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub tasks: Vec<TaskReport>,
    /// Set when `fail_fast` stopped the run before every task was visited
    pub stopped_early: bool,
}

impl RunReport {
    fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            tasks: Vec::new(),
            stopped_early: false,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|t| t.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Paths of the archives created during the run
    pub fn created(&self) -> Vec<&PathBuf> {
        self.tasks
            .iter()
            .filter_map(|t| match t.outcome {
                TaskOutcome::Created(ref path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

/// Schedule state of one task
#[derive(Debug, Serialize)]
pub struct TaskStatus {
    pub index: usize,
    pub name: String,
    pub task_type: String,
    pub enabled: bool,
    pub target: PathBuf,
    pub frequency: String,
    pub last_backup: Option<ArchiveFile>,
    pub due: bool,
    pub next_due: Option<DateTime<Local>>,
    pub error: Option<String>,
    /// Manager clock reading the status was computed against
    pub checked_at: DateTime<Local>,
}

impl TaskStatus {
    /// Time between the last archive and `checked_at`
    pub fn age(&self) -> Option<chrono::Duration> {
        self.last_backup
            .as_ref()
            .map(|last| self.checked_at.signed_duration_since(last.modified))
    }
}

pub struct BackupManager {
    config: Config,
    tasks: Vec<ResolvedTask>,
    clock: Box<dyn Clock>,
}

impl BackupManager {
    /// Create new backup manager reading the system clock
    pub fn new(config: Config, tasks: Vec<ResolvedTask>) -> Self {
        Self::with_clock(config, tasks, Box::new(SystemClock::new()))
    }

    /// Create backup manager with a specific time source
    pub fn with_clock(config: Config, tasks: Vec<ResolvedTask>, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            tasks,
            clock,
        }
    }

    pub fn tasks(&self) -> &[ResolvedTask] {
        &self.tasks
    }

    fn context(&self) -> RunContext {
        RunContext {
            now: self.clock.now(),
            lock_targets: self.config.global.lock_targets,
        }
    }

    fn select(&self, name: &str) -> Result<Vec<&ResolvedTask>> {
        config::find_tasks(&self.tasks, name).context(format!("Cannot select task '{}'", name))
    }

    /// Run every configured task
    pub fn run_all(&self) -> RunReport {
        self.run_tasks(self.tasks.iter())
    }

    /// Run the tasks named `name`
    pub fn run_task(&self, name: &str) -> Result<RunReport> {
        let selected = self.select(name)?;
        Ok(self.run_tasks(selected.into_iter()))
    }

    fn run_tasks<'a>(&self, tasks: impl Iterator<Item = &'a ResolvedTask>) -> RunReport {
        let ctx = self.context();
        let start_time = Instant::now();
        let mut report = RunReport::new(ctx.now);

        for task in tasks {
            let (outcome, purge) = self.run_one(task, &ctx);
            let failed = outcome.is_failure();
            report.tasks.push(TaskReport::new(task, outcome, purge));

            if failed && self.config.global.fail_fast {
                warn!("Stopping run after failure of task '{}' (fail_fast)", task.name);
                report.stopped_early = true;
                break;
            }
        }

        info!(
            "Run completed in {:.2}s: {} task(s), {} archive(s) created, {} failure(s)",
            start_time.elapsed().as_secs_f64(),
            report.tasks.len(),
            report.created().len(),
            report.failures().count()
        );

        report
    }

    fn run_one(&self, task: &ResolvedTask, ctx: &RunContext) -> (TaskOutcome, Option<PurgeReport>) {
        if !task.enabled {
            info!("Task '{}' is disabled, skipping", task.name);
            return (TaskOutcome::Disabled, None);
        }

        let strategy = match self.strategy(task) {
            Ok(strategy) => strategy,
            Err(e) => return (self.failed(task, e), None),
        };

        debug!("Task #{} '{}' handled by the {} strategy", task.index, task.name, strategy.name());
        match strategy.run(task, ctx) {
            Ok(output) => {
                let outcome = match output.action {
                    BackupAction::Created(path) => TaskOutcome::Created(path),
                    BackupAction::NotDue { last, next_due } => TaskOutcome::NotDue { last, next_due },
                    BackupAction::SourceMissing => TaskOutcome::SourceMissing,
                };
                (outcome, output.purge)
            }
            Err(e) => (self.failed(task, e), None),
        }
    }

    fn strategy(&self, task: &ResolvedTask) -> std::result::Result<Box<dyn BackupStrategy>, TaskError> {
        strategies::strategy_for(&task.task_type).ok_or_else(|| TaskError::UnsupportedTask {
            index: task.index,
            name: task.name.clone(),
            task_type: task.task_type.clone(),
            source_path: task.source.clone(),
            target: task.target.clone(),
        })
    }

    fn failed(&self, task: &ResolvedTask, err: TaskError) -> TaskOutcome {
        error!(
            "Task #{} '{}' ({:?} -> {:?}) failed: {}",
            task.index, task.name, task.source, task.target, err
        );
        TaskOutcome::Failed(err)
    }

    /// Apply retention for every task without creating archives
    pub fn purge_all(&self, dry_run: bool) -> RunReport {
        self.purge_tasks(self.tasks.iter(), dry_run)
    }

    /// Apply retention for the tasks named `name`
    pub fn purge_task(&self, name: &str, dry_run: bool) -> Result<RunReport> {
        let selected = self.select(name)?;
        Ok(self.purge_tasks(selected.into_iter(), dry_run))
    }

    fn purge_tasks<'a>(&self, tasks: impl Iterator<Item = &'a ResolvedTask>, dry_run: bool) -> RunReport {
        let ctx = self.context();
        let mut report = RunReport::new(ctx.now);

        for task in tasks {
            let (outcome, purge) = if !task.enabled {
                (TaskOutcome::Disabled, None)
            } else {
                match self.strategy(task).and_then(|s| s.purge(task, &ctx, dry_run)) {
                    Ok(Some(purge)) => (TaskOutcome::Purged, Some(purge)),
                    Ok(None) => (TaskOutcome::NoPolicy, None),
                    Err(e) => (self.failed(task, e), None),
                }
            };

            let failed = outcome.is_failure();
            report.tasks.push(TaskReport::new(task, outcome, purge));
            if failed && self.config.global.fail_fast {
                report.stopped_early = true;
                break;
            }
        }

        report
    }

    /// Schedule state of every task
    pub fn status(&self) -> Vec<TaskStatus> {
        let now = self.clock.now();
        self.tasks.iter().map(|task| self.status_of(task, now)).collect()
    }

    /// Schedule state of the tasks named `name`
    pub fn status_task(&self, name: &str) -> Result<Vec<TaskStatus>> {
        let now = self.clock.now();
        Ok(self
            .select(name)?
            .into_iter()
            .map(|task| self.status_of(task, now))
            .collect())
    }

    fn status_of(&self, task: &ResolvedTask, now: DateTime<Local>) -> TaskStatus {
        let mut status = TaskStatus {
            index: task.index,
            name: task.name.clone(),
            task_type: task.task_type.clone(),
            enabled: task.enabled,
            target: task.target.clone(),
            frequency: task.frequency.to_string(),
            last_backup: None,
            due: false,
            next_due: None,
            error: None,
            checked_at: now,
        };

        match self.strategy(task).and_then(|s| s.last_backup(task, now)) {
            Ok(last) => {
                let last_modified = last.as_ref().map(|archive| archive.modified);
                status.due = task.enabled && schedule::is_due(last_modified, &task.frequency, now);
                status.next_due = schedule::next_due(last_modified, &task.frequency);
                status.last_backup = last;
            }
            Err(e) => status.error = Some(e.to_string()),
        }

        status
    }
}
