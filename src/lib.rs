//! Backup Scheduler Library
//!
//! Runs scheduled zip backup tasks: archives a source into a target
//! directory when the task is due and rotates old archives by a
//! day/week/month/year retention policy.

pub mod config;
pub mod managers;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, resolve_tasks, Config, ResolvedTask};
pub use managers::backup::{BackupManager, RunReport, TaskOutcome, TaskReport, TaskStatus};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use strategies::TaskError;
