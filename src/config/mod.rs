//! Configuration module for backup-scheduler
//!
//! This module handles loading, validating, and resolving configuration from TOML files.
//!
//! ## Task Resolution
//!
//! Each `[[tasks]]` entry is resolved in declaration order:
//! 1. `~` in `source` and `target` is expanded
//! 2. `base_name` defaults to the last segment of `source`
//! 3. `name` defaults to the base name
//!
//! ## Example Usage
//!
//! ```no_run
//! use backup_scheduler::config;
//!
//! let config = config::load_config("backup-config.toml")?;
//! let tasks = config::resolve_tasks(&config);
//!
//! for task in &tasks {
//!     println!("Task: {}, every {}", task.name, task.frequency);
//! }
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    find_tasks, load_config, resolve_task, resolve_tasks, validate_config, ConfigError, Result,
};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
