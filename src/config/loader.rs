use super::types::*;
use crate::utils::naming;
use crate::utils::schedule::Frequency;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Task '{0}' not found")]
    TaskNotFound(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
///
/// Target directories are not checked here: a missing target fails only
/// its own task at run time.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.tasks.is_empty() {
        return Err(ConfigError::ValidationError("No tasks defined".to_string()));
    }

    let mut names = HashSet::new();
    for (index, task) in config.tasks.iter().enumerate() {
        validate_task(index, task)?;

        if let Some(ref name) = task.name {
            if !names.insert(name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Task #{}: duplicate task name '{}'",
                    index, name
                )));
            }
        }
    }

    Ok(())
}

fn validate_task(index: usize, task: &TaskConfig) -> Result<()> {
    if task.task_type.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "Task #{}: missing task type",
            index
        )));
    }

    if task.frequency == 0 {
        return Err(ConfigError::ValidationError(format!(
            "Task #{}: frequency must be a positive number",
            index
        )));
    }

    if let Some(ref base_name) = task.base_name {
        if base_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Task #{}: base_name must not be empty",
                index
            )));
        }
        if base_name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "Task #{}: base_name must not contain path separators: {}",
                index, base_name
            )));
        }
    }

    if let Some(ref name) = task.name {
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Task #{}: name must not be empty",
                index
            )));
        }
    }

    Ok(())
}

/// Resolve a task configuration by applying defaults
pub fn resolve_task(index: usize, task: &TaskConfig) -> ResolvedTask {
    let source = super::expand_tilde(&task.source);
    let target = super::expand_tilde(&task.target);

    // base name: explicit > derived from source
    let base_name = task
        .base_name
        .clone()
        .unwrap_or_else(|| naming::default_base_name(&source));

    // name: explicit > base name
    let name = task.name.clone().unwrap_or_else(|| base_name.clone());

    ResolvedTask {
        index,
        name,
        task_type: task.task_type.trim().to_lowercase(),
        enabled: task.enabled,
        source,
        target,
        archive_format: task.archive_format,
        compression: task.compression,
        frequency: Frequency::new(task.frequency, task.frequency_unit),
        base_name,
        retention: task.retention,
    }
}

/// Resolve all tasks in the configuration, preserving their order
pub fn resolve_tasks(config: &Config) -> Vec<ResolvedTask> {
    config
        .tasks
        .iter()
        .enumerate()
        .map(|(index, task)| resolve_task(index, task))
        .collect()
}

/// Select the tasks with the given name
pub fn find_tasks<'a>(tasks: &'a [ResolvedTask], name: &str) -> Result<Vec<&'a ResolvedTask>> {
    let selected: Vec<_> = tasks.iter().filter(|t| t.name == name).collect();
    if selected.is_empty() {
        return Err(ConfigError::TaskNotFound(name.to_string()));
    }
    Ok(selected)
}
