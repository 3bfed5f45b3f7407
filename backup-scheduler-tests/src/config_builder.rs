//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible
//! defaults. Every source and target lives inside the builder's temp dir.

use backup_scheduler::config::{
    ArchiveFormat, CompressionMethod, Config, FrequencyUnit, GlobalConfig, RetentionPolicy,
    TaskConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a single task entry
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    task: TaskConfig,
}

impl TaskBuilder {
    /// A daily zip task
    pub fn zip(name: &str, source: &Path, target: &Path) -> Self {
        Self {
            task: TaskConfig {
                name: Some(name.to_string()),
                task_type: "zip".to_string(),
                enabled: true,
                source: source.to_path_buf(),
                target: target.to_path_buf(),
                archive_format: ArchiveFormat::Zip,
                compression: CompressionMethod::Deflated,
                frequency: 1,
                frequency_unit: FrequencyUnit::Day,
                base_name: None,
                retention: None,
            },
        }
    }

    pub fn task_type(mut self, task_type: &str) -> Self {
        self.task.task_type = task_type.to_string();
        self
    }

    pub fn frequency(mut self, value: u32, unit: FrequencyUnit) -> Self {
        self.task.frequency = value;
        self.task.frequency_unit = unit;
        self
    }

    pub fn base_name(mut self, base_name: &str) -> Self {
        self.task.base_name = Some(base_name.to_string());
        self
    }

    pub fn retention(mut self, daily: u32, weekly: u32, monthly: u32, yearly: u32) -> Self {
        self.task.retention = Some(RetentionPolicy {
            daily,
            weekly,
            monthly,
            yearly,
        });
        self
    }

    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.task.archive_format = format;
        self
    }

    pub fn compression(mut self, compression: CompressionMethod) -> Self {
        self.task.compression = compression;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.task.enabled = false;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    tasks: Vec<TaskConfig>,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with no tasks
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let log_directory = temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log_directory");

        let global = GlobalConfig {
            log_directory,
            log_level: "debug".to_string(),
            log_max_files: 5,
            ..Default::default()
        };

        Self {
            temp_dir,
            global,
            tasks: Vec::new(),
        }
    }

    /// Create a config with one daily zip task named `data`
    pub fn minimal() -> Self {
        Self::new().add_zip_task("data")
    }

    /// Shared target directory for tasks added by name
    pub fn target_path(&self) -> PathBuf {
        self.temp_dir.path().join("backups")
    }

    /// Source directory of a task added by name
    pub fn source_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("sources").join(name)
    }

    /// Add a daily zip task whose source holds three small files
    pub fn add_zip_task(self, name: &str) -> Self {
        let task = self.zip_task(name);
        self.add_task(task)
    }

    /// Builder for a zip task with a populated source and the shared target
    pub fn zip_task(&self, name: &str) -> TaskBuilder {
        let source = self.source_path(name);
        crate::fixtures::create_source_tree(&source, &crate::fixtures::sample_files())
            .expect("Failed to create source tree");

        let target = self.target_path();
        fs::create_dir_all(&target).expect("Failed to create target dir");

        TaskBuilder::zip(name, &source, &target)
    }

    /// Add a task of an arbitrary type
    pub fn add_typed_task(self, name: &str, task_type: &str) -> Self {
        let task = self.zip_task(name).task_type(task_type);
        self.add_task(task)
    }

    /// Add a disabled zip task
    pub fn add_disabled_task(self, name: &str) -> Self {
        let task = self.zip_task(name).disabled();
        self.add_task(task)
    }

    /// Add a task built elsewhere
    pub fn add_task(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task.build());
        self
    }

    /// Set the log directory
    pub fn with_log_dir(mut self, path: &Path) -> Self {
        self.global.log_directory = path.to_path_buf();
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.global.fail_fast = fail_fast;
        self
    }

    pub fn with_lock_targets(mut self, lock_targets: bool) -> Self {
        self.global.lock_targets = lock_targets;
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Build the Config
    pub fn build(self) -> Config {
        Config {
            global: self.global,
            tasks: self.tasks,
        }
    }

    /// Keep the temp directory (don't delete on drop)
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            global: self.global,
            tasks: self.tasks,
        };
        (config, self.temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
