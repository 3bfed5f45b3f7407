use crate::utils::schedule::Frequency;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    /// Backup tasks, run in declaration order
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,

    /// Take an advisory lock on each target directory while a task runs
    #[serde(default = "default_lock_targets")]
    pub lock_targets: bool,

    /// Stop the run at the first failed task instead of continuing
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
            lock_targets: default_lock_targets(),
            fail_fast: false,
        }
    }
}

/// Task configuration (raw, before defaults are applied)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskConfig {
    /// Name used to select the task on the command line (defaults to the base name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Task type. Kept as a plain string so unknown types reach the dispatcher.
    #[serde(rename = "type")]
    pub task_type: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// File or directory to archive
    pub source: PathBuf,

    /// Directory receiving the archives
    pub target: PathBuf,

    #[serde(default, alias = "file_format")]
    pub archive_format: ArchiveFormat,

    #[serde(default)]
    pub compression: CompressionMethod,

    #[serde(alias = "freq")]
    pub frequency: u32,

    #[serde(default, alias = "freq_unit")]
    pub frequency_unit: FrequencyUnit,

    /// Archive name prefix (defaults to the last segment of `source`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,

    #[serde(default, alias = "arch_depth", skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionPolicy>,
}

/// Resolved task configuration (after defaults are applied)
#[derive(Debug, Clone)]
pub struct ResolvedTask {
    /// Position in the configured task list
    pub index: usize,
    pub name: String,
    pub task_type: String,
    pub enabled: bool,
    pub source: PathBuf,
    pub target: PathBuf,
    pub archive_format: ArchiveFormat,
    pub compression: CompressionMethod,
    pub frequency: Frequency,
    pub base_name: String,
    pub retention: Option<RetentionPolicy>,
}

/// Container written for each archive
///
/// `compression` only applies to zip; the tar variants imply their codec.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Zip,
    Tar,
    #[serde(alias = "tar.gz", alias = "tgz")]
    Gztar,
    #[serde(alias = "tar.bz2", alias = "tbz2")]
    Bztar,
}

impl ArchiveFormat {
    /// File extension written by this format, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::Gztar => "tar.gz",
            ArchiveFormat::Bztar => "tar.bz2",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::Gztar => "gztar",
            ArchiveFormat::Bztar => "bztar",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    #[default]
    Deflated,
    Bzip2,
    Stored,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Minute,
    Hour,
    #[default]
    Day,
    Week,
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            FrequencyUnit::Minute => "minute",
            FrequencyUnit::Hour => "hour",
            FrequencyUnit::Day => "day",
            FrequencyUnit::Week => "week",
        };
        f.write_str(unit)
    }
}

/// Number of periods to keep per time bucket
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RetentionPolicy {
    #[serde(default, rename = "day", alias = "daily")]
    pub daily: u32,
    #[serde(default, rename = "week", alias = "weekly")]
    pub weekly: u32,
    #[serde(default, rename = "month", alias = "monthly")]
    pub monthly: u32,
    #[serde(default, rename = "year", alias = "yearly")]
    pub yearly: u32,
}

impl RetentionPolicy {
    /// A policy that keeps nothing in any bucket never deletes anything
    pub fn is_empty(&self) -> bool {
        self.daily == 0 && self.weekly == 0 && self.monthly == 0 && self.yearly == 0
    }
}

// Default value functions

fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_lock_targets() -> bool { true }
fn default_enabled() -> bool { true }
