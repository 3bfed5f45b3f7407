//! Test utilities for backup-scheduler
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the backup-scheduler application.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::from_builder(ConfigBuilder::minimal());
//!     let report = ctx.manager().run_all();
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::{ConfigBuilder, TaskBuilder};
pub use fixtures::*;
pub use test_context::{OptionAssertions, ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use backup_scheduler::config::{
    ArchiveFormat, CompressionMethod, Config, FrequencyUnit, GlobalConfig, ResolvedTask,
    RetentionPolicy, TaskConfig,
};
pub use backup_scheduler::managers::backup::{BackupManager, RunReport, TaskOutcome};
pub use backup_scheduler::strategies::TaskError;

// Re-export the controllable clock from the main crate
pub use backup_scheduler::utils::clock::mock::FixedClock;
pub use backup_scheduler::utils::clock::Clock;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
