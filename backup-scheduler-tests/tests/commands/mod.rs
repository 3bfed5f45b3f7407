//! Command tests for backup-scheduler
//!
//! These tests drive the manager behind each CLI command against temp
//! directories, with a pinned clock.

mod list;
mod run;
mod status;
