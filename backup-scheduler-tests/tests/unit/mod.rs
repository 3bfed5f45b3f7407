//! Unit tests for backup-scheduler
//!
//! Exercise the library modules through their public API.

mod config;
mod retention;
