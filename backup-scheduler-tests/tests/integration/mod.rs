//! Integration tests for backup-scheduler
//!
//! End-to-end runs against real temp directories: archives are written,
//! located, rotated and read back.

mod retention;
