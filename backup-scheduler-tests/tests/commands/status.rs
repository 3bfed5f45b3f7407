//! Tests for the 'status' command
//!
//! The status command shows the last archive and due state of each task.

use chrono::Duration;
use std::fs;
use test_utils::*;

#[test]
fn test_status_without_archives_is_due() {
    let ctx = TestContext::with_minimal_config();

    let statuses = ctx.manager().status();

    assert_eq!(statuses.len(), 1);
    let status = &statuses[0];
    assert_eq!(status.name, "data");
    assert_eq!(status.frequency, "1 day");
    assert!(status.last_backup.is_none());
    assert!(status.next_due.is_none());
    assert!(status.due);
    assert!(status.error.is_none());
}

#[test]
fn test_status_reports_last_archive() {
    let builder = ConfigBuilder::minimal();
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let now = ctx.clock().now();

    create_dated_archive(&target, "data_20200101.zip", now - Duration::hours(30)).unwrap();
    let recent = create_dated_archive(&target, "data_20200102.zip", now - Duration::hours(6)).unwrap();

    let status = ctx.manager().status_task("data").assert_ok().remove(0);

    let last = status.last_backup.assert_some();
    assert_eq!(last.path, recent);
    assert_eq!(status.next_due.assert_some(), last.modified + Duration::days(1));
    assert!(!status.due);
}

#[test]
fn test_status_age_uses_manager_clock() {
    let builder = ConfigBuilder::minimal();
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let now = ctx.clock().now();
    create_dated_archive(&target, "data_20200101.zip", now - Duration::hours(6)).unwrap();

    ctx.clock().advance(Duration::days(2));
    let status = ctx.manager().status().remove(0);

    assert_eq!(status.checked_at, ctx.clock().now());
    assert_eq!(status.age().assert_some().num_hours(), 54);
    assert!(status.due);
}

#[test]
fn test_status_ignores_archives_outside_recency_window() {
    let builder = ConfigBuilder::minimal();
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let now = ctx.clock().now();

    create_dated_archive(&target, "data_20000101.zip", now - Duration::days(501)).unwrap();

    let status = ctx.manager().status().remove(0);
    assert!(status.last_backup.is_none());
    assert!(status.due);
}

#[test]
fn test_status_disabled_task_is_never_due() {
    let ctx = TestContext::from_builder(ConfigBuilder::new().add_disabled_task("paused"));

    let status = ctx.manager().status().remove(0);

    assert!(!status.enabled);
    assert!(!status.due);
}

#[test]
fn test_status_reports_errors_per_task() {
    let builder = ConfigBuilder::new()
        .add_typed_task("remote", "ftp")
        .add_zip_task("data");
    let ctx = TestContext::from_builder(builder);

    let statuses = ctx.manager().status();

    assert!(statuses[0].error.as_deref().assert_some().contains("unsupported type 'ftp'"));
    assert!(statuses[1].error.is_none());
}

#[test]
fn test_status_unreadable_target() {
    let builder = ConfigBuilder::minimal();
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    fs::remove_dir_all(&target).unwrap();

    let status = ctx.manager().status().remove(0);
    assert!(status.error.is_some());
}
