//! Tests for the 'run' command
//!
//! The run command creates an archive for every due task, after applying
//! the task's retention policy.

use chrono::Duration;
use std::fs;
use test_utils::*;

#[test]
fn test_run_single_task_creates_archive() {
    let ctx = TestContext::with_minimal_config();

    let report = ctx.manager().run_task("data").assert_ok();

    assert_eq!(report.tasks.len(), 1);
    let created = report.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].is_file());
    assert!(!report.has_failures());
}

#[test]
fn test_run_all_tasks_in_order() {
    let ctx = TestContext::from_builder(
        ConfigBuilder::new()
            .add_zip_task("first")
            .add_zip_task("second")
            .add_zip_task("third"),
    );

    let report = ctx.manager().run_all();

    let names: Vec<_> = report.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert_eq!(report.created().len(), 3);
}

#[test]
fn test_run_skips_disabled_tasks() {
    let builder = ConfigBuilder::new()
        .add_zip_task("active")
        .add_disabled_task("paused");
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);

    let report = ctx.manager().run_all();

    assert!(matches!(report.tasks[1].outcome, TaskOutcome::Disabled));
    let names = archive_names(&target).unwrap();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("active_"));
}

#[test]
fn test_run_unknown_task_name_is_error() {
    let ctx = TestContext::with_minimal_config();

    ctx.manager()
        .run_task("does-not-exist")
        .assert_err_contains("Task 'does-not-exist' not found");
}

#[test]
fn test_second_run_is_not_due() {
    let ctx = TestContext::with_minimal_config();
    let manager = ctx.manager();

    let first = manager.run_all();
    assert_eq!(first.created().len(), 1);

    let second = manager.run_all();
    assert!(second.created().is_empty());
    match second.tasks[0].outcome {
        TaskOutcome::NotDue { last, next_due } => {
            assert_eq!(next_due - last, Duration::days(1));
        }
        ref other => panic!("Expected NotDue, got {:?}", other),
    }
}

#[test]
fn test_run_after_one_period_creates_second_archive() {
    let builder = ConfigBuilder::minimal();
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let manager = ctx.manager();

    manager.run_all();
    ctx.clock().advance(Duration::days(1) + Duration::minutes(1));
    let report = manager.run_all();

    assert_eq!(report.created().len(), 1);
    assert_eq!(archive_names(&target).unwrap().len(), 2);
}

#[test]
fn test_run_missing_source_is_skipped() {
    let builder = ConfigBuilder::minimal();
    let source = builder.source_path("data");
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    fs::remove_dir_all(&source).unwrap();

    let report = ctx.manager().run_all();

    assert!(matches!(report.tasks[0].outcome, TaskOutcome::SourceMissing));
    assert!(!report.has_failures());
    assert!(archive_names(&target).unwrap().is_empty());
}

#[test]
fn test_run_missing_target_fails_task() {
    let builder = ConfigBuilder::minimal();
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    fs::remove_dir_all(&target).unwrap();

    let report = ctx.manager().run_all();

    assert!(report.has_failures());
    match report.tasks[0].outcome {
        TaskOutcome::Failed(TaskError::TargetNotDirectory(ref path)) => assert_eq!(path, &target),
        ref other => panic!("Expected TargetNotDirectory, got {:?}", other),
    }
    assert!(!target.exists());
}

#[test]
fn test_run_report_serializes_to_json() {
    let ctx = TestContext::from_builder(
        ConfigBuilder::new()
            .add_zip_task("data")
            .add_disabled_task("paused")
            .add_typed_task("remote", "ftp"),
    );

    let report = ctx.manager().run_all();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    let tasks = json["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(tasks[0]["outcome"]["created"].is_string());
    assert_eq!(tasks[1]["outcome"], "disabled");
    assert!(tasks[2]["outcome"]["failed"]
        .as_str()
        .unwrap()
        .contains("unsupported"));
    assert_eq!(json["stopped_early"], false);
}
