//! Tests for the 'list' command
//!
//! The list command shows every configured task with its resolved settings.

use test_utils::*;

#[test]
fn test_list_shows_all_tasks() {
    let ctx = TestContext::from_builder(
        ConfigBuilder::new()
            .add_zip_task("alpha")
            .add_disabled_task("beta")
            .add_typed_task("gamma", "ftp"),
    );

    let manager = ctx.manager();
    let tasks = manager.tasks();

    assert_eq!(tasks.len(), 3);
    assert!(tasks[0].enabled);
    assert!(!tasks[1].enabled);
    assert_eq!(tasks[2].task_type, "ftp");
}

#[test]
fn test_list_resolves_defaults() {
    let builder = ConfigBuilder::new();
    let task = builder.zip_task("data").base_name("nightly");
    let ctx = TestContext::from_builder(builder.add_task(task));

    let manager = ctx.manager();
    let task = &manager.tasks()[0];

    assert_eq!(task.name, "data");
    assert_eq!(task.base_name, "nightly");
    assert_eq!(task.compression, CompressionMethod::Deflated);
    assert_eq!(task.frequency.to_string(), "1 day");
}

#[test]
fn test_list_name_defaults_to_base_name() {
    let builder = ConfigBuilder::new();
    let mut task = builder.zip_task("unused").build();
    task.name = None;
    task.base_name = Some("reports".to_string());

    let mut config = builder.build();
    config.tasks.push(task);

    let resolved = backup_scheduler::config::resolve_tasks(&config);
    assert_eq!(resolved[0].name, "reports");
}
