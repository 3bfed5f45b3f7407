//! Retention applied as part of a run

use chrono::{DateTime, Duration, Local};
use std::path::Path;
use test_utils::*;

/// One legacy-named archive per day for the `days` days before `now`
fn daily_history(target: &Path, base: &str, now: DateTime<Local>, days: i64) {
    for age in 1..=days {
        let modified = now - Duration::days(age) - Duration::hours(1);
        let name = format!("{}_{}.zip", base, modified.format("%Y%m%d"));
        create_dated_archive(target, &name, modified).unwrap();
    }
}

#[test]
fn test_run_rotates_before_archiving() {
    let builder = ConfigBuilder::new();
    let task = builder.zip_task("data").retention(3, 0, 0, 0);
    let builder = builder.add_task(task);
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let now = ctx.clock().now();
    daily_history(&target, "data", now, 10);

    let report = ctx.manager().run_all();

    let purge = report.tasks[0].purge.as_ref().assert_some();
    assert_eq!(purge.kept.len(), 3);
    assert_eq!(purge.removed.len(), 7);
    assert_eq!(report.created().len(), 1);
    // Three survivors plus the new archive
    assert_eq!(archive_names(&target).unwrap().len(), 4);
}

#[test]
fn test_newest_archive_survives_every_run() {
    let builder = ConfigBuilder::new();
    let task = builder.zip_task("data").retention(0, 0, 0, 1);
    let builder = builder.add_task(task);
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let manager = ctx.manager();

    let first = manager.run_all().created()[0].clone();

    ctx.clock().advance(Duration::days(1) + Duration::minutes(1));
    let report = manager.run_all();

    // The previous newest survived the purge that ran before the new archive
    let purge = report.tasks[0].purge.as_ref().assert_some();
    assert_eq!(purge.kept, vec![first.clone()]);
    assert!(first.exists());
    assert_eq!(archive_names(&target).unwrap().len(), 2);
}

#[test]
fn test_other_base_names_are_left_alone() {
    let builder = ConfigBuilder::new();
    let task = builder.zip_task("data").retention(1, 0, 0, 0);
    let builder = builder.add_task(task);
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let now = ctx.clock().now();
    daily_history(&target, "data", now, 3);
    daily_history(&target, "photos", now, 3);

    ctx.manager().run_all();

    let names = archive_names(&target).unwrap();
    assert_eq!(names.iter().filter(|n| n.starts_with("photos_")).count(), 3);
    assert_eq!(names.iter().filter(|n| n.starts_with("data_")).count(), 2);
}

#[test]
fn test_archive_contents_survive_round_trip() {
    let builder = ConfigBuilder::new();
    let task = builder
        .zip_task("data")
        .compression(CompressionMethod::Bzip2)
        .base_name("bz");
    let builder = builder.add_task(task);
    let ctx = TestContext::from_builder(builder);

    let report = ctx.manager().run_all();
    let archive = report.created()[0].clone();

    let entries = read_zip_entries(&archive).unwrap();
    for (relative, contents) in sample_files() {
        assert_eq!(entries[relative], contents, "{}", relative);
    }
}

#[test]
fn test_gztar_task_rotates_only_its_own_format() {
    let builder = ConfigBuilder::new();
    let task = builder
        .zip_task("data")
        .format(ArchiveFormat::Gztar)
        .retention(2, 0, 0, 0);
    let builder = builder.add_task(task);
    let target = builder.target_path();
    let ctx = TestContext::from_builder(builder);
    let now = ctx.clock().now();
    for age in 1..=4 {
        let modified = now - Duration::days(age) - Duration::hours(1);
        let name = format!("data_{}.tar.gz", modified.format("%Y%m%d"));
        create_dated_archive(&target, &name, modified).unwrap();
    }
    daily_history(&target, "data", now, 2);

    let report = ctx.manager().run_all();

    let purge = report.tasks[0].purge.as_ref().assert_some();
    assert_eq!(purge.kept.len(), 2);
    assert_eq!(purge.removed.len(), 2);

    let archive = report.created()[0].clone();
    assert!(archive.to_string_lossy().ends_with(".tar.gz"));
    let entries = read_tar_gz_entries(&archive).unwrap();
    for (relative, contents) in sample_files() {
        assert_eq!(entries[relative], contents, "{}", relative);
    }

    let names = archive_names(&target).unwrap();
    assert_eq!(names.iter().filter(|n| n.ends_with(".zip")).count(), 2);
    assert_eq!(names.iter().filter(|n| n.ends_with(".tar.gz")).count(), 3);
}
