//! Unit tests for the retention purger against pre-dated archive files

use backup_scheduler::utils::retention::purge;
use std::path::Path;
use test_utils::*;

/// One archive per day at noon, 1 to 25 February 2024 (the 25th is a Sunday)
fn february_archives(dir: &Path) {
    for day in 1..=25 {
        let name = format!("data_202402{:02}.zip", day);
        create_dated_archive(dir, &name, local_time(2024, 2, day, 12, 0)).unwrap();
    }
}

fn policy(daily: u32, weekly: u32, monthly: u32, yearly: u32) -> RetentionPolicy {
    RetentionPolicy {
        daily,
        weekly,
        monthly,
        yearly,
    }
}

#[test]
fn test_daily_and_weekly_buckets() {
    let ctx = TestContext::new();
    let target = ctx.create_subdir("backups");
    february_archives(&target);

    let report = purge(&target, "data", &["zip"], &policy(3, 2, 0, 0), false).assert_ok();

    assert!(!report.dry_run);
    assert_eq!(report.kept.len(), 4);
    assert_eq!(report.removed.len(), 21);
    // Week of the 12th to the 18th keeps its newest archive
    assert_eq!(
        archive_names(&target).unwrap(),
        vec![
            "data_20240218.zip",
            "data_20240223.zip",
            "data_20240224.zip",
            "data_20240225.zip",
        ]
    );
}

#[test]
fn test_dry_run_deletes_nothing() {
    let ctx = TestContext::new();
    let target = ctx.create_subdir("backups");
    february_archives(&target);

    let report = purge(&target, "data", &["zip"], &policy(1, 0, 0, 0), true).assert_ok();

    assert!(report.dry_run);
    assert_eq!(report.removed.len(), 24);
    assert_eq!(archive_names(&target).unwrap().len(), 25);
}

#[test]
fn test_empty_policy_keeps_everything() {
    let ctx = TestContext::new();
    let target = ctx.create_subdir("backups");
    february_archives(&target);

    let report = purge(&target, "data", &["zip"], &policy(0, 0, 0, 0), false).assert_ok();

    assert!(report.removed.is_empty());
    assert_eq!(report.kept.len(), 25);
}

#[test]
fn test_newest_archive_always_survives() {
    let ctx = TestContext::new();
    let target = ctx.create_subdir("backups");
    february_archives(&target);

    for p in [policy(0, 0, 0, 1), policy(0, 0, 1, 0), policy(0, 1, 0, 0), policy(1, 0, 0, 0)] {
        purge(&target, "data", &["zip"], &p, false).assert_ok();
        assert!(target.join("data_20240225.zip").exists(), "{:?}", p);
    }
    assert_eq!(archive_names(&target).unwrap(), vec!["data_20240225.zip"]);
}

#[test]
fn test_unrelated_files_are_untouched() {
    let ctx = TestContext::new();
    let target = ctx.create_subdir("backups");
    february_archives(&target);
    ctx.create_file("backups/notes.txt", "keep me");
    ctx.create_file("backups/other_20240101.zip", "different base name");
    ctx.create_file("backups/~data_2024-02-25-12-00.partial", "in progress");

    purge(&target, "data", &["zip"], &policy(1, 0, 0, 0), false).assert_ok();

    assert_eq!(
        archive_names(&target).unwrap(),
        vec![
            "data_20240225.zip",
            "notes.txt",
            "other_20240101.zip",
            "~data_2024-02-25-12-00.partial",
        ]
    );
}

#[test]
fn test_both_name_forms_are_rotated_together() {
    let ctx = TestContext::new();
    let target = ctx.create_subdir("backups");
    create_dated_archive(&target, "data_20240223.zip", local_time(2024, 2, 23, 12, 0)).unwrap();
    create_dated_archive(&target, "data_2024-02-24-08-30.zip", local_time(2024, 2, 24, 8, 30)).unwrap();
    create_dated_archive(&target, "data_2024-02-25-08-30.zip", local_time(2024, 2, 25, 8, 30)).unwrap();

    let report = purge(&target, "data", &["zip"], &policy(2, 0, 0, 0), false).assert_ok();

    assert_eq!(report.removed, vec![target.join("data_20240223.zip")]);
}
