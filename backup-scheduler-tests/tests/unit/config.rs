//! Unit tests for configuration loading and task resolution

use backup_scheduler::config::{self, ConfigError};
use test_utils::*;

fn write_rendered(ctx: &TestContext, template: &str) -> std::path::PathBuf {
    let source = ctx.create_subdir("source data");
    let target = ctx.create_subdir("backups");
    let logs = ctx.create_subdir("logs");
    let contents = render_config(template, &logs, &source, &target);
    ctx.create_file("config.toml", &contents)
}

#[test]
fn test_load_minimal_template() {
    let ctx = TestContext::new();
    let path = write_rendered(&ctx, minimal_config_toml());

    let config = config::load_config(&path).assert_ok();
    let tasks = config::resolve_tasks(&config);

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "data");
    // No base_name given: derived from the source directory
    assert_eq!(tasks[0].base_name, "source_data");
    assert_eq!(tasks[0].frequency.to_string(), "1 day");
    assert!(tasks[0].retention.is_none());
}

#[test]
fn test_load_legacy_keys() {
    let ctx = TestContext::new();
    let path = write_rendered(&ctx, legacy_keys_config_toml());

    let config = config::load_config(&path).assert_ok();
    let task = &config::resolve_tasks(&config)[0];

    assert_eq!(task.name, "legacy");
    assert_eq!(task.frequency.value, 2);
    assert_eq!(task.frequency.unit, FrequencyUnit::Hour);
    assert_eq!(task.archive_format, ArchiveFormat::Zip);

    let retention = task.retention.assert_some();
    assert_eq!(retention.daily, 3);
    assert_eq!(retention.weekly, 2);
    assert_eq!(retention.monthly, 0);
}

#[test]
fn test_load_tar_file_formats() {
    let ctx = TestContext::new();

    for (raw, expected) in [
        ("tar", ArchiveFormat::Tar),
        ("gztar", ArchiveFormat::Gztar),
        ("bztar", ArchiveFormat::Bztar),
    ] {
        let template = legacy_keys_config_toml().replace(
            "file_format = \"zip\"",
            &format!("file_format = \"{}\"", raw),
        );
        let path = write_rendered(&ctx, &template);

        let config = config::load_config(&path).assert_ok();
        assert_eq!(config::resolve_tasks(&config)[0].archive_format, expected, "{}", raw);
    }
}

#[test]
fn test_builder_config_round_trips_through_toml() {
    let builder = ConfigBuilder::new();
    let task = builder
        .zip_task("photos")
        .frequency(6, FrequencyUnit::Hour)
        .retention(7, 4, 12, 2)
        .compression(CompressionMethod::Bzip2);
    let ctx = TestContext::from_builder(builder.add_task(task).with_fail_fast(true));

    let path = ctx.write_config().assert_ok();
    let loaded = config::load_config(&path).assert_ok();

    assert!(loaded.global.fail_fast);
    let original = &ctx.config().assert_some().tasks[0];
    let reloaded = &loaded.tasks[0];
    assert_eq!(reloaded.frequency, original.frequency);
    assert_eq!(reloaded.retention, original.retention);
    assert_eq!(reloaded.compression, CompressionMethod::Bzip2);
}

#[test]
fn test_task_order_is_preserved() {
    let config = ConfigBuilder::new()
        .add_zip_task("first")
        .add_zip_task("second")
        .add_zip_task("third")
        .build();

    let names: Vec<_> = config::resolve_tasks(&config)
        .into_iter()
        .map(|t| (t.index, t.name))
        .collect();

    assert_eq!(
        names,
        vec![
            (0, "first".to_string()),
            (1, "second".to_string()),
            (2, "third".to_string()),
        ]
    );
}

#[test]
fn test_missing_file_is_read_error() {
    let ctx = TestContext::new();
    let result = config::load_config(ctx.temp_dir().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", "[[tasks]\ntype = ");
    let result = config::load_config(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_missing_frequency_is_parse_error() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "config.toml",
        "[[tasks]]\ntype = \"zip\"\nsource = \"/srv\"\ntarget = \"/backups\"\n",
    );
    config::load_config(&path).assert_err_contains("frequency");
}

#[test]
fn test_zero_frequency_is_rejected() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "config.toml",
        "[[tasks]]\ntype = \"zip\"\nsource = \"/srv\"\ntarget = \"/backups\"\nfrequency = 0\n",
    );
    config::load_config(&path).assert_err_contains("frequency must be a positive number");
}

#[test]
fn test_unsupported_type_still_loads() {
    let config = ConfigBuilder::new()
        .add_typed_task("remote", "ftp")
        .build();

    config::validate_config(&config).assert_ok();
    assert_eq!(config::resolve_tasks(&config)[0].task_type, "ftp");
}
