//! Test fixtures and sample data
//!
//! Source trees, pre-dated archives and archive inspection helpers.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::ZipArchive;

/// Three small files, one of them nested
pub fn sample_files() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("notes.txt", b"remember the milk".as_slice()),
        ("report.csv", b"day,value\n1,42\n".as_slice()),
        ("nested/image.bin", [0u8, 159, 146, 150, 255].as_slice()),
    ]
}

/// Write `files` (relative path, contents) under `root`
pub fn create_source_tree(root: &Path, files: &[(&str, &[u8])]) -> Result<PathBuf> {
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    }
    Ok(root.to_path_buf())
}

/// Local time from calendar fields
pub fn local_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("Ambiguous or invalid local time in fixture")
}

/// Set the modify time of `path`
pub fn set_modified(path: &Path, modified: DateTime<Local>) -> Result<()> {
    File::options()
        .write(true)
        .open(path)?
        .set_modified(SystemTime::from(modified))
        .with_context(|| format!("Failed to set modify time of {:?}", path))
}

/// Create a placeholder archive file named `name` in `dir`, modified at `modified`
pub fn create_dated_archive(dir: &Path, name: &str, modified: DateTime<Local>) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, b"placeholder archive")?;
    set_modified(&path, modified)?;
    Ok(path)
}

/// Archive-looking names in `dir`, sorted; hidden files are left out
pub fn archive_names(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    Ok(names)
}

/// Every entry of a zip file with its decompressed bytes
pub fn read_zip_entries(archive: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let file = File::open(archive).with_context(|| format!("Failed to open {:?}", archive))?;
    let mut zip = ZipArchive::new(file).context("Failed to read zip archive")?;

    let mut entries = BTreeMap::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        entries.insert(entry.name().to_string(), bytes);
    }
    Ok(entries)
}

/// Every regular file of a gzip-compressed tarball with its bytes
pub fn read_tar_gz_entries(archive: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let file = File::open(archive).with_context(|| format!("Failed to open {:?}", archive))?;
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));

    let mut entries = BTreeMap::new();
    for entry in tar.entries().context("Failed to read tar archive")? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        entries.insert(name, bytes);
    }
    Ok(entries)
}

/// Minimal valid config TOML template
pub fn minimal_config_toml() -> &'static str {
    r#"
[global]
log_directory = '{log_dir}'

[[tasks]]
name = "data"
type = "zip"
source = '{source}'
target = '{target}'
frequency = 1
frequency_unit = "day"
"#
}

/// Config with one task in the original key spelling
pub fn legacy_keys_config_toml() -> &'static str {
    r#"
[global]
log_directory = '{log_dir}'

[[tasks]]
type = "zip"
source = '{source}'
target = '{target}'
freq = 2
freq_unit = "hour"
file_format = "zip"
base_name = "legacy"

[tasks.arch_depth]
day = 3
week = 2
"#
}

/// Fill the placeholders of a config template
pub fn render_config(template: &str, log_dir: &Path, source: &Path, target: &Path) -> String {
    template
        .replace("{log_dir}", &log_dir.display().to_string())
        .replace("{source}", &source.display().to_string())
        .replace("{target}", &target.display().to_string())
}
