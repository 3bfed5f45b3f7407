//! Archive writer
//!
//! Archives are written to a `~`-prefixed temporary file inside the target
//! directory and only renamed to their final name once complete, so a
//! half-written archive is never visible under an archive name. Zip and tar
//! containers share one directory walk through [`EntryWriter`].

use crate::config::{ArchiveFormat, CompressionMethod};
use crate::utils::error::ArchiveError;
use crate::utils::naming;
use crate::utils::scanner::TEMP_MARKER;
use bzip2::write::BzEncoder;
use chrono::{DateTime, Datelike, Local, Timelike};
use flate2::write::GzEncoder;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Seek, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// What to archive and where
#[derive(Debug, Clone)]
pub struct ArchiveRequest<'a> {
    pub source: &'a Path,
    pub target_dir: &'a Path,
    pub base_name: &'a str,
    pub format: ArchiveFormat,
    pub compression: CompressionMethod,
}

/// Archive `request.source` into a new file in `request.target_dir`
///
/// Returns `Ok(None)` without touching the filesystem when the source does
/// not exist.
pub fn create_archive(
    request: &ArchiveRequest<'_>,
    now: DateTime<Local>,
) -> Result<Option<PathBuf>, ArchiveError> {
    if !request.target_dir.is_dir() {
        return Err(ArchiveError::TargetNotDirectory(request.target_dir.to_path_buf()));
    }

    let metadata = match fs::metadata(request.source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Source {:?} does not exist, nothing to archive", request.source);
            return Ok(None);
        }
        Err(e) => return Err(ArchiveError::io("reading metadata of", request.source, e)),
    };
    if !metadata.is_dir() && !metadata.is_file() {
        return Err(ArchiveError::UnsupportedSource(request.source.to_path_buf()));
    }

    let file_name = naming::archive_file_name(request.base_name, now, request.format.extension());
    let final_path = request.target_dir.join(&file_name);
    if final_path.exists() {
        return Err(ArchiveError::AlreadyExists(final_path));
    }

    let mut temp = tempfile::Builder::new()
        .prefix(&format!("{}{}_", TEMP_MARKER, request.base_name))
        .suffix(".partial")
        .tempfile_in(request.target_dir)
        .map_err(|e| ArchiveError::io("creating temporary archive in", request.target_dir, e))?;
    let temp_path = temp.path().to_path_buf();

    debug!("Writing {} archive of {:?} into {:?}", request.format, request.source, temp_path);

    write_entries(request, metadata.is_dir(), &mut temp, &temp_path)?;

    temp.as_file()
        .sync_all()
        .map_err(|e| ArchiveError::io("syncing", &temp_path, e))?;

    temp.persist_noclobber(&final_path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            ArchiveError::AlreadyExists(final_path.clone())
        } else {
            ArchiveError::io("renaming archive to", &final_path, e.error)
        }
    })?;

    info!("Created archive {:?}", final_path);
    Ok(Some(final_path))
}

/// Encode the source into `temp` using the requested container
fn write_entries(
    request: &ArchiveRequest<'_>,
    is_dir: bool,
    temp: &mut NamedTempFile,
    temp_path: &Path,
) -> Result<(), ArchiveError> {
    let temp_name = temp_path.file_name().unwrap_or_default();

    match request.format {
        ArchiveFormat::Zip => {
            let mut entries = ZipEntries {
                writer: ZipWriter::new(temp),
                compression: request.compression,
            };
            add_source(&mut entries, request, is_dir, temp_name)?;
            entries
                .writer
                .finish()
                .map_err(|e| ArchiveError::zip("finishing", temp_path, e))?;
        }
        ArchiveFormat::Tar => {
            let mut entries = TarEntries::new(temp);
            add_source(&mut entries, request, is_dir, temp_name)?;
            entries.finish(temp_path)?;
        }
        ArchiveFormat::Gztar => {
            let encoder = GzEncoder::new(temp, flate2::Compression::best());
            let mut entries = TarEntries::new(encoder);
            add_source(&mut entries, request, is_dir, temp_name)?;
            entries
                .finish(temp_path)?
                .finish()
                .map_err(|e| ArchiveError::io("compressing", temp_path, e))?;
        }
        ArchiveFormat::Bztar => {
            let encoder = BzEncoder::new(temp, bzip2::Compression::best());
            let mut entries = TarEntries::new(encoder);
            add_source(&mut entries, request, is_dir, temp_name)?;
            entries
                .finish(temp_path)?
                .finish()
                .map_err(|e| ArchiveError::io("compressing", temp_path, e))?;
        }
    }

    Ok(())
}

/// A container being filled with entries
trait EntryWriter {
    fn add_directory(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError>;

    /// Copy the regular file at `path` in under `name`
    fn add_file(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError>;
}

struct ZipEntries<W: Write + Seek> {
    writer: ZipWriter<W>,
    compression: CompressionMethod,
}

impl<W: Write + Seek> EntryWriter for ZipEntries<W> {
    fn add_directory(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError> {
        let options = entry_options(self.compression, path)?;
        self.writer
            .add_directory(name, options)
            .map_err(|e| ArchiveError::zip("adding directory", path, e))
    }

    fn add_file(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError> {
        let options = entry_options(self.compression, path)?;
        let mut input = File::open(path).map_err(|e| ArchiveError::io("opening", path, e))?;
        self.writer
            .start_file(name, options)
            .map_err(|e| ArchiveError::zip("adding file", path, e))?;
        io::copy(&mut input, &mut self.writer).map_err(|e| ArchiveError::io("archiving", path, e))?;
        Ok(())
    }
}

struct TarEntries<W: Write> {
    builder: tar::Builder<W>,
}

impl<W: Write> TarEntries<W> {
    fn new(writer: W) -> Self {
        Self {
            builder: tar::Builder::new(writer),
        }
    }

    /// Write the end-of-archive marker and hand back the inner writer
    fn finish(self, temp_path: &Path) -> Result<W, ArchiveError> {
        self.builder
            .into_inner()
            .map_err(|e| ArchiveError::io("finishing", temp_path, e))
    }
}

impl<W: Write> EntryWriter for TarEntries<W> {
    fn add_directory(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError> {
        self.builder
            .append_dir(name, path)
            .map_err(|e| ArchiveError::io("adding directory", path, e))
    }

    fn add_file(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError> {
        let mut input = File::open(path).map_err(|e| ArchiveError::io("opening", path, e))?;
        self.builder
            .append_file(name, &mut input)
            .map_err(|e| ArchiveError::io("archiving", path, e))
    }
}

fn add_source<E: EntryWriter>(
    entries: &mut E,
    request: &ArchiveRequest<'_>,
    is_dir: bool,
    temp_name: &OsStr,
) -> Result<(), ArchiveError> {
    if is_dir {
        return add_directory(entries, request, temp_name);
    }

    let entry_name = request
        .source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| request.base_name.to_string());
    entries.add_file(&entry_name, request.source)
}

fn add_directory<E: EntryWriter>(
    entries: &mut E,
    request: &ArchiveRequest<'_>,
    temp_name: &OsStr,
) -> Result<(), ArchiveError> {
    let source = request.source;
    // The target may live inside the source; never archive previous archives.
    let nested_target = target_within_source(source, request.target_dir);

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let Some(ref nested) = nested_target else {
                return true;
            };
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            if nested.as_os_str().is_empty() {
                relative != Path::new(temp_name)
            } else {
                relative != nested.as_path()
            }
        });

    for entry in walker {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf()),
            source: e,
        })?;

        let name = entry_name(source, entry.path());
        let file_type = entry.file_type();

        if file_type.is_dir() {
            entries.add_directory(&name, entry.path())?;
        } else if file_type.is_file() {
            entries.add_file(&name, entry.path())?;
        } else if file_type.is_symlink() {
            warn!("Skipping symlink {:?}", entry.path());
        } else {
            warn!("Skipping {:?}, not a regular file", entry.path());
        }
    }

    Ok(())
}

/// Path of the target relative to the source, when the source contains it
///
/// Both sides are resolved once; the walk never follows links, so the
/// directories it visits are their own canonical paths below the source.
fn target_within_source(source: &Path, target_dir: &Path) -> Option<PathBuf> {
    let source = fs::canonicalize(source).ok()?;
    let target = fs::canonicalize(target_dir).ok()?;
    target.strip_prefix(&source).ok().map(Path::to_path_buf)
}

/// Slash-separated name of `path` relative to `root`
fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn entry_options(compression: CompressionMethod, path: &Path) -> Result<SimpleFileOptions, ArchiveError> {
    let metadata = fs::metadata(path).map_err(|e| ArchiveError::io("reading metadata of", path, e))?;

    let (method, level) = match compression {
        CompressionMethod::Deflated => (zip::CompressionMethod::Deflated, Some(9)),
        CompressionMethod::Bzip2 => (zip::CompressionMethod::Bzip2, Some(9)),
        CompressionMethod::Stored => (zip::CompressionMethod::Stored, None),
    };

    let mut options = SimpleFileOptions::default()
        .compression_method(method)
        .compression_level(level)
        .large_file(metadata.len() >= u64::from(u32::MAX));

    if let Some(modified) = metadata.modified().ok().map(DateTime::<Local>::from) {
        if let Ok(stamp) = zip::DateTime::from_date_and_time(
            modified.year() as u16,
            modified.month() as u8,
            modified.day() as u8,
            modified.hour() as u8,
            modified.minute() as u8,
            modified.second() as u8,
        ) {
            options = options.last_modified_time(stamp);
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    Ok(options)
}
