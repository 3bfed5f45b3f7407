//! Error types for the scanning, archiving, retention and locking utilities
//!
//! Every variant carries the path it concerns so a failure in an unattended
//! run can be diagnosed from the log line alone.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while walking a directory tree
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Cannot scan {path:?}: {source}")]
    Root { path: PathBuf, source: io::Error },

    #[error("Failed to walk {path:?}: {source}")]
    Walk { path: PathBuf, source: walkdir::Error },

    #[error("Failed to read modify time of {path:?}: {source}")]
    Metadata { path: PathBuf, source: io::Error },

    #[error("Invalid name pattern '{pattern}': {source}")]
    Pattern { pattern: String, source: regex::Error },
}

impl ScanError {
    pub(crate) fn walk(root: &Path, source: walkdir::Error) -> Self {
        let path = source
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        ScanError::Walk { path, source }
    }
}

/// Errors raised while writing an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Target {0:?} does not exist or is not a directory")]
    TargetNotDirectory(PathBuf),

    #[error("Archive {0:?} already exists")]
    AlreadyExists(PathBuf),

    #[error("Source {0:?} is neither a regular file nor a directory")]
    UnsupportedSource(PathBuf),

    #[error("I/O failure while {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Zip failure while {operation} {path:?}: {source}")]
    Zip {
        operation: &'static str,
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Failed to walk source {path:?}: {source}")]
    Walk { path: PathBuf, source: walkdir::Error },
}

impl ArchiveError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ArchiveError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        ArchiveError::Zip {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while taking a target directory lock
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Target {0:?} is locked by another run")]
    Held(PathBuf),

    #[error("Failed to open lock file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}
