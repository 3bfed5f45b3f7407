//! Filesystem scanner
//!
//! Walks a directory tree lazily and yields the regular files that pass a
//! [`ScanFilter`]. Each call to [`scan`] walks the filesystem again, so the
//! results always reflect deletions or writes made since the previous call.

use crate::utils::error::ScanError;
use chrono::{DateTime, Local};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Names starting with this marker are temporary files and never yielded
pub const TEMP_MARKER: char = '~';

/// A file accepted by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: DateTime<Local>,
}

/// Conjunctive filter set applied to every file name
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    extensions: Vec<String>,
    exclusions: HashSet<String>,
    min_modified: Option<DateTime<Local>>,
    top_only: bool,
    name_pattern: Option<Regex>,
}

impl ScanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow only these extensions (with or without the leading dot, any case)
    ///
    /// Multi-part extensions such as `tar.gz` are matched against the end of
    /// the name.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .collect();
        self
    }

    /// Skip files with exactly these names
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Skip files modified before `since`
    pub fn modified_since(mut self, since: DateTime<Local>) -> Self {
        self.min_modified = Some(since);
        self
    }

    /// Only look at the immediate children of the root
    pub fn top_only(mut self, top_only: bool) -> Self {
        self.top_only = top_only;
        self
    }

    /// Require names to match `pattern` from their first character
    pub fn name_pattern(self, pattern: &str) -> Result<Self, ScanError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            ScanError::Pattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(self.name_regex(regex))
    }

    /// Use an already compiled name regex as-is
    pub fn name_regex(mut self, regex: Regex) -> Self {
        self.name_pattern = Some(regex);
        self
    }

    fn accepts_name(&self, file_name: &str) -> bool {
        if file_name.starts_with(TEMP_MARKER) {
            return false;
        }

        if !self.extensions.is_empty() {
            let lowered = file_name.to_lowercase();
            let has_extension = self
                .extensions
                .iter()
                .any(|suffix| lowered.len() > suffix.len() && lowered.ends_with(suffix.as_str()));
            if !has_extension {
                return false;
            }
        }

        if self.exclusions.contains(file_name) {
            return false;
        }

        match self.name_pattern {
            Some(ref regex) => regex.is_match(file_name),
            None => true,
        }
    }
}

/// Start a scan of `root`
///
/// Fails immediately when `root` is missing or unreadable; errors met deeper
/// in the tree are yielded as `Err` items.
pub fn scan(root: &Path, filter: &ScanFilter) -> Result<Scan, ScanError> {
    fs::read_dir(root).map_err(|source| ScanError::Root {
        path: root.to_path_buf(),
        source,
    })?;

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if filter.top_only {
        walker = walker.max_depth(1);
    }

    debug!("Scanning {:?}", root);

    Ok(Scan {
        root: root.to_path_buf(),
        walker: walker.into_iter(),
        filter: filter.clone(),
    })
}

/// Lazy iterator over the files accepted by a [`ScanFilter`]
pub struct Scan {
    root: PathBuf,
    walker: walkdir::IntoIter,
    filter: ScanFilter,
}

impl Iterator for Scan {
    type Item = Result<ScanEntry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ScanError::walk(&self.root, e))),
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !self.filter.accepts_name(&file_name) {
                continue;
            }

            let modified = match entry.metadata() {
                Ok(metadata) => match metadata.modified() {
                    Ok(time) => DateTime::<Local>::from(time),
                    Err(source) => {
                        return Some(Err(ScanError::Metadata {
                            path: entry.path().to_path_buf(),
                            source,
                        }))
                    }
                },
                Err(e) => return Some(Err(ScanError::walk(&self.root, e))),
            };

            if let Some(min) = self.filter.min_modified {
                if modified < min {
                    continue;
                }
            }

            return Some(Ok(ScanEntry {
                path: entry.into_path(),
                file_name,
                modified,
            }));
        }
    }
}
