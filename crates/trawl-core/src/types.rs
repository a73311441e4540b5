//! Core data types for Trawl.
//!
//! This module defines the values produced by a scan and returned by a
//! search:
//!
//! - **PathEntry**: one indexed filesystem path plus its pre-computed
//!   search strings
//! - **ScoredResult**: a ranked hit handed back to the host
//! - **ScanRoot**: a configured root directory and its depth limit

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// A configured scan root.
///
/// `depth <= 0` means unlimited. With `depth = N`, nothing more than `N`
/// levels below `path` is indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRoot {
    pub path: PathBuf,
    pub depth: i64,
}

impl ScanRoot {
    /// Create a root with the given depth limit
    pub fn new(path: impl Into<PathBuf>, depth: i64) -> Self {
        ScanRoot {
            path: path.into(),
            depth,
        }
    }

    /// Create a root without a depth limit
    pub fn unlimited(path: impl Into<PathBuf>) -> Self {
        Self::new(path, 0)
    }

    /// The depth limit, or `None` when unlimited
    pub fn depth_limit(&self) -> Option<usize> {
        (self.depth > 0).then_some(self.depth as usize)
    }
}

impl fmt::Display for ScanRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth > 0 {
            write!(f, "{}={}", self.path.display(), self.depth)
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}

/// A single indexed path.
///
/// Entries are created by a scan and owned by the index. `root` points at
/// the entry of the scan root the path was found under and is only used to
/// derive the relative path and depth.
///
/// ## Design Notes
///
/// - Lowercase forms are pre-computed since every search compares against them
/// - The `*_stem` forms have the final extension stripped and are used when
///   the query itself carries no extension
/// - Depths are derived on first use and kept for the lifetime of the entry
pub struct PathEntry {
    path: PathBuf,
    is_directory: bool,
    root: Option<Arc<PathEntry>>,

    name: String,
    name_lower: String,
    stem_lower: String,
    relpath: String,
    relpath_lower: String,
    relpath_stem_lower: String,

    path_depth: OnceLock<usize>,
    relative_depth: OnceLock<usize>,
}

impl PathEntry {
    /// Create a new entry for `path`, owned by the scan root entry `root`.
    pub fn new(path: impl Into<PathBuf>, root: Option<Arc<PathEntry>>, is_directory: bool) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let relpath = match &root {
            Some(root) => path
                .strip_prefix(&root.path)
                .map(|rel| rel.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => String::new(),
        };

        let name_lower = name.to_lowercase();
        let relpath_lower = relpath.to_lowercase();
        let stem_lower = split_extension(&name_lower).0.to_string();
        let relpath_stem_lower = split_extension(&relpath_lower).0.to_string();

        PathEntry {
            path,
            is_directory,
            root,
            name,
            name_lower,
            stem_lower,
            relpath,
            relpath_lower,
            relpath_stem_lower,
            path_depth: OnceLock::new(),
            relative_depth: OnceLock::new(),
        }
    }

    /// Absolute path of the entry
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// The scan root entry this path was indexed under
    pub fn root(&self) -> Option<&Arc<PathEntry>> {
        self.root.as_ref()
    }

    /// Base name (e.g., "report.pdf")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_lower(&self) -> &str {
        &self.name_lower
    }

    /// Lowercase base name without its extension
    pub fn stem_lower(&self) -> &str {
        &self.stem_lower
    }

    /// Path relative to the scan root, empty for the root itself
    pub fn relpath(&self) -> &str {
        &self.relpath
    }

    pub fn relpath_lower(&self) -> &str {
        &self.relpath_lower
    }

    /// Lowercase relative path without the final extension
    pub fn relpath_stem_lower(&self) -> &str {
        &self.relpath_stem_lower
    }

    /// Number of named components in the absolute path.
    pub fn path_depth(&self) -> usize {
        *self.path_depth.get_or_init(|| {
            self.path
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
    }

    /// Depth below the scan root (0 for the root and for entries without one).
    pub fn relative_depth(&self) -> usize {
        *self.relative_depth.get_or_init(|| match &self.root {
            Some(root) => self.path_depth().saturating_sub(root.path_depth()),
            None => 0,
        })
    }

    /// Convert into the result handed to the host
    pub fn to_result(&self, score: f64) -> ScoredResult {
        ScoredResult {
            path: self.path.clone(),
            is_directory: self.is_directory,
            score,
        }
    }
}

impl PartialEq for PathEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for PathEntry {}

impl Hash for PathEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Debug for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathEntry")
            .field("path", &self.path)
            .field("is_directory", &self.is_directory)
            .field("relpath", &self.relpath)
            .finish()
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub path: PathBuf,
    pub is_directory: bool,
    /// Relevance in roughly `[0, 1.1]`, higher is better
    pub score: f64,
}

impl ScoredResult {
    /// Base name of the result path
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension of the result path, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
    }
}

impl fmt::Display for ScoredResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_directory { "d " } else { "" };
        write!(
            f,
            "{:.3}={}{}: {}",
            self.score,
            marker,
            self.name(),
            self.path.display()
        )
    }
}

/// Counters from the most recent scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub directories: u64,
    pub files: u64,
    pub elapsed: Duration,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScanStats {
    /// Total number of entries (files + directories)
    pub fn total_entries(&self) -> u64 {
        self.directories + self.files
    }
}

/// Split `value` into everything before the final extension and the
/// extension itself (including its dot).
///
/// Only the last path component is considered, and leading dots do not
/// start an extension, so `.bashrc` has none.
pub(crate) fn split_extension(value: &str) -> (&str, &str) {
    let base_start = value
        .rfind(std::path::is_separator)
        .map(|i| i + 1)
        .unwrap_or(0);
    let base = &value[base_start..];

    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => {
            value.split_at(base_start + dot)
        }
        _ => (value, ""),
    }
}
