//! Depth-bounded directory traversal.
//!
//! The walker visits every configured root in order and produces a fresh
//! entry map. Each directory's ignore matcher is derived from its parent's,
//! which is memoized for the duration of one pass only. Unreadable paths are
//! logged and skipped; a walk never fails as a whole.

use crate::error::TrawlError;
use crate::matcher::{IgnoreMatcher, IgnoreRules};
use crate::types::{PathEntry, ScanRoot};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How often (in entries) progress is reported
const PROGRESS_EVERY: u64 = 10_000;

/// Progress reporting for scan operations
pub trait ScanProgress: Send + Sync {
    /// Called periodically during scanning with the current counts
    fn on_progress(&self, dirs_scanned: u64, files_scanned: u64);

    /// Called when scanning is complete
    fn on_complete(&self, total_dirs: u64, total_files: u64, elapsed: Duration);
}

/// A progress reporter that logs to tracing
#[derive(Debug, Default)]
pub struct LoggingProgress;

impl ScanProgress for LoggingProgress {
    fn on_progress(&self, dirs_scanned: u64, files_scanned: u64) {
        tracing::debug!(
            dirs = dirs_scanned,
            files = files_scanned,
            "Scanning progress"
        );
    }

    fn on_complete(&self, total_dirs: u64, total_files: u64, elapsed: Duration) {
        tracing::info!(
            dirs = total_dirs,
            files = total_files,
            elapsed_ms = format_args!("{:.2}", elapsed.as_secs_f64() * 1000.0),
            "Finished scanning"
        );
    }
}

/// Everything a walk produced.
#[derive(Debug, Default)]
pub struct WalkOutput {
    pub entries: HashMap<PathBuf, Arc<PathEntry>>,
    pub directories: u64,
    pub files: u64,
}

/// Walks scan roots into a new entry map.
pub struct Walker<'a> {
    rules: &'a IgnoreRules,
    progress: Option<&'a dyn ScanProgress>,
    output: WalkOutput,
    /// Matchers of directories visited in this pass
    matchers: HashMap<PathBuf, IgnoreMatcher>,
}

/// Contents of one directory, split by kind
struct Listing {
    file_names: Vec<OsString>,
    subdirs: Vec<PathBuf>,
}

impl<'a> Walker<'a> {
    pub fn new(rules: &'a IgnoreRules, progress: Option<&'a dyn ScanProgress>) -> Self {
        Walker {
            rules,
            progress,
            output: WalkOutput::default(),
            matchers: HashMap::new(),
        }
    }

    /// Walk every root in order and return the collected entries.
    ///
    /// Roots are expected deepest first, so a directory already claimed by a
    /// more specific root is skipped together with its subtree.
    pub fn walk(mut self, roots: &[ScanRoot]) -> WalkOutput {
        for root in roots {
            self.walk_root(root);
        }
        self.output
    }

    fn walk_root(&mut self, root: &ScanRoot) {
        if self.output.entries.contains_key(&root.path) {
            debug!(
                root = %root.path.display(),
                "Root already covered by a more specific root"
            );
            return;
        }

        let metadata = match fs::metadata(&root.path) {
            Ok(m) => m,
            Err(e) => {
                debug!(root = %root.path.display(), error = %e, "Skipping missing root");
                return;
            }
        };

        if metadata.is_file() {
            let entry = PathEntry::new(&root.path, None, false);
            self.insert(Arc::new(entry));
            self.output.files += 1;
            return;
        }
        if !metadata.is_dir() {
            return;
        }

        let root_entry = Arc::new(PathEntry::new(&root.path, None, true));
        let limit = root.depth_limit();
        let mut stack = vec![(root.path.clone(), 0usize)];

        while let Some((dir, depth)) = stack.pop() {
            let is_root = dir == root.path;
            if !is_root && self.output.entries.contains_key(&dir) {
                continue;
            }

            let listing = match list_directory(&dir) {
                Ok(listing) => listing,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            let matcher = {
                let parent = if is_root {
                    None
                } else {
                    dir.parent().and_then(|p| self.matchers.get(p))
                };
                let root_matcher = IgnoreMatcher::root();
                self.rules
                    .matcher_for(&dir, &listing.file_names, parent.unwrap_or(&root_matcher))
            };

            if !is_root && !matcher.is_included(&dir, true) {
                continue;
            }

            let dir_entry = if is_root {
                Arc::clone(&root_entry)
            } else {
                Arc::new(PathEntry::new(&dir, Some(Arc::clone(&root_entry)), true))
            };
            self.insert(dir_entry);
            self.output.directories += 1;

            if limit.is_some_and(|limit| depth >= limit) {
                continue;
            }

            for name in &listing.file_names {
                let path = dir.join(name);
                if self.output.entries.contains_key(&path) || !matcher.is_included(&path, false) {
                    continue;
                }
                let entry = PathEntry::new(path, Some(Arc::clone(&root_entry)), false);
                self.insert(Arc::new(entry));
                self.output.files += 1;
            }

            self.matchers.insert(dir.clone(), matcher);
            for subdir in listing.subdirs.into_iter().rev() {
                stack.push((subdir, depth + 1));
            }
        }
    }

    fn insert(&mut self, entry: Arc<PathEntry>) {
        self.output
            .entries
            .insert(entry.path().to_path_buf(), entry);

        if let Some(progress) = self.progress {
            let total = self.output.directories + self.output.files;
            if total > 0 && total % PROGRESS_EVERY == 0 {
                progress.on_progress(self.output.directories, self.output.files);
            }
        }
    }
}

/// Read one directory level.
///
/// Symlinks to directories are neither followed nor listed.
fn list_directory(dir: &Path) -> Result<Listing, TrawlError> {
    let read = fs::read_dir(dir).map_err(|e| TrawlError::filesystem("read_dir", dir, e))?;

    let mut listing = Listing {
        file_names: Vec::new(),
        subdirs: Vec::new(),
    };

    for entry in read {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "Failed to stat entry");
                continue;
            }
        };

        if file_type.is_dir() {
            listing.subdirs.push(entry.path());
        } else if file_type.is_symlink() && entry.path().is_dir() {
            continue;
        } else {
            listing.file_names.push(entry.file_name());
        }
    }

    listing.subdirs.sort();
    Ok(listing)
}
