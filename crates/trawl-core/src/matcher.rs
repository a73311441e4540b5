//! Gitignore-style include/exclude evaluation.
//!
//! Every directory that contains an ignore file contributes one layer of
//! rules, compiled relative to that directory. Layers are inherited down the
//! tree: a directory's matcher is its parent's matcher plus its own layer, and
//! the deepest decisive layer wins. A child can therefore add exclusions or
//! re-include a path with a `!pattern`.
//!
//! Building a matcher never fails. An unreadable ignore file or one whose
//! patterns do not compile leaves the parent's matcher in effect.

use crate::error::TrawlError;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// A compiled, inherited set of ignore rules.
///
/// Cloning is cheap; layers are shared with the parent matcher.
#[derive(Clone, Default)]
pub struct IgnoreMatcher {
    top: Option<Arc<Layer>>,
}

struct Layer {
    rules: Gitignore,
    /// Pattern text of this layer and all layers above it, newline-joined
    text: String,
    parent: Option<Arc<Layer>>,
}

impl IgnoreMatcher {
    /// The matcher used above any ignore file; it includes everything.
    pub fn root() -> Self {
        IgnoreMatcher::default()
    }

    /// True if no ignore file contributed to this matcher
    pub fn is_root(&self) -> bool {
        self.top.is_none()
    }

    /// Accumulated pattern text, parents first.
    pub fn pattern_text(&self) -> &str {
        self.top.as_deref().map(|l| l.text.as_str()).unwrap_or("")
    }

    /// Returns true if `path` should be indexed.
    ///
    /// `path` is absolute; each layer matches it relative to the directory
    /// holding its ignore file. `is_dir` lets directory-only patterns
    /// (`name/`) apply.
    pub fn is_included(&self, path: &Path, is_dir: bool) -> bool {
        let mut layer = self.top.as_deref();
        while let Some(current) = layer {
            match current.rules.matched(path, is_dir) {
                Match::Ignore(_) => return false,
                Match::Whitelist(_) => return true,
                Match::None => layer = current.parent.as_deref(),
            }
        }
        true
    }

    /// Compile `text` as a new layer rooted at `directory` on top of `self`.
    fn push_layer(&self, directory: &Path, source: &Path, text: &str) -> Result<Self, TrawlError> {
        let mut builder = GitignoreBuilder::new(directory);
        for line in text.lines() {
            builder
                .add_line(Some(source.to_path_buf()), line)
                .map_err(|e| TrawlError::ignore_file(source, e))?;
        }
        let rules = builder
            .build()
            .map_err(|e| TrawlError::ignore_file(source, e))?;

        let parent = self.top.clone();
        let text = match parent.as_deref() {
            Some(p) if !p.text.is_empty() => format!("{}\n{}", p.text, text),
            _ => text.to_string(),
        };

        Ok(IgnoreMatcher {
            top: Some(Arc::new(Layer {
                rules,
                text,
                parent,
            })),
        })
    }
}

impl std::fmt::Debug for IgnoreMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut depth = 0;
        let mut layer = self.top.as_deref();
        while let Some(current) = layer {
            depth += 1;
            layer = current.parent.as_deref();
        }
        f.debug_struct("IgnoreMatcher")
            .field("layers", &depth)
            .finish()
    }
}

/// Resolves per-directory matchers for a configured ignore filename.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    filename: Option<String>,
}

impl IgnoreRules {
    /// Rules reading `filename` in every directory; `None` or an empty name
    /// disables filtering.
    pub fn new(filename: Option<String>) -> Self {
        IgnoreRules {
            filename: filename.filter(|f| !f.trim().is_empty()),
        }
    }

    /// The ignore filename in effect
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Effective matcher for `directory`, given the names of the files it
    /// directly contains and the matcher of its parent.
    pub fn matcher_for(
        &self,
        directory: &Path,
        file_names: &[OsString],
        parent: &IgnoreMatcher,
    ) -> IgnoreMatcher {
        let Some(filename) = self.filename.as_deref() else {
            return IgnoreMatcher::root();
        };
        if !file_names.iter().any(|name| name.as_os_str() == OsStr::new(filename)) {
            return parent.clone();
        }

        let source: PathBuf = directory.join(filename);
        let text = match fs::read_to_string(&source) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Failed to read ignore file");
                return parent.clone();
            }
        };

        match parent.push_layer(directory, &source, &text) {
            Ok(matcher) => {
                debug!(path = %source.display(), "Loaded ignore file");
                matcher
            }
            Err(e) => {
                warn!(error = %e, "Failed to compile ignore file, keeping parent rules");
                parent.clone()
            }
        }
    }
}
