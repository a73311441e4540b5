//! Error types for Trawl core operations.
//!
//! Scanning and searching are best-effort and never return these errors to
//! their callers; they are logged and recovered where they occur. They are
//! surfaced by the settings loader and used internally to carry context into
//! log records.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TrawlError
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Core error types for Trawl operations.
#[derive(Error, Debug)]
pub enum TrawlError {
    // === Configuration Errors ===
    /// A settings file could not be located, parsed or written
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === Filesystem Errors ===
    /// A path or subtree could not be read during a scan
    #[error("filesystem error: {operation} on {path} failed: {reason}")]
    FilesystemError {
        operation: String,
        path: PathBuf,
        reason: String,
    },

    // === Ignore File Errors ===
    /// An ignore file was unreadable or its patterns failed to compile
    #[error("ignore file {path}: {reason}")]
    IgnoreFile { path: PathBuf, reason: String },

    // === Search Errors ===
    /// A query could not be compiled as a glob pattern
    #[error("invalid search pattern: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrawlError {
    /// Returns true if the failure only affects part of a scan, meaning the
    /// scan continues with the remaining paths.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            TrawlError::FilesystemError { .. } | TrawlError::IgnoreFile { .. }
        )
    }

    /// Create a filesystem error
    pub fn filesystem(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl ToString,
    ) -> Self {
        TrawlError::FilesystemError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an ignore file error
    pub fn ignore_file(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TrawlError::IgnoreFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        TrawlError::ConfigError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_partial() {
        let err = TrawlError::filesystem("read_dir", "/root/private", "permission denied");
        assert!(err.is_partial());

        let err = TrawlError::ignore_file("/tmp/.trawlignore", "unclosed character class");
        assert!(err.is_partial());

        let err = TrawlError::config("missing section");
        assert!(!err.is_partial());
    }

    #[test]
    fn test_display() {
        let err = TrawlError::filesystem("read_dir", "/srv/data", "permission denied");
        assert_eq!(
            err.to_string(),
            "filesystem error: read_dir on /srv/data failed: permission denied"
        );
    }
}
