//! Configuration management for Trawl.
//!
//! Settings arrive as loosely typed input, either raw strings from a host's
//! preference fields or values from a TOML file. Every field has its own
//! parse function that falls back to the documented default (with a warning)
//! instead of failing, so one bad value never discards the rest.
//!
//! ## Example Configuration File (trawl.toml)
//!
//! ```toml
//! scan_every_minutes = 15
//! search_after_characters = 2
//! search_max_results = 5
//! search_threshold = 0.5
//! ignore_filename = ".trawlignore"   # false disables ignore files
//! icon_theme = "square-o"
//! use_built_in_folder_theme = false
//!
//! directories = [
//!     "~/Documents=2",
//!     { path = "~/Projects", depth = 3 },
//! ]
//! ```

use crate::error::{Result, TrawlError};
use crate::types::ScanRoot;
use directories::{BaseDirs, ProjectDirs};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_SCAN_EVERY_MINUTES: f64 = 15.0;
pub const DEFAULT_SEARCH_AFTER_CHARACTERS: i64 = 2;
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;
pub const DEFAULT_SEARCH_THRESHOLD: f64 = 0.5;
pub const DEFAULT_IGNORE_FILENAME: &str = ".trawlignore";
pub const DEFAULT_ICON_THEME: &str = "square-o";

/// Name of the settings file inside the config directory
pub const CONFIG_FILE_NAME: &str = "trawl.toml";

/// All user-facing settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Minutes between rescans; zero or negative scans once
    pub scan_every_minutes: f64,

    /// Directories to index
    pub directories: Vec<ScanRoot>,

    /// Queries this short or shorter return nothing
    pub search_after_characters: i64,

    pub search_max_results: usize,

    pub search_threshold: f64,

    /// Per-directory ignore file (None = ignore files disabled)
    pub ignore_filename: Option<String>,

    /// Consumed by icon lookup only
    pub icon_theme: String,

    /// Consumed by icon lookup only
    pub use_built_in_folder_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            scan_every_minutes: DEFAULT_SCAN_EVERY_MINUTES,
            directories: Vec::new(),
            search_after_characters: DEFAULT_SEARCH_AFTER_CHARACTERS,
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
            search_threshold: DEFAULT_SEARCH_THRESHOLD,
            ignore_filename: Some(DEFAULT_IGNORE_FILENAME.to_string()),
            icon_theme: DEFAULT_ICON_THEME.to_string(),
            use_built_in_folder_theme: false,
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    ///
    /// Returns defaults if no settings file exists.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_from(&path)
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Settings::default());
        }

        info!(path = %path.display(), "Loading settings");
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse settings from TOML text.
    ///
    /// Only a syntax error fails; a value of the wrong type or out of range
    /// falls back to that field's default.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e| TrawlError::config(format!("Failed to parse settings: {}", e)))?;

        let mut settings = Settings::default();
        for (key, value) in &table {
            match key.as_str() {
                "scan_every_minutes" => {
                    settings.scan_every_minutes = parse_scan_every_minutes(&scalar(key, value));
                }
                "directories" => settings.directories = directories_from_value(value),
                "search_after_characters" => {
                    settings.search_after_characters =
                        parse_search_after_characters(&scalar(key, value));
                }
                "search_max_results" => {
                    settings.search_max_results = parse_search_max_results(&scalar(key, value));
                }
                "search_threshold" => {
                    settings.search_threshold = parse_search_threshold(&scalar(key, value));
                }
                "ignore_filename" => {
                    settings.ignore_filename = match value {
                        toml::Value::Boolean(false) => None,
                        other => parse_ignore_filename(&scalar(key, other)),
                    };
                }
                "icon_theme" => settings.icon_theme = parse_icon_theme(&scalar(key, value)),
                "use_built_in_folder_theme" => {
                    settings.use_built_in_folder_theme = parse_bool_flag(&scalar(key, value));
                }
                other => warn!(key = other, "Unknown setting ignored"),
            }
        }

        Ok(settings)
    }

    /// Get the default settings file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "trawl")
            .ok_or_else(|| TrawlError::config("Could not determine config directory"))?;

        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Lifetime of cached search results: one rescan interval.
    pub fn cache_ttl(&self) -> Duration {
        cache_ttl_for(self.scan_every_minutes)
    }

    /// Log a one-line summary of the effective settings.
    pub fn log_summary(&self) {
        let directories: Vec<String> = self.directories.iter().map(|d| d.to_string()).collect();
        info!(
            scan_every_minutes = self.scan_every_minutes,
            search_after_characters = self.search_after_characters,
            search_max_results = self.search_max_results,
            search_threshold = self.search_threshold,
            ignore_filename = self.ignore_filename.as_deref().unwrap_or("<none>"),
            icon_theme = %self.icon_theme,
            use_built_in_folder_theme = self.use_built_in_folder_theme,
            directories = ?directories,
            "Loaded settings"
        );
    }
}

/// Cache lifetime for a rescan interval; zero when rescans are disabled.
pub fn cache_ttl_for(scan_every_minutes: f64) -> Duration {
    if scan_every_minutes.is_nan() || scan_every_minutes <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(scan_every_minutes * 60.0).unwrap_or(Duration::MAX)
}

/// Rescan interval in minutes. Non-numeric or non-finite input gives the
/// default; zero and negative values are kept.
pub fn parse_scan_every_minutes(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(minutes) if minutes.is_finite() => minutes,
        _ => fallback("scan_every_minutes", raw, DEFAULT_SCAN_EVERY_MINUTES),
    }
}

pub fn parse_search_after_characters(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(_) => fallback("search_after_characters", raw, DEFAULT_SEARCH_AFTER_CHARACTERS),
    }
}

/// Maximum result count. Negative input gives the default.
pub fn parse_search_max_results(raw: &str) -> usize {
    raw.trim()
        .parse::<usize>()
        .unwrap_or_else(|_| fallback("search_max_results", raw, DEFAULT_SEARCH_MAX_RESULTS))
}

pub fn parse_search_threshold(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(threshold) if threshold.is_finite() => threshold,
        _ => fallback("search_threshold", raw, DEFAULT_SEARCH_THRESHOLD),
    }
}

/// Ignore filename; blank input selects the default name.
pub fn parse_ignore_filename(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        Some(DEFAULT_IGNORE_FILENAME.to_string())
    } else {
        Some(name.to_string())
    }
}

pub fn parse_icon_theme(raw: &str) -> String {
    let theme = raw.trim();
    if theme.is_empty() {
        DEFAULT_ICON_THEME.to_string()
    } else {
        theme.to_string()
    }
}

/// True only for a case-insensitive `true`.
pub fn parse_bool_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

/// Parse newline-separated `path[=depth]` lines.
///
/// The depth is split off at the last `=`. A leading `~` is expanded, and the
/// path is made absolute and normalized. Blank lines are skipped and a
/// malformed depth becomes 0 (unlimited).
pub fn parse_directories(raw: &str) -> Vec<ScanRoot> {
    raw.lines().filter_map(parse_directory_line).collect()
}

fn parse_directory_line(line: &str) -> Option<ScanRoot> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (path, depth) = match line.rsplit_once('=') {
        Some((path, depth)) => (path.trim(), parse_depth(depth)),
        None => (line, 0),
    };
    if path.is_empty() {
        warn!(line, "Directory entry without a path ignored");
        return None;
    }

    Some(ScanRoot::new(resolve_path(path), depth))
}

fn parse_depth(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .unwrap_or_else(|_| fallback("directory depth", raw, 0))
}

/// Directories from TOML: one multi-line string, or an array of
/// `path[=depth]` strings and `{ path, depth }` tables.
fn directories_from_value(value: &toml::Value) -> Vec<ScanRoot> {
    match value {
        toml::Value::String(raw) => parse_directories(raw),
        toml::Value::Array(items) => items.iter().filter_map(directory_from_item).collect(),
        other => {
            warn!(value = %other, "Setting directories has an unsupported type, using none");
            Vec::new()
        }
    }
}

fn directory_from_item(item: &toml::Value) -> Option<ScanRoot> {
    match item {
        toml::Value::String(line) => parse_directory_line(line),
        toml::Value::Table(table) => {
            let Some(path) = table.get("path").and_then(toml::Value::as_str) else {
                warn!(entry = %item, "Directory table without a path ignored");
                return None;
            };
            let depth = table.get("depth").map_or(0, |d| parse_depth(&scalar("depth", d)));
            Some(ScanRoot::new(resolve_path(path.trim()), depth))
        }
        other => {
            warn!(entry = %other, "Unsupported directory entry ignored");
            None
        }
    }
}

/// Expand `~`, make absolute against the working directory and normalize
/// `.` and `..` without touching the filesystem.
pub fn resolve_path(raw: &str) -> PathBuf {
    let expanded = expand_home(raw);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(e) => {
                warn!(path = raw, error = %e, "Could not resolve relative path");
                expanded
            }
        }
    };
    normalize(&absolute)
}

fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };

    match (rest, BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(raw),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Render a scalar TOML value the way a preference field would hold it.
fn scalar(key: &str, value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        other => {
            warn!(key, value = %other, "Setting is not a scalar");
            String::new()
        }
    }
}

fn fallback<T: std::fmt::Display>(setting: &str, raw: &str, default: T) -> T {
    warn!(setting, value = raw, default = %default, "Invalid setting, using default");
    default
}
