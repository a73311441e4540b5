//! Settings resolution and application state.

use std::path::Path;
use trawl_core::config::parse_directories;
use trawl_core::{FileService, Settings};
use tracing::info;

/// Settings given on the command line, applied over the settings file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `PATH[=DEPTH]` values; any replace the configured directories
    pub dirs: Vec<String>,

    pub no_ignore: bool,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        if !self.dirs.is_empty() {
            settings.directories = parse_directories(&self.dirs.join("\n"));
        }
        if self.no_ignore {
            settings.ignore_filename = None;
        }
    }
}

/// Load the settings file (explicit path or default location) and apply
/// command-line overrides.
pub fn load_settings(config: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    overrides.apply(&mut settings);
    Ok(settings)
}

/// Shared application state.
pub struct App {
    /// The search service
    pub service: FileService,
}

impl App {
    /// Create a stopped service for `settings`.
    ///
    /// Fails if there is nothing to index.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        if settings.directories.is_empty() {
            let location = Settings::default_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the settings file".to_string());
            anyhow::bail!("No directories configured. Add some to {} or pass --dir.", location);
        }

        settings.log_summary();
        info!(roots = settings.directories.len(), "Application initialized");

        Ok(App {
            service: FileService::with_settings(settings),
        })
    }
}
