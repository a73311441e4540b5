//! # Trawl CLI
//!
//! Command-line interface for the Trawl file finder.
//!
//! ## Commands
//!
//! - `trawl scan` - Walk the configured directories and report counts
//! - `trawl query <query>` - Scan, then print the best matches
//! - `trawl serve` - Keep the index fresh and answer queries read from stdin
//!
//! ## Example Usage
//!
//! ```bash
//! # Index two trees, one limited to depth 2
//! trawl -d ~/Documents=2 -d ~/Projects scan
//!
//! # Find PDFs
//! trawl -d ~/Downloads query "*.pdf"
//!
//! # Answer queries line by line
//! printf 'invoice\nreport\n' | trawl serve
//! ```

mod app;
mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Trawl - fuzzy file finder for your own directories
#[derive(Parser)]
#[command(name = "trawl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Ignore per-directory ignore files
    #[arg(long, global = true)]
    no_ignore: bool,

    /// Directory to index, replacing the configured ones (repeatable)
    #[arg(short = 'd', long = "dir", value_name = "PATH[=DEPTH]", global = true)]
    dirs: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the configured directories once and report what was indexed
    Scan,

    /// Scan, then search for a query
    Query {
        /// Query text (glob wildcards are allowed)
        query: String,

        /// Maximum number of results to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum score a result needs
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Rescan periodically and answer one query per stdin line until EOF
    Serve {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    let overrides = app::Overrides {
        dirs: cli.dirs,
        no_ignore: cli.no_ignore,
    };
    let settings = app::load_settings(cli.config.as_deref(), &overrides)?;

    // Execute command
    match cli.command {
        Commands::Scan => commands::scan::run(settings),
        Commands::Query {
            query,
            limit,
            threshold,
            output,
        } => commands::query::run(settings, &query, limit, threshold, output),
        Commands::Serve { output } => commands::serve::run(settings, output),
    }
}
