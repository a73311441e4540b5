//! Subcommand implementations.

pub mod query;
pub mod scan;
pub mod serve;

use crate::OutputFormat;
use trawl_core::ScoredResult;

/// Print `results` to stdout in the requested format.
pub(crate) fn print_results(results: &[ScoredResult], output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Text => {
            for result in results {
                let marker = if result.is_directory { "dir " } else { "file" };
                println!("{:.3}  {}  {}", result.score, marker, result.path.display());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
    }
    Ok(())
}
