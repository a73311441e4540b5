//! Query command - scan, then search.

use crate::app::App;
use crate::commands::print_results;
use crate::OutputFormat;
use std::time::Instant;
use trawl_core::Settings;

/// Run the query command.
pub fn run(
    mut settings: Settings,
    query: &str,
    limit: Option<usize>,
    threshold: Option<f64>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(limit) = limit {
        settings.search_max_results = limit;
    }
    if let Some(threshold) = threshold {
        settings.search_threshold = threshold;
    }
    let after_characters = settings.search_after_characters;

    let app = App::new(settings)?;
    app.service.scan();

    if app.service.index().is_empty() {
        eprintln!("Nothing was indexed. Check the configured directories.");
        return Ok(());
    }

    let start = Instant::now();
    let results = app.service.search(query);
    let elapsed = start.elapsed();

    print_results(&results, output)?;

    if matches!(output, OutputFormat::Text) {
        eprintln!();
        if results.is_empty()
            && after_characters > 0
            && query.trim().chars().count() as i64 <= after_characters
        {
            eprintln!("Queries need more than {} characters.", after_characters);
        }
        eprintln!(
            "Found {} results in {:.3}ms",
            results.len(),
            elapsed.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
