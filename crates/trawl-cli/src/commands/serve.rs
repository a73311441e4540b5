//! Serve command - rescan on a timer and answer queries from stdin.

use crate::app::App;
use crate::commands::print_results;
use crate::OutputFormat;
use std::io::{self, BufRead};
use trawl_core::Settings;
use tracing::{info, warn};

/// Run the serve command.
pub fn run(settings: Settings, output: OutputFormat) -> anyhow::Result<()> {
    let app = App::new(settings)?;
    let service = &app.service;

    // Answer from a complete index rather than an empty one
    let scans = service.subscribe();
    service.run(false);
    match scans.recv() {
        Ok(stats) => info!(entries = stats.total_entries(), "Ready for queries"),
        Err(_) => warn!("Scheduler did not start, answering from an empty index"),
    }
    drop(scans);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        let results = service.search(query);
        match output {
            OutputFormat::Text => {
                println!("> {}", query);
                print_results(&results, output)?;
            }
            OutputFormat::Json => {
                let record = serde_json::json!({ "query": query, "results": results });
                println!("{}", serde_json::to_string(&record)?);
            }
        }
    }

    service.stop();
    Ok(())
}
