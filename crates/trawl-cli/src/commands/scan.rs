//! Scan command - walk the configured directories once.

use crate::app::App;
use trawl_core::{LoggingProgress, Settings};

/// Run the scan command.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    let app = App::new(settings)?;

    println!("Scanning directories...");
    for root in &app.service.settings().directories {
        match root.depth_limit() {
            Some(depth) => println!("  {} (depth {})", root.path.display(), depth),
            None => println!("  {}", root.path.display()),
        }
    }
    println!();

    let stats = app.service.index().scan_with_progress(Some(&LoggingProgress));
    let elapsed = stats.elapsed.as_secs_f64();

    println!("Scan complete!");
    println!("  Files:       {}", stats.files);
    println!("  Directories: {}", stats.directories);
    println!("  Time:        {:.2}s", elapsed);
    if elapsed > 0.0 {
        println!(
            "  Rate:        {:.0} entries/sec",
            stats.total_entries() as f64 / elapsed
        );
    }

    Ok(())
}
