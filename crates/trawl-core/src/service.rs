//! Long-lived search service with periodic rescans.
//!
//! `FileService` owns the index and a background worker that rescans it on
//! a timer. Each start of the scheduler bumps a generation counter and hands
//! the new worker its generation; a worker that finds the counter moved on
//! exits without scanning. Dropping the previous wake sender interrupts that
//! worker's wait, so reconfiguration supersedes it right away instead of at
//! its next tick.

use crate::config::{
    cache_ttl_for, parse_bool_flag, parse_directories, parse_icon_theme, parse_ignore_filename,
    parse_scan_every_minutes, parse_search_after_characters, parse_search_max_results,
    parse_search_threshold, Settings,
};
use crate::index::{Index, IndexSettings};
use crate::types::{ScanRoot, ScanStats, ScoredResult};
use crossbeam_channel::{at, bounded, never, select, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

struct SchedulerState {
    settings: Settings,
    running: bool,
    generation: u64,
    /// Dropping this wakes the current worker
    wake: Option<Sender<()>>,
    /// Notified after every scheduled scan
    listeners: Vec<Sender<ScanStats>>,
}

/// The search service handed to hosts.
pub struct FileService {
    index: Arc<Index>,
    state: Arc<Mutex<SchedulerState>>,
}

impl Default for FileService {
    fn default() -> Self {
        Self::new()
    }
}

impl FileService {
    /// Create a stopped service with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a stopped service configured with `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        let index = Index::with_settings(index_settings(&settings));
        index.set_cache_ttl(settings.cache_ttl());

        FileService {
            index: Arc::new(index),
            state: Arc::new(Mutex::new(SchedulerState {
                settings,
                running: false,
                generation: 0,
                wake: None,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn index(&self) -> &Arc<Index> {
        &self.index
    }

    /// Snapshot of the effective settings
    pub fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Number of times the scheduler has been (re)started
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Start the scheduler.
    ///
    /// Does nothing if it is already running, unless `force` is set, in which
    /// case the current worker is superseded. The first scan starts
    /// immediately on the worker thread.
    pub fn run(&self, force: bool) {
        let mut state = self.state.lock();
        if state.running && !force {
            return;
        }

        state.running = true;
        state.generation += 1;
        let generation = state.generation;

        let (wake_tx, wake_rx) = bounded(0);
        state.wake = Some(wake_tx);
        drop(state);

        let index = Arc::clone(&self.index);
        let shared = Arc::clone(&self.state);
        let spawned = thread::Builder::new()
            .name(format!("trawl-scan-{}", generation))
            .spawn(move || scan_loop(index, shared, generation, wake_rx));

        if let Err(e) = spawned {
            warn!(error = %e, "Failed to start scan scheduler");
            let mut state = self.state.lock();
            if state.generation == generation {
                state.running = false;
                state.wake = None;
                // No scan is coming, disconnect anyone waiting for one
                state.listeners.clear();
            }
        }
    }

    /// Receive the stats of every scan the scheduler completes from now on.
    pub fn subscribe(&self) -> Receiver<ScanStats> {
        let (tx, rx) = unbounded();
        self.state.lock().listeners.push(tx);
        rx
    }

    /// Stop the scheduler. A scan in progress runs to completion.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if state.running {
            debug!(generation = state.generation, "Stopping scan scheduler");
        }
        state.running = false;
        state.wake = None;
    }

    /// Apply a whole settings set and restart the scheduler.
    pub fn apply(&self, settings: Settings) {
        let ttl = settings.cache_ttl();
        self.index.set_roots(settings.directories.clone());
        self.index.set_ignore_filename(settings.ignore_filename.clone());
        self.index.set_search_after_characters(settings.search_after_characters);
        self.index.set_search_max_results(settings.search_max_results);
        self.index.set_search_threshold(settings.search_threshold);
        self.index.set_cache_ttl(ttl);

        settings.log_summary();
        self.state.lock().settings = settings;
        self.run(true);
    }

    /// Set the rescan interval from raw input and reschedule.
    pub fn set_scan_every_minutes(&self, raw: &str) -> f64 {
        let minutes = parse_scan_every_minutes(raw);
        info!(scan_every_minutes = minutes, "Updating scan interval");
        self.state.lock().settings.scan_every_minutes = minutes;
        self.index.set_cache_ttl(cache_ttl_for(minutes));
        self.run(true);
        minutes
    }

    /// Set the scan roots from newline-separated `path[=depth]` input and
    /// reschedule.
    pub fn set_directories(&self, raw: &str) -> Vec<ScanRoot> {
        let roots = parse_directories(raw);
        let dirs_display: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
        info!(directories = ?dirs_display, "Updating directories");
        self.state.lock().settings.directories = roots.clone();
        self.index.set_roots(roots.clone());
        self.run(true);
        roots
    }

    pub fn set_search_after_characters(&self, raw: &str) -> i64 {
        let value = parse_search_after_characters(raw);
        info!(search_after_characters = value, "Updating search after characters");
        self.state.lock().settings.search_after_characters = value;
        self.index.set_search_after_characters(value);
        value
    }

    pub fn set_search_max_results(&self, raw: &str) -> usize {
        let value = parse_search_max_results(raw);
        info!(search_max_results = value, "Updating search max results");
        self.state.lock().settings.search_max_results = value;
        self.index.set_search_max_results(value);
        value
    }

    pub fn set_search_threshold(&self, raw: &str) -> f64 {
        let value = parse_search_threshold(raw);
        info!(search_threshold = value, "Updating search threshold");
        self.state.lock().settings.search_threshold = value;
        self.index.set_search_threshold(value);
        value
    }

    /// Set the ignore filename (blank selects the default) and reschedule.
    pub fn set_ignore_filename(&self, raw: &str) -> Option<String> {
        let value = parse_ignore_filename(raw);
        info!(ignore_filename = value.as_deref().unwrap_or("<none>"), "Updating ignore filename");
        self.state.lock().settings.ignore_filename = value.clone();
        self.index.set_ignore_filename(value.clone());
        self.run(true);
        value
    }

    pub fn set_icon_theme(&self, raw: &str) -> String {
        let value = parse_icon_theme(raw);
        info!(icon_theme = %value, "Updating icon theme");
        self.state.lock().settings.icon_theme = value.clone();
        value
    }

    pub fn set_use_built_in_folder_theme(&self, raw: &str) -> bool {
        let value = parse_bool_flag(raw);
        info!(use_built_in_folder_theme = value, "Updating folder theme flag");
        self.state.lock().settings.use_built_in_folder_theme = value;
        value
    }

    pub fn search(&self, query: &str) -> Vec<ScoredResult> {
        self.index.search(query)
    }

    /// Scan synchronously on the calling thread.
    pub fn scan(&self) -> ScanStats {
        self.index.scan()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.index.contains(path)
    }
}

impl Drop for FileService {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("FileService")
            .field("index", &self.index)
            .field("running", &state.running)
            .field("generation", &state.generation)
            .finish()
    }
}

fn index_settings(settings: &Settings) -> IndexSettings {
    IndexSettings {
        roots: settings.directories.clone(),
        ignore_filename: settings.ignore_filename.clone(),
        search_after_characters: settings.search_after_characters,
        search_max_results: settings.search_max_results,
        search_threshold: settings.search_threshold,
    }
}

/// Body of one scheduler worker.
fn scan_loop(
    index: Arc<Index>,
    state: Arc<Mutex<SchedulerState>>,
    generation: u64,
    wake: Receiver<()>,
) {
    loop {
        let minutes = {
            let state = state.lock();
            if state.generation != generation || !state.running {
                debug!(generation, "Scheduler superseded or stopped");
                return;
            }
            state.settings.scan_every_minutes
        };

        let stats = index.scan();
        state
            .lock()
            .listeners
            .retain(|listener| listener.send(stats.clone()).is_ok());

        let interval = cache_ttl_for(minutes);
        if interval.is_zero() {
            // Periodic rescans are disabled
            let mut state = state.lock();
            if state.generation == generation {
                state.running = false;
                state.wake = None;
            }
            return;
        }

        debug!(generation, next_in_secs = interval.as_secs(), "Next scan scheduled");
        let timer = match Instant::now().checked_add(interval) {
            Some(deadline) => at(deadline),
            None => never(),
        };
        select! {
            recv(wake) -> _ => {}
            recv(timer) -> _ => {}
        }
    }
}
