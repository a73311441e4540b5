//! In-memory index of the configured directory trees.
//!
//! The `Index` owns the current entry set and answers ranked searches over
//! it. It supports:
//!
//! - Full rescans that replace the entry set in one step
//! - Ranked fuzzy search with a prefix-narrowing result cache
//! - Parallel scoring via Rayon for large candidate sets
//!
//! ## Concurrency
//!
//! The entry set sits behind a read/write lock. A scan walks the filesystem
//! without holding it and only takes the write side to swap in the new set and
//! clear the cache, so searches keep running against the previous set while a
//! scan is in progress and never see a partial one. Scans are serialized by a
//! separate mutex.

use crate::cache::ResultCache;
use crate::matcher::IgnoreRules;
use crate::scan::{LoggingProgress, ScanProgress, Walker};
use crate::score::Query;
use crate::types::{PathEntry, ScanRoot, ScanStats, ScoredResult};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Candidate count above which scoring runs in parallel
const PARALLEL_THRESHOLD: usize = 10_000;

/// Search and scan parameters held by the index.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    /// Scan roots, deepest first
    pub roots: Vec<ScanRoot>,

    /// Name of the per-directory ignore file (None = no filtering)
    pub ignore_filename: Option<String>,

    /// Queries this short or shorter return nothing (<= 0 disables)
    pub search_after_characters: i64,

    /// Maximum number of results returned
    pub search_max_results: usize,

    /// Results scoring below this are dropped
    pub search_threshold: f64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        IndexSettings {
            roots: Vec::new(),
            ignore_filename: None,
            search_after_characters: 2,
            search_max_results: 5,
            search_threshold: 0.5,
        }
    }
}

/// One immutable generation of indexed entries.
#[derive(Default)]
struct EntrySet {
    entries: Vec<Arc<PathEntry>>,
    by_path: HashMap<PathBuf, Arc<PathEntry>>,
}

impl EntrySet {
    fn new(by_path: HashMap<PathBuf, Arc<PathEntry>>) -> Self {
        let entries = by_path.values().cloned().collect();
        EntrySet { entries, by_path }
    }
}

/// The file index.
///
/// ## Example
///
/// ```rust,no_run
/// use trawl_core::{Index, ScanRoot};
///
/// let index = Index::new();
/// index.set_roots(vec![ScanRoot::unlimited("/home/user")]);
/// index.scan();
///
/// for result in index.search("report") {
///     println!("{:.3} {}", result.score, result.path.display());
/// }
/// ```
pub struct Index {
    settings: RwLock<IndexSettings>,

    /// Current entry set, swapped wholesale by each scan
    entries: RwLock<Arc<EntrySet>>,

    /// Memo of recent searches
    cache: Mutex<ResultCache>,

    /// Counters from the last scan
    stats: RwLock<ScanStats>,

    /// Serializes scans
    scan_lock: Mutex<()>,

    /// Number of completed scans
    generation: AtomicU64,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Default result cache lifetime, matching the default rescan interval
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

    /// Create a new empty index with default settings.
    pub fn new() -> Self {
        Self::with_settings(IndexSettings::default())
    }

    /// Create an empty index with the given settings.
    pub fn with_settings(mut settings: IndexSettings) -> Self {
        sort_roots(&mut settings.roots);
        Index {
            settings: RwLock::new(settings),
            entries: RwLock::new(Arc::new(EntrySet::default())),
            cache: Mutex::new(ResultCache::new(Self::DEFAULT_CACHE_TTL)),
            stats: RwLock::new(ScanStats::default()),
            scan_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> IndexSettings {
        self.settings.read().clone()
    }

    /// Replace the scan roots. They are reordered deepest first so nested
    /// roots are walked before the roots containing them.
    pub fn set_roots(&self, mut roots: Vec<ScanRoot>) {
        sort_roots(&mut roots);
        self.settings.write().roots = roots;
    }

    pub fn set_ignore_filename(&self, ignore_filename: Option<String>) {
        self.settings.write().ignore_filename = ignore_filename;
    }

    pub fn set_search_after_characters(&self, search_after_characters: i64) {
        self.settings.write().search_after_characters = search_after_characters;
    }

    pub fn set_search_max_results(&self, search_max_results: usize) {
        self.settings.write().search_max_results = search_max_results;
    }

    pub fn set_search_threshold(&self, search_threshold: f64) {
        self.settings.write().search_threshold = search_threshold;
    }

    /// Set the result cache lifetime; zero disables caching.
    pub fn set_cache_ttl(&self, ttl: Duration) {
        self.cache.lock().set_ttl(ttl);
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.lock().ttl()
    }

    /// Get the number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.read().entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().entries.is_empty()
    }

    /// Returns true if `path` is currently indexed.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.read().by_path.contains_key(path.as_ref())
    }

    /// All indexed paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries.read().by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Counters from the most recent scan.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Number of completed scans.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Rebuild the entry set from the configured roots.
    pub fn scan(&self) -> ScanStats {
        self.scan_with_progress(None)
    }

    /// Rebuild the entry set, reporting progress as the walk goes.
    ///
    /// Unreadable paths are skipped. The new set replaces the old one and the
    /// result cache is cleared in the same critical section.
    #[instrument(skip(self, progress))]
    pub fn scan_with_progress(&self, progress: Option<&dyn ScanProgress>) -> ScanStats {
        let _scan = self.scan_lock.lock();

        let (roots, rules) = {
            let settings = self.settings.read();
            (
                settings.roots.clone(),
                IgnoreRules::new(settings.ignore_filename.clone()),
            )
        };

        info!(
            roots = roots.len(),
            ignore_filename = rules.filename().unwrap_or("<none>"),
            "Scanning folders"
        );
        let start = Instant::now();

        let output = Walker::new(&rules, progress).walk(&roots);
        let entry_set = Arc::new(EntrySet::new(output.entries));

        {
            let mut entries = self.entries.write();
            *entries = entry_set;
            self.cache.lock().clear();
        }

        let elapsed = start.elapsed();
        let stats = ScanStats {
            directories: output.directories,
            files: output.files,
            elapsed,
            finished_at: Some(chrono::Utc::now()),
        };
        *self.stats.write() = stats.clone();
        self.generation.fetch_add(1, Ordering::Release);

        match progress {
            Some(progress) => progress.on_complete(stats.directories, stats.files, elapsed),
            None => LoggingProgress.on_complete(stats.directories, stats.files, elapsed),
        }

        stats
    }

    /// Search the index.
    ///
    /// Returns at most `search_max_results` hits scoring at least
    /// `search_threshold`, best first. Ties go to the entry closer to its
    /// scan root.
    pub fn search(&self, query: &str) -> Vec<ScoredResult> {
        let key = query.trim();
        let (after_characters, max_results, threshold) = {
            let settings = self.settings.read();
            (
                settings.search_after_characters,
                settings.search_max_results,
                settings.search_threshold,
            )
        };

        if after_characters > 0 && key.chars().count() as i64 <= after_characters {
            return Vec::new();
        }

        let entries = self.entries.read();
        let start = Instant::now();
        let query = Query::new(key);

        let cached = {
            let mut cache = self.cache.lock();
            if let Some(results) = cache.get_results(key) {
                debug!(query = %key, "Returning previous results");
                return results.to_vec();
            }
            if query.is_glob() {
                None
            } else {
                cache.get_candidates(key)
            }
        };

        let candidates = match &cached {
            Some(candidates) => {
                debug!(
                    query = %key,
                    candidates = candidates.len(),
                    "Searching from previous entries"
                );
                evaluate_entries(&query, candidates)
            }
            None => evaluate_entries(&query, &entries.entries),
        };

        let mut scored: Vec<(Arc<PathEntry>, f64)> = candidates
            .iter()
            .filter_map(|(entry, score)| score.map(|s| (Arc::clone(entry), s)))
            .collect();
        rank(&mut scored);
        let results: Vec<ScoredResult> = scored
            .iter()
            .take_while(|(_, score)| *score >= threshold)
            .take(max_results)
            .map(|(entry, score)| entry.to_result(*score))
            .collect();

        {
            let mut cache = self.cache.lock();
            cache.add_candidates(key, candidates.into_iter().map(|(entry, _)| entry).collect());
            cache.add_results(key, results.clone());
        }

        debug!(
            query = %key,
            results = results.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Search complete"
        );
        results
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("entry_count", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

fn sort_roots(roots: &mut [ScanRoot]) {
    roots.sort_by_key(|root| {
        std::cmp::Reverse(
            root.path
                .components()
                .filter(|c| matches!(c, std::path::Component::Normal(_)))
                .count(),
        )
    });
}

/// Evaluate every candidate against `query`.
///
/// Keeps each entry that scored and each entry containing the query text.
/// The latter can still match a longer query, so they are recorded as its
/// candidates even though they are never returned for this one.
fn evaluate_entries(
    query: &Query,
    candidates: &[Arc<PathEntry>],
) -> Vec<(Arc<PathEntry>, Option<f64>)> {
    let evaluate = |entry: &Arc<PathEntry>| {
        let score = query.score(entry);
        (score.is_some() || query.contains_text(entry)).then(|| (Arc::clone(entry), score))
    };

    if candidates.len() > PARALLEL_THRESHOLD {
        candidates.par_iter().filter_map(evaluate).collect()
    } else {
        candidates.iter().filter_map(evaluate).collect()
    }
}

/// Order by score, then by shallower relative depth, then by path.
fn rank(scored: &mut [(Arc<PathEntry>, f64)]) {
    scored.sort_by(|(a, a_score), (b, b_score)| {
        b_score
            .total_cmp(a_score)
            .then_with(|| a.relative_depth().cmp(&b.relative_depth()))
            .then_with(|| a.path().cmp(b.path()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const IGNORE: &str = ".trawlignore";
    const CUSTOM_IGNORE: &str = ".customignore";

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    /// Builds the tree used throughout these tests.
    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        touch(&root.join(IGNORE), ".hidden_directory/\n.git/\n");
        touch(
            &root.join(CUSTOM_IGNORE),
            ".trawlignore\n.customignore\nsome_other_file.pdf\ntwo_level_dir/\n",
        );
        touch(&root.join("root_file.mp3"), "");
        touch(&root.join("Downloads").join(IGNORE), "some_file.png\n");
        touch(&root.join("Downloads").join(CUSTOM_IGNORE), "");
        touch(&root.join("Downloads/some_file.png"), "");
        touch(&root.join("Downloads/some_other_file.pdf"), "");
        touch(&root.join("Downloads/two_level_dir/another_file.zip"), "");
        touch(
            &root.join("Downloads/two_level_dir/three_level_dir/three_level_file"),
            "",
        );
        touch(&root.join("Projects/my_project/.git/HEAD"), "");
        touch(&root.join("Projects/my_project/project_file.py"), "");
        touch(&root.join(".hidden_directory/file_in_hidden_directory"), "");

        temp
    }

    fn index_for(root: &Path, depth: i64, ignore: Option<&str>) -> Index {
        let index = Index::with_settings(IndexSettings {
            roots: vec![ScanRoot::new(root, depth)],
            ignore_filename: ignore.map(str::to_string),
            ..IndexSettings::default()
        });
        index.scan();
        index
    }

    #[test]
    fn test_scan_with_ignore_file() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, Some(IGNORE));

        assert!(index.contains(root.join("root_file.mp3")));
        assert!(index.contains(root.join(IGNORE)));
        assert!(index.contains(root.join(CUSTOM_IGNORE)));
        assert!(index.contains(root.join("Downloads")));
        assert!(index.contains(root.join("Projects")));

        assert!(index.contains(root.join("Downloads").join(IGNORE)));
        assert!(!index.contains(root.join("Downloads/some_file.png")));
        assert!(index.contains(root.join("Downloads/some_other_file.pdf")));

        assert!(index.contains(root.join("Downloads/two_level_dir")));
        assert!(index.contains(root.join("Downloads/two_level_dir/three_level_dir")));
        assert!(index.contains(root.join("Downloads/two_level_dir/another_file.zip")));
        assert!(index.contains(
            root.join("Downloads/two_level_dir/three_level_dir/three_level_file")
        ));

        assert!(index.contains(root.join("Projects/my_project")));
        assert!(!index.contains(root.join("Projects/my_project/.git")));
        assert!(index.contains(root.join("Projects/my_project/project_file.py")));

        assert!(!index.contains(root.join(".hidden_directory")));
        assert!(!index.contains(root.join(".hidden_directory/file_in_hidden_directory")));
    }

    #[test]
    fn test_scan_with_custom_ignore_file() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, Some(CUSTOM_IGNORE));

        assert!(index.contains(root.join("root_file.mp3")));
        assert!(!index.contains(root.join(IGNORE)));
        assert!(!index.contains(root.join(CUSTOM_IGNORE)));

        assert!(index.contains(root.join("Downloads")));
        assert!(!index.contains(root.join("Downloads").join(IGNORE)));
        assert!(!index.contains(root.join("Downloads").join(CUSTOM_IGNORE)));
        assert!(index.contains(root.join("Downloads/some_file.png")));
        assert!(!index.contains(root.join("Downloads/some_other_file.pdf")));

        assert!(!index.contains(root.join("Downloads/two_level_dir")));
        assert!(!index.contains(root.join("Downloads/two_level_dir/three_level_dir")));
        assert!(!index.contains(root.join("Downloads/two_level_dir/another_file.zip")));

        assert!(index.contains(root.join("Projects/my_project")));
        assert!(index.contains(root.join("Projects/my_project/.git")));
        assert!(index.contains(root.join("Projects/my_project/project_file.py")));

        assert!(index.contains(root.join(".hidden_directory")));
        assert!(index.contains(root.join(".hidden_directory/file_in_hidden_directory")));
    }

    #[test]
    fn test_ignore_inheritance_and_reinclusion() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join(IGNORE), "*.log\n");
        touch(&root.join("a/b/debug.log"), "");
        touch(&root.join("keep/keep.log"), "");
        touch(&root.join("keep").join(IGNORE), "!keep.log\n");

        let index = index_for(root, 0, Some(IGNORE));

        assert!(!index.contains(root.join("a/b/debug.log")));
        assert!(index.contains(root.join("a/b")));
        assert!(index.contains(root.join("keep/keep.log")));
    }

    #[test]
    fn test_scan_depth_1() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 1, None);

        assert!(index.contains(root.join("Downloads")));
        assert!(!index.contains(root.join("Downloads").join(IGNORE)));
        assert!(!index.contains(root.join("Downloads/some_file.png")));
        assert!(!index.contains(root.join("Downloads/some_other_file.pdf")));
        assert!(!index.contains(root.join("Downloads/two_level_dir")));
        assert!(!index.contains(root.join("Projects/my_project")));
        assert!(!index.contains(root.join("Projects/my_project/project_file.py")));

        let root_depth = root.components().count();
        for path in index.paths() {
            assert!(path.components().count() <= root_depth + 1, "{}", path.display());
        }
    }

    #[test]
    fn test_scan_depth_2() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 2, None);

        assert!(index.contains(root.join("Downloads/two_level_dir")));
        assert!(!index.contains(root.join("Downloads/two_level_dir/another_file.zip")));
        assert!(!index.contains(root.join("Downloads/two_level_dir/three_level_dir")));

        assert!(index.contains(root.join("Projects/my_project")));
        assert!(!index.contains(root.join("Projects/my_project/.git")));
        assert!(!index.contains(root.join("Projects/my_project/project_file.py")));
    }

    #[test]
    fn test_scan_depth_3() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 3, None);

        assert!(index.contains(root.join("Downloads/two_level_dir")));
        assert!(index.contains(root.join("Downloads/two_level_dir/another_file.zip")));
        assert!(index.contains(root.join("Downloads/two_level_dir/three_level_dir")));
        assert!(!index.contains(
            root.join("Downloads/two_level_dir/three_level_dir/three_level_file")
        ));

        assert!(index.contains(root.join("Projects/my_project")));
        assert!(index.contains(root.join("Projects/my_project/.git")));
        assert!(index.contains(root.join("Projects/my_project/project_file.py")));
    }

    #[test]
    fn test_scan_unlimited_depth_reaches_deep_entries() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, None);

        assert!(index.contains(
            root.join("Downloads/two_level_dir/three_level_dir/three_level_file")
        ));
        assert!(index.contains(root.join("Projects/my_project/.git/HEAD")));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let temp = fixture();
        let index = index_for(temp.path(), 0, Some(IGNORE));
        let first = index.paths();
        index.scan();
        assert_eq!(first, index.paths());
        assert_eq!(index.generation(), 2);
    }

    #[test]
    fn test_nested_roots_are_walked_deepest_first() {
        let temp = fixture();
        let root = temp.path();
        let index = Index::new();
        index.set_roots(vec![
            ScanRoot::unlimited(root),
            ScanRoot::new(root.join("Downloads"), 1),
        ]);
        assert_eq!(index.settings().roots[0].path, root.join("Downloads"));

        index.scan();
        assert!(index.contains(root.join("Downloads/two_level_dir")));
        assert!(!index.contains(root.join("Downloads/two_level_dir/another_file.zip")));
        assert!(index.contains(root.join("Projects/my_project/project_file.py")));
    }

    #[test]
    fn test_search() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, None);

        let results = index.search("some");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, root.join("Downloads/some_file.png"));
        assert!(!results[0].is_directory);
        assert_eq!(results[1].path, root.join("Downloads/some_other_file.pdf"));
        assert!(!results[1].is_directory);

        let results = index.search("file_in");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, root.join(".hidden_directory/file_in_hidden_directory"));
        assert!(!results[0].is_directory);

        let results = index.search("_level_dir");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, root.join("Downloads/two_level_dir"));
        assert!(results[0].is_directory);
        assert_eq!(results[1].path, root.join("Downloads/two_level_dir/three_level_dir"));
        assert!(results[1].is_directory);
    }

    #[test]
    fn test_search_excluded_directory_returns_nothing() {
        let temp = fixture();
        let index = index_for(temp.path(), 0, Some(IGNORE));
        assert!(index.search("file_in_hidden").is_empty());
    }

    #[test]
    fn test_search_guard() {
        let temp = fixture();
        let index = index_for(temp.path(), 0, None);

        assert!(index.search("so").is_empty());
        assert!(index.search("  so  ").is_empty());

        index.set_search_after_characters(0);
        index.set_search_threshold(0.0);
        assert!(!index.search("so").is_empty());
    }

    #[test]
    fn test_search_bounds() {
        let temp = fixture();
        let index = index_for(temp.path(), 0, None);

        index.set_search_max_results(1);
        let results = index.search("some");
        assert_eq!(results.len(), 1);

        index.set_search_max_results(10);
        index.set_search_threshold(0.75);
        let results = index.search("file");
        assert!(results.iter().all(|r| r.score >= 0.75));
        assert!(results.len() <= 10);
    }

    #[test]
    fn test_glob_query_ranks_exact_names_first() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, None);

        let results = index.search("*.pdf");
        assert_eq!(results[0].path, root.join("Downloads/some_other_file.pdf"));
        assert!(results[0].score > 0.9);
    }

    #[test]
    fn test_prefix_candidates_are_subsets() {
        let temp = fixture();
        let index = index_for(temp.path(), 0, None);

        index.search("fil");
        index.search("file");
        index.search("file_");

        let mut cache = index.cache.lock();
        let short: Vec<PathBuf> = cache
            .get_candidates("fil")
            .unwrap()
            .iter()
            .map(|e| e.path().to_path_buf())
            .collect();
        let long = cache.get_candidates("file_").unwrap();
        assert!(!long.is_empty());
        assert!(long.iter().all(|e| short.contains(&e.path().to_path_buf())));
    }

    #[test]
    fn test_narrowed_search_matches_full_search() {
        let temp = fixture();
        let narrowed = index_for(temp.path(), 0, None);
        narrowed.search("lev");
        let from_cache = narrowed.search("level_d");

        let fresh = index_for(temp.path(), 0, None);
        assert_eq!(from_cache, fresh.search("level_d"));
    }

    #[test]
    fn test_narrowing_keeps_entries_with_unscored_prefix() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("xxxxabcdef"), "");
        touch(&root.join("abc_other"), "");

        let narrowed = index_for(root, 0, None);
        assert_eq!(narrowed.search("abc").len(), 1);
        let from_cache = narrowed.search("abcdef");

        let fresh = index_for(root, 0, None);
        let expected = fresh.search("abcdef");
        assert_eq!(expected.len(), 1);
        assert_eq!(expected[0].path, root.join("xxxxabcdef"));
        assert_eq!(from_cache, expected);
    }

    #[test]
    fn test_narrowing_across_separator() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("docs/report.txt"), "");

        let narrowed = index_for(root, 0, None);
        narrowed.search("docs/");
        let from_cache = narrowed.search("docs/rep");

        let fresh = index_for(root, 0, None);
        let expected = fresh.search("docs/rep");
        assert_eq!(expected.len(), 1);
        assert_eq!(expected[0].path, root.join("docs/report.txt"));
        assert_eq!(from_cache, expected);
    }

    #[test]
    fn test_glob_queries_search_every_entry() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("notes.p"), "");
        touch(&root.join("paper.pdf"), "");

        let index = index_for(root, 0, None);
        let results = index.search("*.p");
        assert_eq!(results[0].path, root.join("notes.p"));

        let results = index.search("*.pdf");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, root.join("paper.pdf"));
    }

    #[test]
    fn test_cache_invalidated_by_scan() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, None);

        assert_eq!(index.search("report").len(), 0);
        touch(&root.join("report.txt"), "");
        assert_eq!(index.search("report").len(), 0);

        index.scan();
        let results = index.search("report");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, root.join("report.txt"));
    }

    #[test]
    fn test_cache_disabled_with_zero_ttl() {
        let temp = fixture();
        let root = temp.path();
        let index = index_for(root, 0, None);
        index.set_cache_ttl(Duration::ZERO);

        index.search("report");
        assert_eq!(index.cache.lock().len(), (0, 0));
    }

    #[test]
    fn test_rank_breaks_ties_by_depth() {
        let root = Arc::new(PathEntry::new("/scan", None, true));
        let deep = Arc::new(PathEntry::new("/scan/a/b/c", Some(root.clone()), false));
        let shallow = Arc::new(PathEntry::new("/scan/c", Some(root.clone()), false));
        let best = Arc::new(PathEntry::new("/scan/a/best", Some(root), false));

        let mut scored = vec![(deep.clone(), 0.7), (shallow.clone(), 0.7), (best.clone(), 0.9)];
        rank(&mut scored);

        let order: Vec<&Path> = scored.iter().map(|(e, _)| e.path()).collect();
        assert_eq!(order, vec![best.path(), shallow.path(), deep.path()]);
    }

    #[test]
    fn test_empty_index() {
        let index = Index::new();
        assert!(index.is_empty());
        assert!(index.search("anything").is_empty());
        assert_eq!(index.scan().total_entries(), 0);
    }
}
