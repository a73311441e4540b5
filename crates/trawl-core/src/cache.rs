//! Short-lived memo of recent searches.
//!
//! Two independent FIFO caches keyed by query text:
//!
//! - **candidates**: every entry that scored above zero for a query. A longer
//!   query that extends a cached one only needs to score these.
//! - **results**: the final ranked, truncated list, reused on an exact repeat.
//!
//! Each holds at most [`KEEP_MAX`] queries. Entries older than the TTL are
//! dropped lazily when looked up; overflow drops the oldest insertion no
//! matter how fresh it is. A zero TTL disables caching altogether.

use crate::types::{PathEntry, ScoredResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Maximum number of queries kept per cache
pub const KEEP_MAX: usize = 4;

struct Slot<V> {
    values: Arc<[V]>,
    touched: Instant,
}

/// A bounded FIFO cache of value lists with lazy TTL expiry.
pub struct QueryCache<V> {
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
    slots: HashMap<String, Slot<V>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        QueryCache {
            order: VecDeque::with_capacity(KEEP_MAX + 1),
            slots: HashMap::with_capacity(KEEP_MAX + 1),
        }
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up `query`.
    ///
    /// An exact lookup only matches the literal key. Otherwise the key itself
    /// is tried first, then the longest cached key that `query` starts with
    /// and that holds at least one value.
    pub fn get(&mut self, query: &str, exact: bool, ttl: Duration) -> Option<Arc<[V]>> {
        self.get_at(query, exact, ttl, Instant::now())
    }

    fn get_at(
        &mut self,
        query: &str,
        exact: bool,
        ttl: Duration,
        now: Instant,
    ) -> Option<Arc<[V]>> {
        if self.slots.contains_key(query) {
            return self.touch(query, ttl, now);
        }
        if exact {
            return None;
        }

        let mut prefixes: Vec<String> = self
            .order
            .iter()
            .filter(|key| query.starts_with(key.as_str()))
            .cloned()
            .collect();
        // Stable, so equal lengths keep insertion order
        prefixes.sort_by_key(|key| std::cmp::Reverse(key.len()));

        for key in prefixes {
            if let Some(values) = self.touch(&key, ttl, now) {
                if !values.is_empty() {
                    return Some(values);
                }
            }
        }
        None
    }

    /// Refresh and return `key`, or evict it if it has expired.
    fn touch(&mut self, key: &str, ttl: Duration, now: Instant) -> Option<Arc<[V]>> {
        let slot = self.slots.get_mut(key)?;
        if now.saturating_duration_since(slot.touched) > ttl {
            self.remove(key);
            return None;
        }
        slot.touched = now;
        Some(Arc::clone(&slot.values))
    }

    /// Store `values` under `query`.
    ///
    /// With a zero TTL the cache is cleared and nothing is stored.
    pub fn add(&mut self, query: &str, values: impl Into<Arc<[V]>>, ttl: Duration) {
        self.add_at(query, values.into(), ttl, Instant::now());
    }

    fn add_at(&mut self, query: &str, values: Arc<[V]>, ttl: Duration, now: Instant) {
        if ttl.is_zero() {
            self.clear();
            return;
        }

        if self.slots.contains_key(query) {
            self.remove(query);
        }
        self.order.push_back(query.to_string());
        self.slots.insert(
            query.to_string(),
            Slot {
                values,
                touched: now,
            },
        );

        while self.order.len() > KEEP_MAX {
            if let Some(oldest) = self.order.pop_front() {
                self.slots.remove(&oldest);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        self.slots.remove(key);
        self.order.retain(|k| k != key);
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
    }
}

/// The pair of caches consulted by a search.
pub struct ResultCache {
    candidates: QueryCache<Arc<PathEntry>>,
    results: QueryCache<ScoredResult>,
    ttl: Duration,
}

impl ResultCache {
    /// Create an empty cache with the given time to live.
    pub fn new(ttl: Duration) -> Self {
        ResultCache {
            candidates: QueryCache::new(),
            results: QueryCache::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Change the time to live; a zero TTL also drops everything cached.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
        if ttl.is_zero() {
            self.clear();
        }
    }

    /// Final results previously produced for exactly `query`.
    pub fn get_results(&mut self, query: &str) -> Option<Arc<[ScoredResult]>> {
        self.results.get(query, true, self.ttl)
    }

    /// Candidates computed for `query` or the longest cached prefix of it.
    pub fn get_candidates(&mut self, query: &str) -> Option<Arc<[Arc<PathEntry>]>> {
        self.candidates.get(query, false, self.ttl)
    }

    pub fn add_results(&mut self, query: &str, results: Vec<ScoredResult>) {
        self.results.add(query, results, self.ttl);
    }

    pub fn add_candidates(&mut self, query: &str, candidates: Vec<Arc<PathEntry>>) {
        self.candidates.add(query, candidates, self.ttl);
    }

    /// Drop both caches.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.results.clear();
    }

    /// Number of cached queries as `(candidates, results)`
    pub fn len(&self) -> (usize, usize) {
        (self.candidates.len(), self.results.len())
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("candidates", &self.candidates.len())
            .field("results", &self.results.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn values(items: &[u32]) -> Arc<[u32]> {
        items.to_vec().into()
    }

    #[test]
    fn test_exact_lookup() {
        let mut cache = QueryCache::new();
        cache.add("some", values(&[1, 2]), TTL);

        assert_eq!(cache.get("some", true, TTL).as_deref(), Some(&[1, 2][..]));
        assert!(cache.get("some_", true, TTL).is_none());
        assert!(cache.get("so", true, TTL).is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut cache = QueryCache::new();
        cache.add("so", values(&[1, 2, 3]), TTL);
        cache.add("some", values(&[1, 2]), TTL);
        cache.add("other", values(&[9]), TTL);

        assert_eq!(cache.get("some_file", false, TTL).as_deref(), Some(&[1, 2][..]));
        assert_eq!(cache.get("sol", false, TTL).as_deref(), Some(&[1, 2, 3][..]));
        assert!(cache.get("xyz", false, TTL).is_none());
    }

    #[test]
    fn test_prefix_lookup_skips_empty_values() {
        let mut cache = QueryCache::new();
        cache.add("so", values(&[1]), TTL);
        cache.add("som", values(&[]), TTL);

        assert_eq!(cache.get("somewhere", false, TTL).as_deref(), Some(&[1][..]));
        // The literal key is returned even when empty
        assert_eq!(cache.get("som", false, TTL).as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut cache = QueryCache::new();
        for (i, key) in ["aa", "bb", "cc", "dd", "ee"].iter().enumerate() {
            cache.add(key, values(&[i as u32]), TTL);
        }

        assert_eq!(cache.len(), KEEP_MAX);
        assert!(cache.get("aa", true, TTL).is_none());
        assert!(cache.get("ee", true, TTL).is_some());
    }

    #[test]
    fn test_reading_does_not_protect_from_fifo_eviction() {
        let mut cache = QueryCache::new();
        cache.add("first", values(&[1]), TTL);
        for key in ["b", "c", "d"] {
            cache.add(key, values(&[2]), TTL);
        }
        assert!(cache.get("first", true, TTL).is_some());
        cache.add("e", values(&[3]), TTL);
        assert!(cache.get("first", true, TTL).is_none());
    }

    #[test]
    fn test_ttl_expiry_on_read() {
        let ttl = Duration::from_secs(10);
        let start = Instant::now();
        let mut cache = QueryCache::new();
        cache.add_at("query", values(&[1]), ttl, start);

        assert!(cache.get_at("query", true, ttl, start + Duration::from_secs(5)).is_some());
        // The read refreshed the timestamp
        assert!(cache.get_at("query", true, ttl, start + Duration::from_secs(14)).is_some());
        assert!(cache.get_at("query", true, ttl, start + Duration::from_secs(25)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let mut cache = QueryCache::new();
        cache.add("keep", values(&[1]), TTL);
        cache.add("drop", values(&[2]), Duration::ZERO);

        assert!(cache.is_empty());
    }

    #[test]
    fn test_result_cache_clear() {
        let mut cache = ResultCache::new(TTL);
        let entry = Arc::new(PathEntry::new("/srv/file", None, false));
        cache.add_candidates("fil", vec![entry.clone()]);
        cache.add_results("fil", vec![entry.to_result(0.8)]);
        assert_eq!(cache.len(), (1, 1));
        assert!(cache.get_candidates("file").is_some());

        cache.clear();
        assert_eq!(cache.len(), (0, 0));
        assert!(cache.get_results("fil").is_none());
    }

    #[test]
    fn test_result_cache_zero_ttl() {
        let mut cache = ResultCache::new(TTL);
        cache.add_results("fil", Vec::new());
        cache.set_ttl(Duration::ZERO);
        assert_eq!(cache.len(), (0, 0));

        cache.add_results("fil", Vec::new());
        assert!(cache.get_results("fil").is_none());
    }
}
