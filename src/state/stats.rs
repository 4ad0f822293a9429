//! Crawl statistics

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Counters describing crawl progress
///
/// `pages_per_depth` is cumulative across resumed runs; every other counter
/// describes the current run only and is reset when a run starts from cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Anchors with an href seen on fetched pages, before scope filtering
    pub links_extracted: u64,

    /// Unique URLs admitted to the frontier
    pub links_admitted: u64,

    pub http_errors: u64,

    pub transport_errors: u64,

    pub non_html_pages: u64,

    /// HTML pages whose markup could not be extracted
    pub parse_errors: u64,

    /// Number of recorded pages at each depth
    pub pages_per_depth: BTreeMap<u32, u64>,

    /// Whether the current state was restored from a cache file
    pub loaded_from_cache: bool,

    /// Cache file backing this crawl
    pub cache_path: Option<PathBuf>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a newly recorded page
    pub fn record_page(&mut self, depth: u32) {
        *self.pages_per_depth.entry(depth).or_insert(0) += 1;
    }

    /// Moves a page between depth buckets after its path was shortened
    pub fn move_page(&mut self, from_depth: u32, to_depth: u32) {
        if let Some(count) = self.pages_per_depth.get_mut(&from_depth) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.pages_per_depth.remove(&from_depth);
            }
        }
        self.record_page(to_depth);
    }

    /// Zeroes the counters that only describe a single run
    pub fn reset_session(&mut self) {
        self.links_extracted = 0;
        self.links_admitted = 0;
        self.http_errors = 0;
        self.transport_errors = 0;
        self.non_html_pages = 0;
        self.parse_errors = 0;
    }

    /// Adopts statistics loaded from a cache: cumulative counters are kept,
    /// per-run counters start from zero
    pub fn merge_loaded(loaded: CrawlStats, cache_path: PathBuf) -> Self {
        let mut stats = loaded;
        stats.reset_session();
        stats.loaded_from_cache = true;
        stats.cache_path = Some(cache_path);
        stats
    }

    /// Total pages counted in the depth histogram
    pub fn total_pages(&self) -> u64 {
        self.pages_per_depth.values().sum()
    }
}
