//! Statistics gathered from a crawl session
//!
//! This module provides functionality for summarizing and displaying the
//! state of a crawl session.

use crate::crawler::CrawlSession;
use crate::state::FetchOutcome;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Total number of recorded pages
    pub total_pages: u64,

    /// Count of pages by fetch outcome
    pub pages_by_outcome: HashMap<FetchOutcome, u64>,

    /// Pages recorded at each depth
    pub pages_per_depth: BTreeMap<u32, u64>,

    pub max_depth_seen: u32,

    /// Anchors seen during the last run
    pub links_extracted: u64,

    /// URLs admitted to the frontier during the last run
    pub links_admitted: u64,

    pub parse_errors: u64,

    pub strategy: Option<String>,

    pub loaded_from_cache: bool,

    pub cache_path: Option<PathBuf>,
}

/// Collects statistics from a session
pub fn load_statistics(session: &CrawlSession) -> CrawlStatistics {
    let mut pages_by_outcome = HashMap::new();
    for page in session.pages().iter() {
        *pages_by_outcome.entry(page.outcome).or_insert(0) += 1;
    }

    let stats = session.stats();
    CrawlStatistics {
        total_pages: session.pages().len() as u64,
        pages_by_outcome,
        pages_per_depth: stats.pages_per_depth.clone(),
        max_depth_seen: session.max_depth_seen(),
        links_extracted: stats.links_extracted,
        links_admitted: stats.links_admitted,
        parse_errors: stats.parse_errors,
        strategy: session.strategy().map(|s| s.label().to_string()),
        loaded_from_cache: stats.loaded_from_cache,
        cache_path: stats.cache_path.clone(),
    }
}

impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===\n")?;

        writeln!(f, "Overview:")?;
        writeln!(f, "  Total pages: {}", self.total_pages)?;
        writeln!(f, "  Deepest level reached: {}", self.max_depth_seen)?;
        if let Some(strategy) = &self.strategy {
            writeln!(f, "  Strategy: {}", strategy)?;
        }
        writeln!(f, "  Links extracted this run: {}", self.links_extracted)?;
        writeln!(f, "  Links admitted this run: {}", self.links_admitted)?;
        writeln!(f)?;

        writeln!(f, "Pages by Depth:")?;
        for (depth, count) in &self.pages_per_depth {
            writeln!(f, "  {}: {}", depth, count)?;
        }
        writeln!(f)?;

        writeln!(f, "Pages by Outcome:")?;
        for outcome in FetchOutcome::all() {
            let count = self.pages_by_outcome.get(&outcome).copied().unwrap_or(0);
            if count > 0 {
                let percentage = (count as f64 / self.total_pages as f64) * 100.0;
                writeln!(f, "  {}: {} ({:.1}%)", outcome, count, percentage)?;
            }
        }
        if self.parse_errors > 0 {
            writeln!(f, "  (unparseable HTML this run: {})", self.parse_errors)?;
        }
        writeln!(f)?;

        match &self.cache_path {
            Some(path) if self.loaded_from_cache => {
                writeln!(f, "Cache: resumed from {}", path.display())
            }
            Some(path) => writeln!(f, "Cache: fresh, saving to {}", path.display()),
            None => writeln!(f, "Cache: none"),
        }
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", stats);
}
