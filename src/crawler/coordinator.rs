//! Crawl session - traversal engine and the queries served from its corpus
//!
//! A `CrawlSession` owns everything one organization's crawl produces:
//! - The page store, visited set and statistics
//! - The HTTP client used for fetching
//! - The cache store the state is restored from and saved to
//!
//! The traversal loop is sequential: one URL is fetched, extracted and its
//! links admitted before the next entry is popped.

use crate::config::{validate, Config};
use crate::crawler::frontier::{Frontier, FrontierEntry, Strategy};
use crate::crawler::{build_http_client, extract_page, fetch_url, FetchResult};
use crate::search::{self, SearchHit};
use crate::state::{CrawlStats, FetchOutcome, PageLink, PageRecord, PageStore, PathHop, VisitedSet};
use crate::storage::{CacheStore, SqliteCache};
use crate::url::derive_page_name;
use crate::{Result, UrlError};
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Pages fetched between progress reports
const PROGRESS_INTERVAL: usize = 10;

/// Summary of one `crawl` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Pages fetched over the network during this run
    pub pages_fetched: usize,

    /// Already-visited pages whose stored links were walked again
    pub pages_reexpanded: usize,

    /// The run stopped because `max-pages` fresh fetches were made
    pub page_bound_hit: bool,

    /// The cache was written at the end of the run
    pub cache_saved: bool,
}

/// Explicit crawl session handed to whatever serves crawl and search requests
pub struct CrawlSession {
    config: Arc<Config>,
    seed: Url,
    base_domain: String,
    client: Client,
    cache: Box<dyn CacheStore>,
    pages: PageStore,
    visited: VisitedSet,
    stats: CrawlStats,
    strategy: Option<Strategy>,
}

impl CrawlSession {
    /// Creates a session with empty state
    ///
    /// Fails when the configuration is invalid (including an unsupported
    /// strategy label) or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let seed = config.seed()?;
        let base_domain = config.base_domain().ok_or(UrlError::MissingDomain)?;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        let cache = Box::new(SqliteCache::new(config.cache_path()));

        tracing::debug!(
            "Session for {} (base domain {}), cache at {}",
            seed,
            base_domain,
            cache.location().display()
        );

        let mut session = Self {
            config: Arc::new(config),
            seed,
            base_domain,
            client,
            cache,
            pages: PageStore::new(),
            visited: VisitedSet::new(),
            stats: CrawlStats::new(),
            strategy: None,
        };
        session.reset();
        Ok(session)
    }

    /// Replaces the cache store
    pub fn with_cache_store(mut self, cache: Box<dyn CacheStore>) -> Self {
        self.cache = cache;
        self.stats.cache_path = Some(self.cache.location().to_path_buf());
        self
    }

    /// Restores pages, visited set and statistics from the cache
    ///
    /// Returns false when there is no cache or it cannot be read; the session
    /// is then left empty, as if freshly created.
    pub fn load_cache(&mut self) -> bool {
        let location = self.cache.location().to_path_buf();

        match self.cache.load() {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    "Loaded {} pages ({} visited, {} crawl) from {}",
                    snapshot.pages.len(),
                    snapshot.visited.len(),
                    snapshot.strategy,
                    location.display()
                );
                self.pages = snapshot.pages;
                self.visited = snapshot.visited;
                self.stats = CrawlStats::merge_loaded(snapshot.stats, location);
                self.strategy = Some(snapshot.strategy);
                true
            }
            Ok(None) => {
                tracing::info!("No cache at {}, starting from scratch", location.display());
                self.reset();
                false
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache {}: {}", location.display(), e);
                self.reset();
                false
            }
        }
    }

    fn reset(&mut self) {
        self.pages.clear();
        self.visited.clear();
        self.stats = CrawlStats::new();
        self.stats.cache_path = Some(self.cache.location().to_path_buf());
        self.strategy = None;
    }

    /// Runs one traversal until the frontier drains or the page bound is hit
    ///
    /// Per-page failures are recorded, never returned. The state is saved to
    /// the cache afterwards when this run fetched anything, or when it
    /// completed a walk over state loaded from the cache.
    pub async fn crawl(&mut self, strategy: Strategy) -> RunReport {
        let max_depth = self.config.crawler.max_depth;
        let max_pages = self.config.crawler.max_pages;
        let start_time = Instant::now();

        self.strategy = Some(strategy);
        self.stats.reset_session();

        tracing::info!(
            "Starting {} crawl of {} (base domain {}, max depth {})",
            strategy,
            self.seed,
            self.base_domain,
            max_depth
        );

        let mut frontier = strategy.frontier();
        let mut queued: HashSet<String> = HashSet::new();
        let mut report = RunReport::default();

        queued.insert(self.seed.to_string());
        frontier.push(FrontierEntry::seed(self.seed.clone()));

        while let Some(entry) = frontier.pop() {
            if entry.depth > max_depth {
                tracing::debug!("Discarding {} beyond max depth", entry.url);
                continue;
            }

            let links = if self.visited.contains(entry.url.as_str()) {
                match self.reexpand(&entry) {
                    Some(links) => {
                        report.pages_reexpanded += 1;
                        links
                    }
                    None => continue,
                }
            } else {
                if let Some(limit) = max_pages {
                    if report.pages_fetched >= limit {
                        tracing::info!("Page bound of {} reached, stopping", limit);
                        report.page_bound_hit = true;
                        break;
                    }
                }

                let links = self.visit(&entry).await;
                report.pages_fetched += 1;

                if report.pages_fetched % PROGRESS_INTERVAL == 0 {
                    let rate = report.pages_fetched as f64 / start_time.elapsed().as_secs_f64();
                    tracing::info!(
                        "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
                        report.pages_fetched,
                        frontier.len(),
                        rate
                    );
                }
                links
            };

            if entry.depth < max_depth {
                self.expand(&entry, links, &mut queued, frontier.as_mut());
            }
        }

        tracing::info!(
            "Crawl finished in {:?}: {} fetched, {} re-expanded, {} pages total",
            start_time.elapsed(),
            report.pages_fetched,
            report.pages_reexpanded,
            self.pages.len()
        );

        let walked_cache = self.stats.loaded_from_cache && !report.page_bound_hit;
        if report.pages_fetched > 0 || walked_cache {
            report.cache_saved = self.save_cache(strategy);
        }

        report
    }

    /// Fetches and records one page, returning its in-scope links
    async fn visit(&mut self, entry: &FrontierEntry) -> Vec<PageLink> {
        let key = entry.url.to_string();
        let derived_name = derive_page_name(&entry.url);
        let fallback_title = match entry.anchor_text() {
            Some(text) if entry.depth > 0 && !text.trim().is_empty() => text.trim().to_string(),
            _ => derived_name.clone(),
        };

        tracing::debug!("Fetching {} (depth {})", key, entry.depth);

        let mut record = PageRecord {
            url: key.clone(),
            title: fallback_title.clone(),
            body: String::new(),
            parent_url: entry.parent_url.clone(),
            path_info: entry.path_info.clone(),
            depth: entry.depth,
            is_html: false,
            outcome: FetchOutcome::TransportError,
            status_code: None,
            links: Vec::new(),
        };

        match fetch_url(&self.client, &entry.url).await {
            FetchResult::TransportError { error } => {
                tracing::warn!("Transport error for {}: {}", key, error);
                self.stats.transport_errors += 1;
            }

            FetchResult::Fetched(page) => {
                record.status_code = Some(page.status_code);
                record.outcome = page.outcome();

                match record.outcome {
                    FetchOutcome::HttpError => {
                        tracing::warn!("HTTP {} for {}", page.status_code, key);
                        self.stats.http_errors += 1;
                    }

                    FetchOutcome::NonHtml => {
                        tracing::debug!("Skipping non-HTML {} ({})", key, page.content_type);
                        record.title = derived_name;
                        self.stats.non_html_pages += 1;
                    }

                    FetchOutcome::Ok => {
                        record.is_html = true;
                        match extract_page(&page.body, &page.final_url, &self.base_domain, &fallback_title) {
                            Ok(extracted) => {
                                self.stats.links_extracted += extracted.anchors_seen as u64;
                                record.title = extracted.title;
                                record.body = extracted.body;
                                record.links = extracted.links;
                            }
                            // Only a selector that fails to compile lands here
                            Err(e) => {
                                tracing::warn!("Failed to extract {}: {}", key, e);
                                self.stats.parse_errors += 1;
                            }
                        }
                    }

                    FetchOutcome::TransportError => {}
                }
            }
        }

        let links = record.links.clone();
        self.stats.record_page(entry.depth);
        self.visited.insert(key);
        self.pages.insert(record);
        links
    }

    /// Returns the stored links of a page visited in an earlier run
    ///
    /// A strictly shallower path than the recorded one replaces it.
    fn reexpand(&mut self, entry: &FrontierEntry) -> Option<Vec<PageLink>> {
        let key = entry.url.as_str();

        if let Some(previous) =
            self.pages
                .reconcile_path(key, &entry.path_info, entry.parent_url.as_deref())
        {
            tracing::debug!("Shortened path of {} from depth {} to {}", key, previous, entry.depth);
            self.stats.move_page(previous, entry.depth);
        }

        let record = self.pages.get(key)?;
        if !record.is_expandable() {
            return None;
        }

        tracing::debug!("Re-expanding {} links of cached {}", record.links.len(), key);
        Some(record.links.clone())
    }

    /// Pushes one frontier entry per link not yet queued in this run
    ///
    /// Links to pages visited in earlier runs are pushed too, for
    /// re-expansion only; they do not count as admissions.
    fn expand(
        &mut self,
        entry: &FrontierEntry,
        links: Vec<PageLink>,
        queued: &mut HashSet<String>,
        frontier: &mut dyn Frontier,
    ) {
        let mut children = Vec::with_capacity(links.len());

        for link in links {
            if queued.contains(&link.url) {
                continue;
            }

            let url = match Url::parse(&link.url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Dropping stored link {}: {}", link.url, e);
                    continue;
                }
            };

            queued.insert(link.url.clone());
            if !self.visited.contains(&link.url) {
                self.stats.links_admitted += 1;
            }
            children.push(entry.child(url, link.anchor_text));
        }

        frontier.push_children(children);
    }

    fn save_cache(&self, strategy: Strategy) -> bool {
        match self
            .cache
            .save(&self.pages, &self.visited, &self.stats, strategy)
        {
            Ok(()) => {
                tracing::info!(
                    "Saved {} pages to {}",
                    self.pages.len(),
                    self.cache.location().display()
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to save cache {}: {}",
                    self.cache.location().display(),
                    e
                );
                false
            }
        }
    }

    /// Keyword search over the crawled pages
    pub fn search(&self, keyword: &str, limit: usize) -> Vec<SearchHit> {
        search::search(&self.pages, keyword, limit)
    }

    /// Discovery path of a crawled URL; empty if it was never crawled
    pub fn path_of(&self, url: &str) -> Vec<PathHop> {
        search::path_of(&self.pages, url)
    }

    /// Deepest depth among recorded pages
    pub fn max_depth_seen(&self) -> u32 {
        self.pages.max_depth()
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Strategy of the last run, or of the run that saved the loaded cache
    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn cache_location(&self) -> &Path {
        self.cache.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::storage::{CrawlSnapshot, StorageError, StorageResult};
    use tempfile::TempDir;

    fn config(cache_dir: &Path, strategy: Option<&str>) -> Config {
        let strategy = strategy
            .map(|s| format!("strategy = \"{}\"\n", s))
            .unwrap_or_default();
        let toml = format!(
            r#"
[crawler]
seed-url = "https://www.upi.edu"
max-depth = 2
{}
[user-agent]
crawler-name = "Sitescope"
crawler-version = "0.1"
contact-url = "https://example.com/crawler"

[cache]
directory = "{}"
"#,
            strategy,
            cache_dir.display()
        );
        parse_config(&toml).unwrap()
    }

    /// Cache that fails every operation
    struct BrokenCache;

    impl CacheStore for BrokenCache {
        fn save(
            &self,
            _: &PageStore,
            _: &VisitedSet,
            _: &CrawlStats,
            _: Strategy,
        ) -> StorageResult<()> {
            Err(StorageError::Corrupt("read-only".to_string()))
        }

        fn load(&self) -> StorageResult<Option<CrawlSnapshot>> {
            Err(StorageError::Corrupt("truncated".to_string()))
        }

        fn location(&self) -> &Path {
            Path::new("broken.db")
        }
    }

    #[test]
    fn test_new_session_derives_scope() {
        let dir = TempDir::new().unwrap();
        let session = CrawlSession::new(config(dir.path(), None)).unwrap();

        assert_eq!(session.base_domain(), "upi.edu");
        assert_eq!(session.seed().as_str(), "https://www.upi.edu/");
        assert!(session.pages().is_empty());
        assert_eq!(session.max_depth_seen(), 0);
        assert!(session.cache_location().starts_with(dir.path()));
        assert_eq!(session.stats().cache_path.as_deref(), Some(session.cache_location()));
    }

    #[test]
    fn test_new_session_rejects_unknown_strategy() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path(), None);
        config.crawler.strategy = Some("best-first".to_string());

        assert!(matches!(
            CrawlSession::new(config),
            Err(crate::SitescopeError::Config(crate::ConfigError::UnsupportedStrategy(_)))
        ));
    }

    #[test]
    fn test_load_cache_missing() {
        let dir = TempDir::new().unwrap();
        let mut session = CrawlSession::new(config(dir.path(), Some("dfs"))).unwrap();

        assert!(!session.load_cache());
        assert!(!session.stats().loaded_from_cache);
        assert_eq!(session.strategy(), None);
    }

    #[test]
    fn test_load_cache_failure_leaves_empty_state() {
        let dir = TempDir::new().unwrap();
        let mut session = CrawlSession::new(config(dir.path(), None))
            .unwrap()
            .with_cache_store(Box::new(BrokenCache));

        assert!(!session.load_cache());
        assert!(session.pages().is_empty());
        assert!(session.visited().is_empty());
        assert_eq!(session.stats().cache_path.as_deref(), Some(Path::new("broken.db")));
    }

    #[test]
    fn test_queries_on_empty_session() {
        let dir = TempDir::new().unwrap();
        let session = CrawlSession::new(config(dir.path(), None)).unwrap();

        assert!(session.search("fakultas", 10).is_empty());
        assert!(session.path_of("https://upi.edu/").is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path(), None);
        // Nothing listens on port 9, so the seed fetch fails fast
        config.crawler.seed_url = "http://127.0.0.1:9/".to_string();
        config.crawler.request_timeout_secs = 2;

        let mut session = CrawlSession::new(config)
            .unwrap()
            .with_cache_store(Box::new(BrokenCache));
        let report = session.crawl(Strategy::BreadthFirst).await;

        assert_eq!(report.pages_fetched, 1);
        assert!(!report.cache_saved);
        assert_eq!(session.stats().transport_errors, 1);

        let seed = session.pages().get("http://127.0.0.1:9/").unwrap();
        assert_eq!(seed.outcome, FetchOutcome::TransportError);
        assert!(!seed.is_html);
        assert_eq!(seed.title, "127.0.0.1");
        assert_eq!(session.path_of("http://127.0.0.1:9/").len(), 1);
    }
}
