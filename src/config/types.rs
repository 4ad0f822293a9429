use crate::crawler::Strategy;
use crate::storage::cache_file_name;
use crate::url::{base_domain_of, normalize_url};
use crate::{ConfigResult, UrlResult};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Main configuration structure for Sitescope
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The organization's entry page; its host defines the crawl scope
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of hops from the seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Upper bound on pages freshly fetched in one run
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<usize>,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Default traversal strategy label ("bfs" or "dfs")
    #[serde(default)]
    pub strategy: Option<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Number of hits returned when the caller gives no explicit limit
    #[serde(rename = "result-limit", default = "default_result_limit")]
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one cache file per (seed, max-depth) pair
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
        }
    }
}

impl Config {
    /// Normalized seed URL
    pub fn seed(&self) -> UrlResult<Url> {
        normalize_url(&self.crawler.seed_url)
    }

    /// Base domain used for scope checks, derived from the seed's host
    pub fn base_domain(&self) -> Option<String> {
        self.seed().ok().and_then(|seed| base_domain_of(&seed))
    }

    /// File name of the cache for this (seed, max-depth) pair
    pub fn cache_file_name(&self) -> String {
        cache_file_name(&self.crawler.seed_url, self.crawler.max_depth)
    }

    /// Full path of the cache file
    pub fn cache_path(&self) -> PathBuf {
        self.cache.directory.join(self.cache_file_name())
    }

    /// Configured default strategy, breadth-first when unset
    pub fn strategy(&self) -> ConfigResult<Strategy> {
        self.crawler
            .strategy
            .as_deref()
            .map_or(Ok(Strategy::BreadthFirst), str::parse)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_result_limit() -> usize {
    100
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from("./cache")
}
