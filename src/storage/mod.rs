//! Storage module for persisting crawl state between runs
//!
//! Each (seed URL, max depth) pair owns one SQLite cache file holding the
//! page store, the visited set, the crawl statistics and the strategy of the
//! run that saved it.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCache;
pub use traits::{CacheStore, StorageError, StorageResult};

use crate::crawler::Strategy;
use crate::state::{CrawlStats, PageStore, VisitedSet};
use crate::url::extract_domain;
use sha2::{Digest, Sha256};
use url::Url;

/// Hex digits of the seed hash kept in cache file names
const HASH_PREFIX_LEN: usize = 12;

/// Everything restored from a cache
#[derive(Debug, Clone)]
pub struct CrawlSnapshot {
    pub pages: PageStore,
    pub visited: VisitedSet,
    pub stats: CrawlStats,
    pub strategy: Strategy,
}

/// Derives the cache file name for a (seed, max-depth) pair
///
/// The name is `<host>_d<max_depth>_<hash>.db`, where `hash` is the first 12
/// hex digits of SHA-256 over `seed|max_depth`.
///
/// # Examples
///
/// ```
/// use sitescope::storage::cache_file_name;
///
/// let name = cache_file_name("https://upi.edu", 2);
/// assert!(name.starts_with("upi.edu_d2_"));
/// assert!(name.ends_with(".db"));
/// ```
pub fn cache_file_name(seed_url: &str, max_depth: u32) -> String {
    let seed_url = seed_url.trim();
    let host = Url::parse(seed_url)
        .ok()
        .and_then(|url| extract_domain(&url))
        .map(|host| sanitize(&host))
        .unwrap_or_else(|| "seed".to_string());

    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}", seed_url, max_depth).as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}_d{}_{}.db", host, max_depth, &digest[..HASH_PREFIX_LEN])
}

fn sanitize(host: &str) -> String {
    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
