//! Cache store trait and error types

use crate::crawler::Strategy;
use crate::state::{CrawlStats, PageStore, VisitedSet};
use crate::storage::CrawlSnapshot;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing a cache
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persists and restores crawl state across process restarts
///
/// Implementations must make `save` all-or-nothing: when it fails, whatever
/// a previous `save` left behind stays readable.
pub trait CacheStore: Send + Sync {
    /// Writes a complete snapshot, replacing any previous one
    fn save(
        &self,
        pages: &PageStore,
        visited: &VisitedSet,
        stats: &CrawlStats,
        strategy: Strategy,
    ) -> StorageResult<()>;

    /// Reads the last saved snapshot
    ///
    /// Returns `Ok(None)` when nothing has been saved yet and `Err` when a
    /// snapshot exists but cannot be read.
    fn load(&self) -> StorageResult<Option<CrawlSnapshot>>;

    /// Where the snapshot lives
    fn location(&self) -> &Path;
}
