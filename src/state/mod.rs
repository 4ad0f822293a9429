//! State module for the crawl corpus
//!
//! This module holds everything a crawl produces and later runs resume from.
//!
//! # Components
//!
//! - `PageRecord`: the stored result of crawling one URL, with its `FetchOutcome`
//! - `PageStore`: insertion-ordered URL -> PageRecord mapping
//! - `VisitedSet`: URLs fetched (successfully or not) in this or earlier runs
//! - `CrawlStats`: per-run and cumulative crawl counters

mod page_record;
mod page_store;
mod stats;

// Re-export main types
pub use page_record::{FetchOutcome, PageLink, PageRecord, PathHop, SEED_ANCHOR_TEXT};
pub use page_store::{PageStore, VisitedSet};
pub use stats::CrawlStats;
