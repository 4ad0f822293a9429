//! Crawler module for fetching, extracting and traversing pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed timeout and outcome classification
//! - HTML extraction of titles, body text and in-scope links
//! - Breadth-first and depth-first pending-work disciplines
//! - The crawl session that drives traversal and serves queries

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlSession, RunReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult, FetchedPage};
pub use frontier::{FifoFrontier, Frontier, FrontierEntry, LifoFrontier, Strategy};
pub use parser::{collapse_whitespace, extract_page, ExtractError, ExtractedPage};
