//! Output module for the command-line front end
//!
//! This module handles:
//! - Rendering crawl statistics
//! - Rendering search results with their discovery paths
//! - Rendering the link path to a single URL

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::search::SearchHit;
use crate::state::PathHop;
use std::fmt;

/// A discovery path, rendered one hop per line
pub struct DiscoveryPath<'a>(pub &'a [PathHop]);

impl fmt::Display for DiscoveryPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hop) in self.0.iter().enumerate() {
            writeln!(f, "  {}. {} [{}]", i, hop.anchor_text, hop.url)?;
        }
        Ok(())
    }
}

/// The hits of one query, each followed by its discovery path
pub struct SearchResults<'a> {
    pub query: &'a str,
    pub hits: &'a [SearchHit],
}

impl fmt::Display for SearchResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits.is_empty() {
            return writeln!(f, "No pages match \"{}\"", self.query);
        }

        writeln!(f, "{} result(s) for \"{}\":\n", self.hits.len(), self.query)?;
        for (i, hit) in self.hits.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, hit.title)?;
            writeln!(f, "   {}", hit.url)?;
            writeln!(f, "   {}", hit.snippet)?;
            writeln!(f, "   Path:")?;
            for line in DiscoveryPath(&hit.path_info).to_string().lines() {
                writeln!(f, "   {}", line)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn print_search_results(query: &str, hits: &[SearchHit]) {
    print!("{}", SearchResults { query, hits });
}

/// Prints the discovery path of `url`
pub fn print_path(url: &str, hops: &[PathHop]) {
    if hops.is_empty() {
        println!("{} was never crawled", url);
    } else {
        println!("Path to {} ({} hops):", url, hops.len() - 1);
        print!("{}", DiscoveryPath(hops));
    }
}
