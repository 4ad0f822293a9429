//! Sitescope: a scoped organization crawler with keyword search
//!
//! This crate crawls every page reachable inside one organization's domain
//! (subdomains included), keeps the extracted title, text and discovery path of
//! each page, and answers keyword searches over the resulting corpus together
//! with the link path that led the crawler to each hit.

pub mod config;
pub mod crawler;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitescope operations
#[derive(Debug, Error)]
pub enum SitescopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unsupported crawl strategy '{0}' (expected bfs or dfs)")]
    UnsupportedStrategy(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Link scheme is never followed: {0}")]
    SkippedScheme(String),

    #[error("Fragment-only link")]
    FragmentOnly,

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sitescope operations
pub type Result<T> = std::result::Result<T, SitescopeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSession, RunReport, Strategy};
pub use search::SearchHit;
pub use state::{FetchOutcome, PageRecord, PathHop};
pub use crate::url::{is_in_scope, normalize_url};
