//! URL handling module for Sitescope
//!
//! This module provides URL normalization, host extraction, domain matching,
//! and same-organization scope classification.

mod domain;
mod matcher;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{base_domain_of, derive_page_name, extract_domain};
pub use matcher::matches_domain;
pub use normalize::{normalize, normalize_url};

/// Scope classification of a resolved URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same organization - may be crawled
    InScope,
    /// Host outside the organization's domain
    ForeignHost,
    /// Scheme other than http/https
    UnsupportedScheme,
}

impl LinkScope {
    /// Returns true if the URL may be admitted to the frontier
    pub fn should_crawl(&self) -> bool {
        matches!(self, Self::InScope)
    }
}

/// Classifies a URL against the organization's base domain
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitescope::url::{classify_url, LinkScope};
///
/// let url = Url::parse("https://pddikti.upi.edu/x").unwrap();
/// assert_eq!(classify_url(&url, "upi.edu"), LinkScope::InScope);
///
/// let url = Url::parse("ftp://upi.edu/x").unwrap();
/// assert_eq!(classify_url(&url, "upi.edu"), LinkScope::UnsupportedScheme);
/// ```
pub fn classify_url(url: &Url, base_domain: &str) -> LinkScope {
    if url.scheme() != "http" && url.scheme() != "https" {
        return LinkScope::UnsupportedScheme;
    }

    match extract_domain(url) {
        Some(host) if matches_domain(&base_domain.to_lowercase(), &host) => LinkScope::InScope,
        _ => LinkScope::ForeignHost,
    }
}

/// Returns true iff the URL is http(s) and its host is the base domain or one
/// of its subdomains
pub fn is_in_scope(url: &Url, base_domain: &str) -> bool {
    classify_url(url, base_domain).should_crawl()
}
