use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitescope::url::extract_domain;
///
/// let url = Url::parse("https://PDDIKTI.upi.edu/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("pddikti.upi.edu".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Derives the organization's base domain from the seed URL
///
/// The seed host is lowercased and a leading `www.` is dropped, so a seed of
/// `https://www.upi.edu` scopes the crawl to `upi.edu` and all its subdomains.
pub fn base_domain_of(seed: &Url) -> Option<String> {
    extract_domain(seed).map(|host| match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    })
}

/// Derives a human-readable name for a URL
///
/// Uses the last non-empty path segment (`/docs/Panduan.pdf` gives
/// `Panduan.pdf`), falling back to the host when the path is empty.
pub fn derive_page_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| segment.to_string())
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| url.as_str().to_string())
}
