use crate::{UrlError, UrlResult};
use url::Url;

/// Link schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Normalizes an absolute URL string
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme and a host
/// 3. Remove fragment (everything after #)
///
/// Host lowercasing, dot-segment removal and the empty-path-to-`/` rule are
/// applied by the parser itself, so the result is stable under re-normalization.
///
/// # Examples
///
/// ```
/// use sitescope::url::normalize_url;
///
/// let url = normalize_url("https://UPI.edu/a/../b#top").unwrap();
/// assert_eq!(url.as_str(), "https://upi.edu/b");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves an href found on `base` to an absolute, fragment-free URL
///
/// `mailto:`, `tel:`, `javascript:` and `data:` hrefs as well as pure
/// fragment links (`#section`) are rejected before resolution. The scheme of
/// the resolved URL is not checked here; scope classification does that.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitescope::url::normalize;
///
/// let base = Url::parse("https://upi.edu/fakultas/index.html").unwrap();
/// let url = normalize(&base, "teknik.html#visi").unwrap();
/// assert_eq!(url.as_str(), "https://upi.edu/fakultas/teknik.html");
/// ```
pub fn normalize(base: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();

    let lowered = href.to_ascii_lowercase();
    if let Some(scheme) = SKIPPED_SCHEMES.iter().find(|s| lowered.starts_with(**s)) {
        return Err(UrlError::SkippedScheme(scheme.trim_end_matches(':').to_string()));
    }

    if href.starts_with('#') {
        return Err(UrlError::FragmentOnly);
    }

    let mut url = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    url.set_fragment(None);
    Ok(url)
}
