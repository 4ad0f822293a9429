//! Linear keyword search over the page store
//!
//! A query is folded to lowercase and split on whitespace. A page matches
//! when every term occurs in its title, or every term occurs in its body.
//! Hits come back in discovery order; there is no relevance ranking.

mod snippet;

pub use snippet::{body_snippet, fold, title_snippet, CONTEXT_AFTER, CONTEXT_BEFORE, PREVIEW_CHARS};

use crate::state::{PageStore, PathHop};
use crate::url::normalize_url;

/// One search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,

    /// Discovery path from the seed to the page
    pub path_info: Vec<PathHop>,
}

/// Returns the first `limit` pages matching `query`, in discovery order
///
/// # Example
///
/// ```
/// use sitescope::search::search;
/// use sitescope::state::{FetchOutcome, PageRecord, PageStore, PathHop};
///
/// let mut pages = PageStore::new();
/// pages.insert(PageRecord {
///     url: "https://ft.upi.edu/".to_string(),
///     title: "Fakultas Teknik".to_string(),
///     body: String::new(),
///     parent_url: None,
///     path_info: vec![PathHop::seed("https://ft.upi.edu/")],
///     depth: 0,
///     is_html: true,
///     outcome: FetchOutcome::Ok,
///     status_code: Some(200),
///     links: vec![],
/// });
///
/// assert_eq!(search(&pages, "fakultas teknik", 10).len(), 1);
/// assert!(search(&pages, "fakultas seni", 10).is_empty());
/// ```
pub fn search(pages: &PageStore, query: &str, limit: usize) -> Vec<SearchHit> {
    let terms: Vec<String> = fold(query).split_whitespace().map(str::to_string).collect();
    if terms.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for page in pages.iter() {
        let folded_body = fold(&page.body);
        let body_match = contains_all(&folded_body, &terms);
        let title_match = contains_all(&fold(&page.title), &terms);

        let snippet = if body_match {
            body_snippet(&page.body, &folded_body, &terms)
        } else if title_match {
            Some(title_snippet(&page.title, &page.body))
        } else {
            None
        };

        if let Some(snippet) = snippet {
            hits.push(SearchHit {
                url: page.url.clone(),
                title: page.title.clone(),
                snippet,
                path_info: page.path_info.clone(),
            });
            if hits.len() >= limit {
                break;
            }
        }
    }

    tracing::debug!("Query '{}' matched {} pages", query, hits.len());
    hits
}

fn contains_all(haystack: &str, terms: &[String]) -> bool {
    terms.iter().all(|term| haystack.contains(term.as_str()))
}

/// Returns the recorded discovery path of `url`, or an empty path if the URL
/// was never crawled
///
/// The URL is looked up as given and, failing that, in normalized form, so
/// `https://upi.edu` finds the record stored as `https://upi.edu/`.
pub fn path_of(pages: &PageStore, url: &str) -> Vec<PathHop> {
    pages
        .get(url)
        .or_else(|| {
            normalize_url(url)
                .ok()
                .and_then(|normalized| pages.get(normalized.as_str()))
        })
        .map(|page| page.path_info.clone())
        .unwrap_or_default()
}
