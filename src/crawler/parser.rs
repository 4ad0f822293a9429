//! HTML extractor for titles, body text and same-organization links
//!
//! This module turns a fetched HTML document into:
//! - A display title (`<title>`, else the caller's fallback, else a name derived from the URL)
//! - A flattened text body, preferring the main content region
//! - The in-scope outbound links with their anchor text

use crate::state::PageLink;
use crate::url::{derive_page_name, is_in_scope, normalize};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Structural containers searched, in priority order, for the main content
const CONTENT_CONTAINERS: &[&str] = &["main", "article", "div#content", "div.content"];

/// Elements whose text makes up the page body
const TEXT_ELEMENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td", "th", "pre", "span",
];

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Errors raised while extracting a page
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Selectors used by the extractor, compiled once per process
struct Selectors {
    title: Selector,
    text: Selector,
    containers: Vec<Selector>,
    body: Selector,
    anchor: Selector,
}

static SELECTORS: OnceLock<Result<Selectors, ExtractError>> = OnceLock::new();

impl Selectors {
    fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            title: selector("title")?,
            text: selector(&TEXT_ELEMENTS.join(", "))?,
            containers: CONTENT_CONTAINERS
                .iter()
                .map(|css| selector(css))
                .collect::<Result<_, _>>()?,
            body: selector("body")?,
            anchor: selector("a[href]")?,
        })
    }

    fn get() -> Result<&'static Self, ExtractError> {
        SELECTORS.get_or_init(Self::compile).as_ref().map_err(Clone::clone)
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    pub title: String,

    /// Whitespace-collapsed body text, possibly empty
    pub body: String,

    /// In-scope links, first occurrence of each URL only
    pub links: Vec<PageLink>,

    /// Number of anchors with an href seen, in scope or not
    pub anchors_seen: usize,
}

/// Parses HTML content and extracts title, body and links
///
/// # Link Extraction Rules
///
/// - Every `<a href>` counts towards `anchors_seen`
/// - `mailto:`, `tel:`, `javascript:`, `data:` and `#fragment` hrefs are skipped
/// - Remaining hrefs are resolved against `page_url` and kept only if in scope
/// - Anchor text: visible text, else `title`, else `aria-label`, else the URL
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The post-redirect URL of the page, used to resolve relative links
/// * `base_domain` - The organization's base domain
/// * `fallback_title` - Used when the document has no usable `<title>`
///
/// # Example
///
/// ```
/// use sitescope::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>UPI</title></head><body><main><p>Berita</p><a href="/a">A</a></main></body></html>"#;
/// let page_url = Url::parse("https://upi.edu/").unwrap();
/// let page = extract_page(html, &page_url, "upi.edu", "fallback").unwrap();
/// assert_eq!(page.title, "UPI");
/// assert_eq!(page.body, "Berita");
/// assert_eq!(page.links[0].url, "https://upi.edu/a");
/// ```
pub fn extract_page(
    html: &str,
    page_url: &Url,
    base_domain: &str,
    fallback_title: &str,
) -> Result<ExtractedPage, ExtractError> {
    let selectors = Selectors::get()?;
    let document = Html::parse_document(html);

    let title = extract_title(&document, selectors)
        .or_else(|| non_empty(collapse_whitespace(fallback_title)))
        .unwrap_or_else(|| derive_page_name(page_url));
    let body = extract_body(&document, selectors);
    let (links, anchors_seen) = extract_links(&document, selectors, page_url, base_domain);

    Ok(ExtractedPage {
        title,
        body,
        links,
        anchors_seen,
    })
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html, selectors: &Selectors) -> Option<String> {
    document
        .select(&selectors.title)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .and_then(non_empty)
}

/// Extracts the flattened body text
///
/// Order: text elements inside the first content container found, then text
/// elements anywhere in the document, then all visible text of `<body>`.
fn extract_body(document: &Html, selectors: &Selectors) -> String {
    for container_selector in &selectors.containers {
        if let Some(container) = document.select(container_selector).next() {
            let text = text_of_elements(container, &selectors.text);
            if !text.is_empty() {
                return text;
            }
            break;
        }
    }

    let text = text_of_elements(document.root_element(), &selectors.text);
    if !text.is_empty() {
        return text;
    }

    document
        .select(&selectors.body)
        .next()
        .map(visible_text)
        .unwrap_or_default()
}

/// Joins the text of every matching element under `root`, skipping elements
/// nested in another match so no text is counted twice
fn text_of_elements(root: ElementRef, text_selector: &Selector) -> String {
    let parts: Vec<String> = root
        .select(text_selector)
        .filter(|element| !has_text_ancestor(element, &root))
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .collect();
    parts.join(" ")
}

fn has_text_ancestor(element: &ElementRef, root: &ElementRef) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == root.id() {
            return false;
        }
        if let Some(parent) = ancestor.value().as_element() {
            if TEXT_ELEMENTS.contains(&parent.name()) {
                return true;
            }
        }
    }
    false
}

/// Whitespace-collapsed text of an element, ignoring script-like subtrees
fn visible_text(element: ElementRef) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            raw.push(' ');
            raw.push_str(text);
        }
    }
    collapse_whitespace(&raw)
}

/// Extracts in-scope links; returns them with the count of anchors seen
fn extract_links(
    document: &Html,
    selectors: &Selectors,
    page_url: &Url,
    base_domain: &str,
) -> (Vec<PageLink>, usize) {
    let mut links = Vec::new();
    let mut seen = HashSet::new();
    let mut anchors_seen = 0;

    for element in document.select(&selectors.anchor) {
        anchors_seen += 1;

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(url) = normalize(page_url, href) else {
            continue;
        };
        if !is_in_scope(&url, base_domain) || !seen.insert(url.to_string()) {
            continue;
        }

        let anchor_text = non_empty(visible_text(element))
            .or_else(|| attr_text(&element, "title"))
            .or_else(|| attr_text(&element, "aria-label"))
            .unwrap_or_else(|| url.to_string());

        links.push(PageLink {
            url: url.to_string(),
            anchor_text,
        });
    }

    (links, anchors_seen)
}

fn attr_text(element: &ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(collapse_whitespace)
        .and_then(non_empty)
}

/// Collapses whitespace runs to single spaces and trims
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
