/// Page record definitions for the crawl corpus
///
/// A `PageRecord` is created the first time its URL is fetched, whatever the
/// outcome, so link structure survives even when content does not.
use std::fmt;

/// Anchor text recorded for the first hop of every discovery path
pub const SEED_ANCHOR_TEXT: &str = "Seed URL";

/// How fetching a page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
    /// HTML page fetched and extracted
    Ok,

    /// Server answered with a status >= 400
    HttpError,

    /// Timeout, connection failure, or unreadable response body
    TransportError,

    /// Content-Type was not text/html
    NonHtml,
}

impl FetchOutcome {
    /// Returns true if the fetch produced no content because of a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::HttpError | Self::TransportError)
    }

    /// Converts the outcome to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::HttpError => "http_error",
            Self::TransportError => "transport_error",
            Self::NonHtml => "non_html",
        }
    }

    /// Parses an outcome from its database string representation
    ///
    /// Returns None if the string doesn't match any known outcome.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "ok" => Some(Self::Ok),
            "http_error" => Some(Self::HttpError),
            "transport_error" => Some(Self::TransportError),
            "non_html" => Some(Self::NonHtml),
            _ => None,
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 4] {
        [Self::Ok, Self::HttpError, Self::TransportError, Self::NonHtml]
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// One hop of a discovery path: the URL reached and the anchor text followed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathHop {
    pub url: String,
    pub anchor_text: String,
}

impl PathHop {
    pub fn new(url: impl Into<String>, anchor_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anchor_text: anchor_text.into(),
        }
    }

    /// The first hop of every path
    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, SEED_ANCHOR_TEXT)
    }
}

/// An in-scope outbound link extracted from a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageLink {
    /// Normalized absolute target URL
    pub url: String,

    /// Visible text (or title / aria-label / URL fallback) of the anchor
    pub anchor_text: String,
}

/// The stored result of crawling one URL
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    /// Canonical, fragment-free URL (the frontier key, not the post-redirect URL)
    pub url: String,

    pub title: String,

    /// Flattened extracted text; empty for failed and non-HTML fetches
    pub body: String,

    /// URL of the page this one was discovered from; None for the seed
    pub parent_url: Option<String>,

    /// Discovery path from the seed to this page, ending with this URL
    pub path_info: Vec<PathHop>,

    /// Hops from the seed along `path_info`
    pub depth: u32,

    pub is_html: bool,

    pub outcome: FetchOutcome,

    /// HTTP status, when a response was received
    pub status_code: Option<u16>,

    /// In-scope outbound links, kept so resumed runs can re-expand this page
    /// without re-fetching it
    pub links: Vec<PageLink>,
}

impl PageRecord {
    /// Returns true if this page can seed further frontier growth on resume
    pub fn is_expandable(&self) -> bool {
        self.is_html && !self.links.is_empty()
    }

    /// Checks that `path_info` ends at this URL and agrees with `depth`
    pub fn path_is_consistent(&self) -> bool {
        self.path_info.last().map(|hop| hop.url.as_str()) == Some(self.url.as_str())
            && self.path_info.len() == self.depth as usize + 1
    }
}
