//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests with transparent redirect following
//! - Outcome classification (HTML, non-HTML, HTTP error, transport error)

use crate::config::UserAgentConfig;
use crate::state::FetchOutcome;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed before the request fails
const MAX_REDIRECTS: usize = 10;

/// A response received from the server
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Response body decoded with the Content-Type charset (UTF-8 when
    /// absent); only read for successful HTML responses
    pub body: String,
}

impl FetchedPage {
    /// Classifies the response
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | status >= 400 | HttpError |
    /// | Content-Type lacks `text/html` | NonHtml |
    /// | otherwise | Ok |
    pub fn outcome(&self) -> FetchOutcome {
        classify_response(self.status_code, &self.content_type)
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered (with any status)
    Fetched(FetchedPage),

    /// Network error (connection refused, timeout, too many redirects, body read failure)
    TransportError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sitescope::config::UserAgentConfig;
/// use sitescope::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Sitescope".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/crawler".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// Redirects are followed transparently; `final_url` carries the
/// post-redirect location so links on the page resolve against it. The body
/// is only downloaded for successful HTML responses.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return FetchResult::TransportError { error: describe_error(&e) },
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = if classify_response(status_code, &content_type) == FetchOutcome::Ok {
        match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchResult::TransportError { error: describe_error(&e) },
        }
    } else {
        String::new()
    };

    FetchResult::Fetched(FetchedPage {
        final_url,
        status_code,
        content_type,
        body,
    })
}

fn classify_response(status_code: u16, content_type: &str) -> FetchOutcome {
    if status_code >= 400 {
        FetchOutcome::HttpError
    } else if !content_type.to_ascii_lowercase().contains("text/html") {
        FetchOutcome::NonHtml
    } else {
        FetchOutcome::Ok
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    }
}
