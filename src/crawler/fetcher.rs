//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for pages, classified into a [`FetchResult`]
//! - HEAD probes for PDF metadata, classified into a [`ProbeResult`]
//!
//! Neither function returns an error: every failure is a value the engine
//! logs before moving on. Nothing is retried.

use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// Accept header sent with page requests
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Response was not HTML
    NonHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Result of a PDF metadata probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The server answered the HEAD request
    Found {
        /// Content-Length header, 0 when absent or unparsable
        content_length: u64,
        /// Last-Modified header, verbatim
        last_modified: Option<String>,
    },

    /// No answer (timeout, connection error, ...)
    Failed {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The full User-Agent header value
/// * `timeout` - Overall per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use muni_catalog::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(
///     "MunicipalScraper/1.0 (Educational/Archival)",
///     Duration::from_secs(30),
/// ).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page with a single GET request
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with `text/html` Content-Type | `Success` |
/// | 2xx with any other Content-Type | `NonHtml` |
/// | Non-2xx after redirects | `HttpError` |
/// | Timeout, connection or body error | `NetworkError` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client
        .get(url.clone())
        .header(ACCEPT, ACCEPT_HTML)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return FetchResult::NetworkError { error: describe(&e) },
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = header_value(&response, CONTENT_TYPE.as_str()).unwrap_or_default();

    if !is_html(&content_type) {
        return FetchResult::NonHtml { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError { error: describe(&e) },
    }
}

/// Probes a PDF with a HEAD request
///
/// Any response counts as found, whatever its status; only the absence of
/// a response is a failure.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The PDF URL
/// * `timeout` - Per-probe timeout, overriding the client's
pub async fn probe_pdf(client: &Client, url: &Url, timeout: Duration) -> ProbeResult {
    match client.head(url.clone()).timeout(timeout).send().await {
        Ok(response) => ProbeResult::Found {
            content_length: header_value(&response, CONTENT_LENGTH.as_str())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            last_modified: header_value(&response, LAST_MODIFIED.as_str()),
        },
        Err(e) => ProbeResult::Failed { error: describe(&e) },
    }
}

/// Returns true if a Content-Type denotes HTML
pub fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Short human-readable description of a request error
fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
