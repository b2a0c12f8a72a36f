//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and PDF metadata probes
//! - HTML parsing and link extraction
//! - Politeness throttling
//! - Overall crawl coordination

mod engine;
mod fetcher;
mod parser;
mod throttle;

pub use engine::{CrawlSession, CrawlSummary, Crawler};
pub use fetcher::{build_http_client, fetch_page, is_html, probe_pdf, FetchResult, ProbeResult};
pub use parser::{parse_html, ParsedPage};
pub use throttle::Throttle;

use crate::config::Config;
use crate::storage::Storage;
use crate::CatalogError;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Restore any previous checkpoint from storage
/// 2. Build the HTTP client and fetch robots.txt
/// 3. Walk the site from `base_url`, persisting as it goes
/// 4. Write a final checkpoint
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `base_url` - The start URL
/// * `storage` - The catalog backend
/// * `cancel` - Stops the crawl early when cancelled
///
/// # Returns
///
/// * `Ok((storage, session, summary))` - Crawl finished or was cancelled
/// * `Err(CatalogError)` - Crawl could not start
pub async fn crawl<S: Storage>(
    config: Config,
    base_url: Url,
    storage: S,
    cancel: CancellationToken,
) -> Result<(S, CrawlSession, CrawlSummary), CatalogError> {
    let mut crawler = Crawler::with_cancellation(config, base_url, storage, cancel).await?;
    let summary = crawler.run().await;
    let (storage, session) = crawler.into_parts();
    Ok((storage, session, summary))
}
