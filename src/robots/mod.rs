//! Robots.txt handling module
//!
//! This module provides functionality for fetching and parsing the crawled
//! site's robots.txt and answering per-URL permission queries.

mod gate;
mod parser;

pub use gate::RobotsGate;
pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors raised while retrieving or evaluating robots.txt
#[derive(Error, Debug)]
pub enum RobotsError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("robots.txt at {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("robots.txt matcher failed on {0}")]
    Matcher(String),
}

/// Fetches and parses a robots.txt file
///
/// A missing file (404 or 410) means no restrictions and yields an
/// allow-all ruleset. Other non-success statuses are errors.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `robots_url` - Absolute URL of the robots.txt file
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Successfully fetched and parsed robots.txt
/// * `Err(RobotsError)` - Failed to fetch or read
pub async fn fetch_robots(client: &Client, robots_url: &Url) -> Result<ParsedRobots, RobotsError> {
    let fetch_err = |source| RobotsError::Fetch {
        url: robots_url.to_string(),
        source,
    };

    let response = client
        .get(robots_url.clone())
        .send()
        .await
        .map_err(fetch_err)?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        debug!("No robots.txt at {} ({})", robots_url, status);
        return Ok(ParsedRobots::allow_all());
    }

    if !status.is_success() {
        return Err(RobotsError::Status {
            url: robots_url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(fetch_err)?;
    Ok(ParsedRobots::from_content(&body))
}
