//! Muni-Catalog: a polite municipal website cataloger
//!
//! This crate crawls a single government website, records every HTML page it
//! reaches and the metadata of every PDF those pages link to, and writes a
//! resumable on-disk catalog for later indexing.

pub mod cleaner;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Errors that stop a crawl or the catalog write
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Errors from loading or validating `catalog.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors from resolving a link into an absolute URL
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

pub use config::Config;
pub use crawler::{CrawlSummary, Crawler};
pub use state::{CrawlState, PageOutcome};
pub use url::{classify_link, is_internal, normalize_url, LinkType};
