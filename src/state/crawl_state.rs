//! Resume checkpoint written to `.crawl_state.json`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Resumable crawl progress, persisted as `.crawl_state.json`
///
/// The visited set only ever grows: a URL is inserted the moment it is
/// selected for fetching and is never removed, within a run or across a
/// resume. Missing fields in an older checkpoint fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlState {
    /// Every URL selected for fetching, successful or not
    pub visited_urls: BTreeSet<String>,

    /// Number of language-variant URLs skipped
    pub skipped_language_count: u64,

    /// Number of links extracted across all crawled pages
    pub total_links_found: u64,

    /// The start URL of the crawl
    pub base_url: String,

    /// When this checkpoint was taken
    pub last_updated: Option<DateTime<Utc>>,
}

impl CrawlState {
    /// Creates an empty state for a crawl rooted at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Returns true if `url` has already been selected for fetching
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited_urls.contains(url)
    }

    /// Marks `url` as visited
    ///
    /// Returns false if it was already present.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited_urls.insert(url.to_string())
    }

    /// Number of URLs in the visited set
    pub fn visited_count(&self) -> usize {
        self.visited_urls.len()
    }

    /// Stamps the state with the current time before a checkpoint
    pub fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_visited_is_monotonic() {
        let mut state = CrawlState::new("https://example.gov/");
        assert!(state.mark_visited("https://example.gov/"));
        assert!(!state.mark_visited("https://example.gov/"));
        assert!(state.is_visited("https://example.gov/"));
        assert_eq!(state.visited_count(), 1);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut state = CrawlState::new("https://example.gov/");
        state.mark_visited("https://example.gov/b");
        state.mark_visited("https://example.gov/a");
        state.skipped_language_count = 3;
        state.total_links_found = 42;
        state.touch();

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value["visited_urls"],
            serde_json::json!(["https://example.gov/a", "https://example.gov/b"])
        );
        assert_eq!(value["skipped_language_count"], 3);
        assert_eq!(value["total_links_found"], 42);
        assert_eq!(value["base_url"], "https://example.gov/");
        assert!(value["last_updated"].is_string());
    }

    #[test]
    fn test_partial_checkpoint_loads() {
        let json = r#"{"visited_urls": ["https://example.gov/"]}"#;
        let state: CrawlState = serde_json::from_str(json).unwrap();
        assert!(state.is_visited("https://example.gov/"));
        assert_eq!(state.skipped_language_count, 0);
        assert_eq!(state.last_updated, None);
    }
}
