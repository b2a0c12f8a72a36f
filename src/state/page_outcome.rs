//! Per-URL outcome definitions for the crawl engine
//!
//! Every URL popped from the work stack ends in exactly one of these states.

use std::fmt;

/// Represents how the crawl engine disposed of a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Filtered before any request =====
    /// URL lies beyond the maximum crawl depth
    DepthExceeded,

    /// URL was already selected earlier in this run or a resumed one
    AlreadyVisited,

    /// URL was crawled by an earlier run; its stored links are followed again
    Replayed,

    /// URL is a non-primary-language variant
    LanguageSkipped,

    /// robots.txt disallows the URL
    RobotsBlocked,

    /// Cancellation arrived before the request was sent; URL stays unvisited
    Interrupted,

    // ===== Fetched, but dead end =====
    /// Network error or non-2xx status; not retried this run
    FetchFailed,

    /// Response Content-Type is not HTML
    NonHtmlSkipped,

    // ===== Success =====
    /// Page was fetched, parsed and persisted
    Crawled,
}

impl PageOutcome {
    /// Returns true if this outcome enqueues the page's internal links
    pub fn spawns_children(&self) -> bool {
        matches!(self, Self::Crawled | Self::Replayed)
    }

    /// Short snake_case label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthExceeded => "depth_exceeded",
            Self::AlreadyVisited => "already_visited",
            Self::Replayed => "replayed",
            Self::LanguageSkipped => "language_skipped",
            Self::RobotsBlocked => "robots_blocked",
            Self::Interrupted => "interrupted",
            Self::FetchFailed => "fetch_failed",
            Self::NonHtmlSkipped => "non_html_skipped",
            Self::Crawled => "crawled",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
