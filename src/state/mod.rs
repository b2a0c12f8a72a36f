//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: The resumable checkpoint (visited set and counters)
//! - `PageOutcome`: How the engine disposed of each URL

mod crawl_state;
mod page_outcome;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_outcome::PageOutcome;
