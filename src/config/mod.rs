//! Configuration module for Muni-Catalog
//!
//! Settings come from an optional TOML file; command-line flags override
//! individual values afterwards.
//!
//! # Example
//!
//! ```no_run
//! use muni_catalog::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("catalog.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, LanguageConfig, OutputConfig, UserAgentConfig, DEFAULT_SKIP_LANGUAGES,
    DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::{validate, validate_base_url};
