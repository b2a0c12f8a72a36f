//! Integration tests for Muni-Catalog
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! full crawl cycle end-to-end against a temporary output directory. The
//! CLI tests run the built binary.

mod cli_tests;
mod common;
mod crawl_tests;
mod output_tests;
mod resume_tests;
