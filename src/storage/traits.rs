//! Storage traits and error types
//!
//! This module defines the trait interface for catalog backends and
//! associated error types.

use crate::state::CrawlState;
use crate::storage::{PageRecord, PdfCatalog, SiteGraph, SiteMetadata};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog storage backends
///
/// The crawl engine is the only caller during a run and serializes every
/// write, so implementations need no internal locking. Each write replaces
/// the previous version of the artifact as a whole.
pub trait Storage {
    // ===== Pages =====

    /// Writes (or replaces) the record for one page
    fn write_page(&mut self, page: &PageRecord) -> StorageResult<()>;

    /// Loads the record for one page, if it was stored
    fn load_page(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Loads every stored page record
    fn load_pages(&self) -> StorageResult<Vec<PageRecord>>;

    // ===== PDF Catalog =====

    /// Writes the full PDF catalog
    fn write_pdf_catalog(&mut self, catalog: &PdfCatalog) -> StorageResult<()>;

    /// Loads the PDF catalog, if one was written before
    fn load_pdf_catalog(&self) -> StorageResult<Option<PdfCatalog>>;

    // ===== Site Graph =====

    /// Writes the full site graph
    fn write_site_graph(&mut self, graph: &SiteGraph) -> StorageResult<()>;

    /// Loads the site graph, if one was written before
    fn load_site_graph(&self) -> StorageResult<Option<SiteGraph>>;

    // ===== Run Metadata =====

    /// Writes the run metadata
    fn write_site_metadata(&mut self, metadata: &SiteMetadata) -> StorageResult<()>;

    /// Writes a free-form text report (e.g. the markdown index)
    fn write_report(&mut self, name: &str, contents: &str) -> StorageResult<()>;

    // ===== Resume State =====

    /// Checkpoints the crawl state
    fn save_state(&mut self, state: &CrawlState) -> StorageResult<()>;

    /// Loads the last checkpoint, if any
    fn load_state(&self) -> StorageResult<Option<CrawlState>>;
}
