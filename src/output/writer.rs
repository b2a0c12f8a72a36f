//! Final catalog writer
//!
//! Runs after the crawl: cleans raw page records, then writes the
//! categorized PDF catalog, the site graph, the run metadata and the
//! markdown index through the [`Storage`] backend.

use crate::cleaner::clean_stored_pages;
use crate::output::categorize::categorize_pdfs;
use crate::output::markdown::format_catalog_index;
use crate::storage::layout::{describe_layout, REPORT_FILE};
use crate::storage::{CatalogStatistics, PdfCatalog, SiteGraph, SiteMetadata, Storage};
use crate::CatalogError;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Writes the finished catalog into the output directory
pub struct CatalogWriter<'a, S: Storage> {
    storage: &'a mut S,
    output_dir: PathBuf,
}

impl<'a, S: Storage> CatalogWriter<'a, S> {
    /// Creates a writer over `storage`, rooted at `output_dir`
    pub fn new(storage: &'a mut S, output_dir: &Path) -> Self {
        Self {
            storage,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Writes the complete catalog
    ///
    /// # Arguments
    ///
    /// * `base_url` - The crawl's normalized start URL
    /// * `max_depth` - The depth limit the crawl ran with
    /// * `pdfs` - The PDF catalog collected by the crawl
    /// * `graph` - The site graph collected by the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(SiteMetadata)` - The metadata that was written
    /// * `Err(CatalogError)` - A catalog file could not be written
    pub fn write(
        &mut self,
        base_url: &str,
        max_depth: u32,
        pdfs: &PdfCatalog,
        graph: &SiteGraph,
    ) -> Result<SiteMetadata, CatalogError> {
        tracing::info!("Writing catalog to {}", self.output_dir.display());

        let cleaned = clean_stored_pages(&mut *self.storage)?;
        tracing::info!("Cleaned {} pages", cleaned);

        let pages = self.storage.load_pages()?;

        let mut catalog = pdfs.clone();
        catalog.by_category = categorize_pdfs(&catalog.pdfs);
        tracing::info!("Writing PDF catalog ({} PDFs)", catalog.len());
        self.storage.write_pdf_catalog(&catalog)?;

        tracing::info!("Writing site graph ({} pages)", graph.len());
        self.storage.write_site_graph(graph)?;

        let metadata = SiteMetadata {
            base_url: base_url.to_string(),
            total_pages: pages.len(),
            total_pdfs: catalog.len(),
            max_depth,
            crawl_completed: Utc::now(),
            catalog_statistics: CatalogStatistics {
                total_pages_cataloged: pages.len(),
                total_pdfs_cataloged: catalog.len(),
                output_directory: absolute_display(&self.output_dir),
            },
            structure: describe_layout(),
        };
        self.storage.write_site_metadata(&metadata)?;

        let index = format_catalog_index(&metadata, &catalog, &pages);
        self.storage.write_report(REPORT_FILE, &index)?;

        tracing::info!(
            "Catalog written successfully to {}",
            metadata.catalog_statistics.output_directory
        );

        Ok(metadata)
    }
}

/// Formats the human-readable catalog summary printed at the end of a run
pub fn catalog_summary(metadata: &SiteMetadata) -> String {
    [
        "=== Municipal Website Catalog Summary ===".to_string(),
        format!("Base URL: {}", metadata.base_url),
        format!("Crawled: {}", metadata.crawl_completed.to_rfc3339()),
        format!("Pages: {}", metadata.catalog_statistics.total_pages_cataloged),
        format!("PDFs: {}", metadata.catalog_statistics.total_pdfs_cataloged),
        format!("Max Depth: {}", metadata.max_depth),
        String::new(),
        format!(
            "Output Directory: {}",
            metadata.catalog_statistics.output_directory
        ),
    ]
    .join("\n")
}

fn absolute_display(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
