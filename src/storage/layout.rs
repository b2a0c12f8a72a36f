//! On-disk catalog layout
//!
//! File and directory names relative to the output directory, plus the
//! human-readable description embedded in `site_metadata.json`.

use std::collections::BTreeMap;

/// Directory holding one JSON file per crawled page
pub const PAGES_DIR: &str = "pages";

/// Directory holding the PDF catalog
pub const PDFS_DIR: &str = "pdfs";

/// PDF catalog file, relative to [`PDFS_DIR`]
pub const PDF_CATALOG_FILE: &str = "catalog.json";

/// Site graph file
pub const SITE_GRAPH_FILE: &str = "site_graph.json";

/// Run metadata file
pub const SITE_METADATA_FILE: &str = "site_metadata.json";

/// Resume checkpoint file
pub const STATE_FILE: &str = ".crawl_state.json";

/// Markdown index of the catalog
pub const REPORT_FILE: &str = "CATALOG.md";

/// Returns the layout description stored under `structure` in the metadata
pub fn describe_layout() -> BTreeMap<String, String> {
    [
        ("pages", "pages/{url-hash}.json - Individual page content"),
        ("pdfs", "pdfs/catalog.json - PDF catalog with metadata"),
        ("site_graph", "site_graph.json - Page relationship graph"),
        ("site_metadata", "site_metadata.json - This file"),
        ("report", "CATALOG.md - Human-readable catalog index"),
        ("state", ".crawl_state.json - Resume checkpoint"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
