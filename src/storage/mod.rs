//! Storage module for persisting the catalog
//!
//! This module handles everything written to the output directory:
//! - Per-page JSON records, written as each page is crawled
//! - The PDF catalog, rewritten whenever a PDF is added
//! - The site graph and run metadata
//! - The resume checkpoint

mod json;
pub mod layout;
mod traits;

pub use json::JsonStore;
pub use traits::{Storage, StorageError, StorageResult};

use crate::url::LinkType;
use crate::CatalogError;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::Path;

/// Title given to PDFs linked with empty anchor text
pub const UNTITLED_PDF: &str = "Untitled PDF";

/// Opens (creating if needed) a catalog directory
///
/// # Arguments
///
/// * `path` - The output directory
///
/// # Returns
///
/// * `Ok(JsonStore)` - Directory layout is in place
/// * `Err(CatalogError)` - The directories could not be created
pub fn open_storage(path: &Path) -> Result<JsonStore, CatalogError> {
    Ok(JsonStore::open(path)?)
}

/// Hex MD5 digest of a URL, used for page file names and graph keys
pub fn url_hash(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}

/// Rounds a size to two decimal places
pub(crate) fn round_mb(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a byte count to megabytes, rounded to two decimals
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round_mb(bytes as f64 / (1024.0 * 1024.0))
}

/// A link found on a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

/// A heading extracted by the cleaning pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Tag name, `h1` through `h6`
    pub level: String,
    pub text: String,
}

/// Metadata hints found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.date.is_none() && self.document_type.is_none()
    }
}

/// Output of the content cleaner for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedContent {
    pub content_text: String,
    pub headings: Vec<Heading>,
    pub metadata: PageMetadata,
    pub word_count: usize,
}

/// A crawled page, stored as `pages/{md5(url)}.json`
///
/// Freshly crawled records carry the raw `html`; the cleaning pass replaces
/// it with the flattened [`CleanedContent`] fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub scraped_at: DateTime<Utc>,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(flatten)]
    pub content: Option<CleanedContent>,
}

impl PageRecord {
    /// Returns true if the page still awaits the cleaning pass
    pub fn needs_cleaning(&self) -> bool {
        self.html.is_some()
    }

    /// Replaces the raw HTML with cleaned content
    pub fn into_cleaned(self, content: CleanedContent) -> Self {
        Self {
            html: None,
            content: Some(content),
            ..self
        }
    }

    /// Links of one type, in page order
    pub fn links_of(&self, link_type: LinkType) -> impl Iterator<Item = &LinkRecord> {
        self.links.iter().filter(move |l| l.link_type == link_type)
    }
}

/// Metadata for a PDF discovered during the crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfRecord {
    pub url: String,
    pub title: String,
    pub file_size: u64,
    pub file_size_mb: f64,
    #[serde(default)]
    pub last_modified: String,
    pub parent_page: String,
    pub discovered_at: DateTime<Utc>,
}

impl PdfRecord {
    /// Builds a record from probe results
    ///
    /// Empty anchor text falls back to [`UNTITLED_PDF`].
    pub fn new(
        url: &str,
        link_text: &str,
        file_size: u64,
        last_modified: Option<String>,
        parent_page: &str,
    ) -> Self {
        let title = link_text.trim();
        Self {
            url: url.to_string(),
            title: if title.is_empty() {
                UNTITLED_PDF.to_string()
            } else {
                title.to_string()
            },
            file_size,
            file_size_mb: bytes_to_mb(file_size),
            last_modified: last_modified.unwrap_or_default(),
            parent_page: parent_page.to_string(),
            discovered_at: Utc::now(),
        }
    }
}

/// The PDF catalog, stored as `pdfs/catalog.json`
///
/// At most one record per URL; the first insertion wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfCatalog {
    #[serde(default)]
    pub total_pdfs: usize,
    #[serde(default)]
    pub total_size_mb: f64,
    #[serde(default)]
    pub pdfs: Vec<PdfRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_category: BTreeMap<String, Vec<PdfRecord>>,
}

impl PdfCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a catalog from records, dropping duplicate URLs
    pub fn from_records(records: impl IntoIterator<Item = PdfRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Returns true if `url` is already cataloged
    pub fn contains(&self, url: &str) -> bool {
        self.pdfs.iter().any(|pdf| pdf.url == url)
    }

    /// Adds a record unless its URL is already present
    ///
    /// Returns false (and leaves the catalog untouched) on a duplicate.
    pub fn insert(&mut self, record: PdfRecord) -> bool {
        if self.contains(&record.url) {
            return false;
        }
        self.pdfs.push(record);
        self.refresh_totals();
        true
    }

    pub fn len(&self) -> usize {
        self.pdfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdfs.is_empty()
    }

    /// Looks up a record by URL
    pub fn get(&self, url: &str) -> Option<&PdfRecord> {
        self.pdfs.iter().find(|pdf| pdf.url == url)
    }

    /// Recomputes the totals; any previous categorization is discarded
    pub fn refresh_totals(&mut self) {
        self.total_pdfs = self.pdfs.len();
        self.total_size_mb = round_mb(self.pdfs.iter().map(|pdf| pdf.file_size_mb).sum());
        self.by_category.clear();
    }
}

/// One node of the serialized site graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub url: String,
    pub links_to: Vec<GraphEdge>,
}

/// One edge of the serialized site graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub hash: String,
    pub url: String,
}

/// Directed page-to-page edges for internal links
///
/// Serialized as a map from `md5(source)` to [`GraphNode`]. Targets keep the
/// order of first appearance on the source page, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl SiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the internal links found on `source`
    ///
    /// Replaces any earlier entry for the same source.
    pub fn record<I, S>(&mut self, source: &str, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for target in targets {
            let target = target.into();
            if !ordered.contains(&target) {
                ordered.push(target);
            }
        }
        self.edges.insert(source.to_string(), ordered);
    }

    /// Targets linked from `source`, if it was crawled
    pub fn links_from(&self, source: &str) -> Option<&[String]> {
        self.edges.get(source).map(Vec::as_slice)
    }

    /// Number of source pages
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.edges.iter()
    }

    /// Converts to the hash-keyed on-disk form
    pub fn to_document(&self) -> BTreeMap<String, GraphNode> {
        self.edges
            .iter()
            .map(|(source, targets)| {
                let node = GraphNode {
                    url: source.clone(),
                    links_to: targets
                        .iter()
                        .map(|target| GraphEdge {
                            hash: url_hash(target),
                            url: target.clone(),
                        })
                        .collect(),
                };
                (url_hash(source), node)
            })
            .collect()
    }

    /// Rebuilds the graph from its on-disk form
    pub fn from_document(document: BTreeMap<String, GraphNode>) -> Self {
        let mut graph = Self::new();
        for node in document.into_values() {
            graph.record(&node.url, node.links_to.into_iter().map(|edge| edge.url));
        }
        graph
    }
}

impl Serialize for SiteGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SiteGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, GraphNode>::deserialize(deserializer).map(Self::from_document)
    }
}

/// Counts written into `site_metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_pages_cataloged: usize,
    pub total_pdfs_cataloged: usize,
    pub output_directory: String,
}

/// Run metadata, stored as `site_metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub base_url: String,
    pub total_pages: usize,
    pub total_pdfs: usize,
    pub max_depth: u32,
    pub crawl_completed: DateTime<Utc>,
    pub catalog_statistics: CatalogStatistics,
    pub structure: BTreeMap<String, String>,
}
