//! JSON directory storage implementation
//!
//! This module provides a file-per-artifact implementation of the Storage
//! trait. Every file is written to a temporary sibling first and renamed
//! into place, so a crash never leaves a half-written artifact behind.

use crate::state::CrawlState;
use crate::storage::layout::{
    PAGES_DIR, PDFS_DIR, PDF_CATALOG_FILE, SITE_GRAPH_FILE, SITE_METADATA_FILE, STATE_FILE,
};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{url_hash, PageRecord, PdfCatalog, SiteGraph, SiteMetadata};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Catalog stored as JSON files under one output directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Opens a catalog directory, creating `pages/` and `pdfs/` as needed
    pub fn open(root: &Path) -> StorageResult<Self> {
        for dir in [root.to_path_buf(), root.join(PAGES_DIR), root.join(PDFS_DIR)] {
            fs::create_dir_all(&dir).map_err(|source| StorageError::Io { path: dir, source })?;
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// The output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `url`
    pub fn page_path(&self, url: &str) -> PathBuf {
        self.root
            .join(PAGES_DIR)
            .join(format!("{}.json", url_hash(url)))
    }

    /// Path of the PDF catalog
    pub fn pdf_catalog_path(&self) -> PathBuf {
        self.root.join(PDFS_DIR).join(PDF_CATALOG_FILE)
    }

    /// Path of the site graph
    pub fn site_graph_path(&self) -> PathBuf {
        self.root.join(SITE_GRAPH_FILE)
    }

    /// Path of the run metadata
    pub fn site_metadata_path(&self) -> PathBuf {
        self.root.join(SITE_METADATA_FILE)
    }

    /// Path of the resume checkpoint
    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }
}

impl Storage for JsonStore {
    fn write_page(&mut self, page: &PageRecord) -> StorageResult<()> {
        write_json(&self.page_path(&page.url), page)
    }

    fn load_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        read_json(&self.page_path(url))
    }

    fn load_pages(&self) -> StorageResult<Vec<PageRecord>> {
        let dir = self.root.join(PAGES_DIR);
        let entries = fs::read_dir(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut pages = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| StorageError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            // A corrupt record must not hide the rest of the catalog
            match read_json::<PageRecord>(&path) {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable page record: {}", e),
            }
        }

        pages.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));
        Ok(pages)
    }

    fn write_pdf_catalog(&mut self, catalog: &PdfCatalog) -> StorageResult<()> {
        write_json(&self.pdf_catalog_path(), catalog)
    }

    fn load_pdf_catalog(&self) -> StorageResult<Option<PdfCatalog>> {
        read_json(&self.pdf_catalog_path())
    }

    fn write_site_graph(&mut self, graph: &SiteGraph) -> StorageResult<()> {
        write_json(&self.site_graph_path(), graph)
    }

    fn load_site_graph(&self) -> StorageResult<Option<SiteGraph>> {
        read_json(&self.site_graph_path())
    }

    fn write_site_metadata(&mut self, metadata: &SiteMetadata) -> StorageResult<()> {
        write_json(&self.site_metadata_path(), metadata)
    }

    fn write_report(&mut self, name: &str, contents: &str) -> StorageResult<()> {
        write_atomic(&self.root.join(name), contents.as_bytes())
    }

    fn save_state(&mut self, state: &CrawlState) -> StorageResult<()> {
        write_json(&self.state_path(), state)
    }

    fn load_state(&self) -> StorageResult<Option<CrawlState>> {
        read_json(&self.state_path())
    }
}

/// Reads and parses a JSON file; a missing file is `Ok(None)`
fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes `value` as pretty JSON and writes it atomically
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes)
}

/// Writes to `<path>.tmp`, then renames over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LinkRecord, PdfRecord};
    use crate::url::LinkType;
    use chrono::Utc;
    use tempfile::TempDir;

    fn page(url: &str, depth: u32) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            scraped_at: Utc::now(),
            depth,
            html: Some("<html><body><p>x</p></body></html>".to_string()),
            links: vec![LinkRecord {
                url: "https://x.gov/b".to_string(),
                text: "B".to_string(),
                link_type: LinkType::Internal,
            }],
            content: None,
        }
    }

    #[test]
    fn test_open_creates_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");
        JsonStore::open(&root).unwrap();
        assert!(root.join(PAGES_DIR).is_dir());
        assert!(root.join(PDFS_DIR).is_dir());
    }

    #[test]
    fn test_page_written_under_hash() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        store.write_page(&page("https://x.gov/", 0)).unwrap();

        let expected = dir
            .path()
            .join("pages")
            .join(format!("{}.json", url_hash("https://x.gov/")));
        assert!(expected.is_file());
        assert_eq!(store.load_page("https://x.gov/").unwrap().unwrap().title, "Title");
        assert!(store.load_page("https://x.gov/missing").unwrap().is_none());
    }

    #[test]
    fn test_load_pages_sorted_and_skips_garbage() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        store.write_page(&page("https://x.gov/z", 1)).unwrap();
        store.write_page(&page("https://x.gov/", 0)).unwrap();
        store.write_page(&page("https://x.gov/a", 1)).unwrap();
        fs::write(dir.path().join("pages").join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("pages").join("notes.txt"), "ignored").unwrap();

        let urls: Vec<String> = store.load_pages().unwrap().into_iter().map(|p| p.url).collect();
        assert_eq!(urls, vec!["https://x.gov/", "https://x.gov/a", "https://x.gov/z"]);
    }

    #[test]
    fn test_state_missing_then_saved() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        assert!(store.load_state().unwrap().is_none());

        let mut state = CrawlState::new("https://x.gov/");
        state.mark_visited("https://x.gov/");
        state.touch();
        store.save_state(&state).unwrap();

        assert_eq!(store.load_state().unwrap().unwrap(), state);
        assert!(dir.path().join(".crawl_state.json").is_file());
        assert!(!dir.path().join(".crawl_state.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_state_is_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        fs::write(store.state_path(), "[1, 2").unwrap();
        assert!(matches!(store.load_state(), Err(StorageError::Json { .. })));
    }

    #[test]
    fn test_pdf_catalog_and_graph_persist() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();

        let catalog = PdfCatalog::from_records(vec![PdfRecord::new(
            "https://x.gov/a.pdf",
            "A",
            2048,
            Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string()),
            "https://x.gov/",
        )]);
        store.write_pdf_catalog(&catalog).unwrap();
        assert_eq!(store.load_pdf_catalog().unwrap().unwrap(), catalog);

        let mut graph = SiteGraph::new();
        graph.record("https://x.gov/", vec!["https://x.gov/b"]);
        store.write_site_graph(&graph).unwrap();
        assert_eq!(store.load_site_graph().unwrap().unwrap(), graph);
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        store.write_report("CATALOG.md", "# Catalog\n").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("CATALOG.md")).unwrap(),
            "# Catalog\n"
        );
    }
}
