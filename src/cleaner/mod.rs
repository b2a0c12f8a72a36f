//! Content cleaner for crawled pages
//!
//! Turns the raw HTML kept on freshly crawled page records into readable
//! text: boilerplate regions are dropped, the main content block is
//! located, and headings, paragraph text and metadata hints are extracted.
//! Text fragments repeated across most of the site are treated as
//! boilerplate too.

mod metadata;

pub use metadata::MetadataExtractor;

use crate::storage::{CleanedContent, Heading, PageRecord, Storage, StorageResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};

/// Elements removed before content extraction
const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    ".navigation",
    ".nav",
    ".navbar",
    ".menu",
    ".sidebar",
    ".side-bar",
    ".widget",
    ".footer",
    ".header",
    ".banner",
    ".advertisement",
    ".ad",
    ".ads",
    ".social-media",
    ".social",
    ".share-buttons",
    ".breadcrumb",
    ".breadcrumbs",
    "#navigation",
    "#nav",
    "#sidebar",
    "#footer",
    "#header",
    ".cookie-notice",
    ".cookie-banner",
    "[role=\"navigation\"]",
    "[role=\"banner\"]",
    "[role=\"complementary\"]",
    "script",
    "style",
    "noscript",
    "iframe",
    "svg",
];

/// Preferred main-content containers, in priority order
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".content",
    ".main-content",
    ".page-content",
    "#content",
    "#main-content",
    "#main",
];

/// Text that marks a block as boilerplate
const BOILERPLATE_PATTERNS: &[&str] = &[
    r"©\s*\d{4}",
    r"All rights reserved",
    r"Skip to (?:main )?content",
    r"JavaScript (?:must be|is) (?:enabled|disabled)",
    r"This site uses cookies",
];

/// Fragment lengths (in characters, exclusive) considered for site-wide detection
const FRAGMENT_MIN_CHARS: usize = 10;
const FRAGMENT_MAX_CHARS: usize = 200;

/// Heuristic HTML cleaner
#[derive(Debug, Clone)]
pub struct ContentCleaner {
    patterns: Vec<Regex>,
    hidden_style: Option<Regex>,
    metadata: MetadataExtractor,
    boilerplate_fragments: HashSet<String>,
}

impl Default for ContentCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentCleaner {
    pub fn new() -> Self {
        Self {
            patterns: BOILERPLATE_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
                .collect(),
            hidden_style: Regex::new(r"(?i)display:\s*none").ok(),
            metadata: MetadataExtractor::new(),
            boilerplate_fragments: HashSet::new(),
        }
    }

    /// Fragments currently treated as site-wide boilerplate
    pub fn boilerplate_fragments(&self) -> &HashSet<String> {
        &self.boilerplate_fragments
    }

    /// Learns text fragments that appear on more than half of the pages
    ///
    /// Only text nodes between 11 and 199 characters (after trimming) are
    /// considered; each page counts once per fragment.
    pub fn identify_common_boilerplate<'a, I>(&mut self, pages: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fragment_counts: HashMap<String, usize> = HashMap::new();
        let mut page_count = 0usize;

        for html in pages {
            page_count += 1;
            let document = Html::parse_document(html);
            let mut seen: HashSet<String> = HashSet::new();

            for node in document.tree.nodes() {
                let Some(text) = node.value().as_text() else {
                    continue;
                };
                let in_code = node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .is_some_and(|el| matches!(el.name(), "script" | "style"));
                if in_code {
                    continue;
                }

                let cleaned = text.trim();
                let len = cleaned.chars().count();
                if len > FRAGMENT_MIN_CHARS && len < FRAGMENT_MAX_CHARS {
                    seen.insert(cleaned.to_string());
                }
            }

            for fragment in seen {
                *fragment_counts.entry(fragment).or_insert(0) += 1;
            }
        }

        let threshold = page_count as f64 * 0.5;
        self.boilerplate_fragments.extend(
            fragment_counts
                .into_iter()
                .filter(|(_, count)| *count as f64 > threshold)
                .map(|(fragment, _)| fragment),
        );

        tracing::info!(
            "Identified {} common boilerplate fragments",
            self.boilerplate_fragments.len()
        );
    }

    /// Cleans a single page's HTML and extracts structured content
    pub fn clean_page(&self, html: &str) -> CleanedContent {
        let mut document = Html::parse_document(html);
        self.remove_boilerplate(&mut document);

        let main = find_main_content(&document);
        let headings = self.extract_headings(main);
        let content_text = self.extract_clean_text(main);
        let metadata = self.metadata.extract(&document);

        CleanedContent {
            word_count: content_text.split_whitespace().count(),
            content_text,
            headings,
            metadata,
        }
    }

    /// Cleans every page record that still carries raw HTML
    pub fn clean_all_pages(&mut self, pages: Vec<PageRecord>) -> Vec<PageRecord> {
        self.identify_common_boilerplate(pages.iter().filter_map(|p| p.html.as_deref()));

        let total = pages.len();
        pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| {
                let Some(html) = page.html.as_deref() else {
                    return page;
                };
                tracing::debug!("Cleaning {}/{}: {}", i + 1, total, page.url);
                let content = self.clean_page(html);
                page.into_cleaned(content)
            })
            .collect()
    }

    /// Returns true if `text` is a boilerplate block
    pub fn is_boilerplate_text(&self, text: &str) -> bool {
        let len = text.chars().count();
        if !(3..=500).contains(&len) {
            return false;
        }

        self.patterns.iter().any(|re| re.is_match(text)) || self.boilerplate_fragments.contains(text)
    }

    fn remove_boilerplate(&self, document: &mut Html) {
        let mut doomed = Vec::new();

        for selector in BOILERPLATE_SELECTORS {
            if let Ok(selector) = Selector::parse(selector) {
                doomed.extend(document.select(&selector).map(|el| el.id()));
            }
        }

        if let (Some(hidden), Ok(styled)) = (&self.hidden_style, Selector::parse("[style]")) {
            doomed.extend(
                document
                    .select(&styled)
                    .filter(|el| el.value().attr("style").is_some_and(|s| hidden.is_match(s)))
                    .map(|el| el.id()),
            );
        }

        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    fn extract_headings(&self, main: ElementRef<'_>) -> Vec<Heading> {
        let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
            return Vec::new();
        };

        main.select(&selector)
            .filter_map(|el| {
                let text = element_text(el);
                if text.is_empty() || self.is_boilerplate_text(&text) {
                    return None;
                }
                Some(Heading {
                    level: el.value().name().to_string(),
                    text,
                })
            })
            .collect()
    }

    fn extract_clean_text(&self, main: ElementRef<'_>) -> String {
        let blocks: Vec<String> = Selector::parse("p, li, td, th, blockquote")
            .map(|selector| {
                main.select(&selector)
                    .map(element_text)
                    .filter(|text| !text.is_empty() && !self.is_boilerplate_text(text))
                    .collect()
            })
            .unwrap_or_default();

        if blocks.is_empty() {
            element_text(main)
        } else {
            blocks.join("\n\n")
        }
    }
}

/// Cleans every stored page that still carries raw HTML, writing it back
///
/// Returns the number of pages cleaned. Per-page write failures are logged
/// and skipped.
pub fn clean_stored_pages<S: Storage>(storage: &mut S) -> StorageResult<usize> {
    let raw: Vec<PageRecord> = storage
        .load_pages()?
        .into_iter()
        .filter(PageRecord::needs_cleaning)
        .collect();

    if raw.is_empty() {
        return Ok(0);
    }

    tracing::info!("Cleaning content of {} pages", raw.len());
    let mut cleaner = ContentCleaner::new();
    let cleaned = cleaner.clean_all_pages(raw);

    let mut written = 0;
    for page in &cleaned {
        match storage.write_page(page) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!("Could not write cleaned page {}: {}", page.url, e),
        }
    }

    Ok(written)
}

/// Picks the element most likely to hold the page's content
fn find_main_content(document: &Html) -> ElementRef<'_> {
    for selector in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector) {
            if let Some(found) = document.select(&selector).next() {
                return found;
            }
        }
    }

    find_largest_text_block(document)
}

/// The div/section/article with the most text, else the body
fn find_largest_text_block(document: &Html) -> ElementRef<'_> {
    let fallback = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let Ok(candidates) = Selector::parse("div, section, article") else {
        return fallback;
    };

    let mut best = fallback;
    let mut max_len = 0;
    for candidate in document.select(&candidates) {
        let len: usize = candidate.text().map(|t| t.trim().chars().count()).sum();
        if len > max_len {
            max_len = len;
            best = candidate;
        }
    }

    best
}

/// An element's text, whitespace-collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
