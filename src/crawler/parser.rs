//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Every anchor link, normalized and classified

use crate::storage::LinkRecord;
use crate::url::{classify_link, is_valid_http_scheme, normalize_url};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title, or the page URL when there is none
    pub title: String,

    /// All anchor links in document order
    pub links: Vec<LinkRecord>,
}

impl ParsedPage {
    /// Number of links of each type: (internal, pdf, external)
    pub fn link_counts(&self) -> (usize, usize, usize) {
        use crate::url::LinkType;

        self.links
            .iter()
            .fold((0, 0, 0), |(i, p, e), link| match link.link_type {
                LinkType::Internal => (i + 1, p, e),
                LinkType::Pdf => (i, p + 1, e),
                LinkType::External => (i, p, e + 1),
            })
    }
}

/// Parses HTML content and extracts the title and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - Every `<a href="...">`, in document order, duplicates kept
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:`, `data:` and any other non-HTTP scheme
/// - References that cannot be resolved
///
/// Relative references resolve against `page_url`, which should be the
/// final URL after redirects. Fragments are stripped.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the content was served from
/// * `site_domain` - The crawled site's domain, for classification
///
/// # Example
///
/// ```
/// use muni_catalog::crawler::parse_html;
/// use muni_catalog::LinkType;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.gov/").unwrap();
/// let parsed = parse_html(html, &page_url, "example.gov");
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links[0].url, "https://example.gov/page");
/// assert_eq!(parsed.links[0].link_type, LinkType::Internal);
/// ```
pub fn parse_html(html: &str, page_url: &Url, site_domain: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| page_url.to_string());
    let links = extract_links(&document, page_url, site_domain);

    ParsedPage { title, links }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(collapse_text)
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, page_url: &Url, site_domain: &str) -> Vec<LinkRecord> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            if !is_valid_http_scheme(href) {
                return None;
            }

            let url = normalize_url(href, page_url).ok()?;
            Some(LinkRecord {
                link_type: classify_link(&url, site_domain),
                url: url.to_string(),
                text: collapse_text(element),
            })
        })
        .collect()
}

/// Joins an element's text nodes, trimmed, separated by single spaces
fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
