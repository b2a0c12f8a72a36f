//! URL handling module for Muni-Catalog
//!
//! This module provides URL normalization, site membership checks, link
//! classification and language-variant detection. Everything here is a pure
//! function of its inputs.

mod domain;
mod language;
mod normalize;

use serde::{Deserialize, Serialize};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_internal, strip_www};
pub use language::LanguageFilter;
pub use normalize::{is_valid_http_scheme, normalize_url};

/// Link classification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Page on the crawled site - followed
    Internal,
    /// Anything off-site - recorded on the page, never fetched
    External,
    /// PDF on the crawled site - cataloged by a HEAD probe
    Pdf,
}

/// Checks if a URL points to a PDF (case-insensitive `.pdf` suffix)
///
/// The whole normalized URL is tested, query included, so
/// `/get?file=a.pdf` is a PDF and `/a.pdf?download=1` is not.
pub fn is_pdf(url: &Url) -> bool {
    url.as_str().to_ascii_lowercase().ends_with(".pdf")
}

/// Classifies a normalized link relative to the crawled site
///
/// Site membership is decided first: off-site URLs are always
/// [`LinkType::External`], whatever their extension. On-site PDFs are
/// [`LinkType::Pdf`], everything else on-site is [`LinkType::Internal`].
///
/// # Examples
///
/// ```
/// use muni_catalog::url::{classify_link, LinkType};
/// use url::Url;
///
/// let pdf = Url::parse("https://www.example.gov/budget.PDF").unwrap();
/// assert_eq!(classify_link(&pdf, "example.gov"), LinkType::Pdf);
///
/// let other = Url::parse("https://other.org/report.pdf").unwrap();
/// assert_eq!(classify_link(&other, "example.gov"), LinkType::External);
/// ```
pub fn classify_link(url: &Url, site_domain: &str) -> LinkType {
    if !is_internal(url, site_domain) {
        LinkType::External
    } else if is_pdf(url) {
        LinkType::Pdf
    } else {
        LinkType::Internal
    }
}
