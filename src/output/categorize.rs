//! Keyword categorization of cataloged PDFs
//!
//! Categories are checked in a fixed order against the lowercased title;
//! the first category with a matching keyword wins.

use crate::storage::PdfRecord;
use std::collections::BTreeMap;

/// Category for PDFs no keyword matched
pub const OTHER_CATEGORY: &str = "other";

/// Category names and their title keywords, in matching order
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("meeting_minutes", &["minutes", "meeting", "agenda", "session"]),
    ("ordinances", &["ordinance"]),
    ("resolutions", &["resolution"]),
    ("financial", &["budget", "financial", "audit", "fiscal", "finance"]),
    ("planning", &["planning", "zoning", "development", "comprehensive plan"]),
    ("reports", &["report", "annual", "quarterly"]),
    ("notices", &["notice", "notification", "announcement"]),
];

/// All category names in display order, [`OTHER_CATEGORY`] last
pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(name, _)| *name)
        .chain(std::iter::once(OTHER_CATEGORY))
}

/// Picks the category for a PDF title
///
/// # Examples
///
/// ```
/// use muni_catalog::output::categorize_title;
///
/// assert_eq!(categorize_title("City Council Agenda 2024-01-09"), "meeting_minutes");
/// assert_eq!(categorize_title("FY2024 Budget"), "financial");
/// assert_eq!(categorize_title("Trail map"), "other");
/// ```
pub fn categorize_title(title: &str) -> &'static str {
    let lower = title.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(name, _)| *name)
        .unwrap_or(OTHER_CATEGORY)
}

/// Groups PDFs by category, omitting empty categories
///
/// Records keep their catalog order within each category.
pub fn categorize_pdfs(pdfs: &[PdfRecord]) -> BTreeMap<String, Vec<PdfRecord>> {
    let mut categories: BTreeMap<String, Vec<PdfRecord>> = BTreeMap::new();

    for pdf in pdfs {
        categories
            .entry(categorize_title(&pdf.title).to_string())
            .or_default()
            .push(pdf.clone());
    }

    categories
}

/// Human-readable category heading, e.g. `Meeting Minutes`
pub fn display_name(category: &str) -> String {
    category
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
