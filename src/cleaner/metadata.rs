//! Metadata hints scraped from class names
//!
//! Municipal CMS templates tend to tag the owning department, the
//! publication date and the document kind with telling class names.

use crate::storage::PageMetadata;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Compiled class-name and date patterns
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    department_class: Option<Regex>,
    date_class: Option<Regex>,
    doc_type_class: Option<Regex>,
    date_text: Option<Regex>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {
            department_class: Regex::new(r"(?i)(department|category|section)").ok(),
            date_class: Regex::new(r"(?i)(date|published|updated)").ok(),
            doc_type_class: Regex::new(r"(?i)(document-type|doc-type|type)").ok(),
            date_text: Regex::new(r"\b(\d{1,2}[-/]\d{1,2}[-/]\d{2,4}|\d{4}[-/]\d{1,2}[-/]\d{1,2})\b")
                .ok(),
        }
    }

    /// Extracts department, date and document type hints
    pub fn extract(&self, document: &Html) -> PageMetadata {
        PageMetadata {
            department: self.first_text_with_class(document, "[class]", &self.department_class),
            date: self.find_date(document),
            document_type: self.first_text_with_class(document, "[class]", &self.doc_type_class),
        }
    }

    fn first_text_with_class(
        &self,
        document: &Html,
        selector: &str,
        pattern: &Option<Regex>,
    ) -> Option<String> {
        let pattern = pattern.as_ref()?;
        let selector = Selector::parse(selector).ok()?;

        document
            .select(&selector)
            .filter(|element| has_matching_class(element, pattern))
            .map(super::element_text)
            .find(|text| !text.is_empty())
    }

    fn find_date(&self, document: &Html) -> Option<String> {
        let pattern = self.date_class.as_ref()?;
        let selector = Selector::parse("time[class], span[class], div[class]").ok()?;

        for element in document
            .select(&selector)
            .filter(|element| has_matching_class(element, pattern))
        {
            if let Some(datetime) = element.value().attr("datetime") {
                return Some(datetime.to_string());
            }

            let text = super::element_text(element);
            if let Some(found) = self
                .date_text
                .as_ref()
                .and_then(|re| re.captures(&text))
                .and_then(|caps| caps.get(1))
            {
                return Some(found.as_str().to_string());
            }
        }

        None
    }
}

fn has_matching_class(element: &ElementRef<'_>, pattern: &Regex) -> bool {
    element.value().classes().any(|class| pattern.is_match(class))
}
