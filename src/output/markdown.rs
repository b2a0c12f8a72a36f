//! Markdown catalog index generation
//!
//! This module renders `CATALOG.md`, a human-readable index of the crawl:
//! run information, PDFs grouped by category, and pages grouped by depth.

use crate::output::categorize::{category_names, display_name};
use crate::storage::{PageRecord, PdfCatalog, PdfRecord, SiteMetadata};
use std::collections::BTreeMap;

/// Formats the catalog index as markdown
///
/// # Arguments
///
/// * `metadata` - Run metadata written alongside the catalog
/// * `catalog` - The PDF catalog, with `by_category` filled in
/// * `pages` - Every cataloged page record
///
/// # Returns
///
/// A formatted markdown string
pub fn format_catalog_index(
    metadata: &SiteMetadata,
    catalog: &PdfCatalog,
    pages: &[PageRecord],
) -> String {
    let mut md = String::new();

    // Title
    md.push_str(&format!("# Website Catalog: {}\n\n", metadata.base_url));

    // Run metadata
    md.push_str("## Crawl Information\n\n");
    md.push_str(&format!(
        "- **Completed**: {}\n",
        metadata.crawl_completed.to_rfc3339()
    ));
    md.push_str(&format!("- **Max Depth**: {}\n", metadata.max_depth));
    md.push_str(&format!("- **Pages**: {}\n", pages.len()));
    md.push_str(&format!("- **PDFs**: {}\n", catalog.total_pdfs));
    md.push_str(&format!(
        "- **Total PDF Size**: {:.2} MB\n\n",
        catalog.total_size_mb
    ));

    // Category table
    if !catalog.by_category.is_empty() {
        md.push_str("## Document Categories\n\n");
        md.push_str("| Category | Documents |\n");
        md.push_str("|----------|-----------|\n");

        for category in category_names() {
            if let Some(pdfs) = catalog.by_category.get(category) {
                md.push_str(&format!("| {} | {} |\n", display_name(category), pdfs.len()));
            }
        }
        md.push('\n');

        for category in category_names() {
            let Some(pdfs) = catalog.by_category.get(category) else {
                continue;
            };

            md.push_str(&format!("## {}\n\n", display_name(category)));
            for pdf in pdfs {
                format_pdf_entry(&mut md, pdf);
            }
            md.push('\n');
        }
    }

    // Pages by depth
    if !pages.is_empty() {
        md.push_str("## Pages by Depth\n\n");

        let mut by_depth: BTreeMap<u32, Vec<&PageRecord>> = BTreeMap::new();
        for page in pages {
            by_depth.entry(page.depth).or_default().push(page);
        }

        for (depth, pages) in by_depth {
            md.push_str(&format!("### Depth {} ({} pages)\n\n", depth, pages.len()));
            for page in pages {
                match &page.content {
                    Some(content) => md.push_str(&format!(
                        "- [{}]({}) ({} words)\n",
                        escape_link_text(&page.title),
                        page.url,
                        content.word_count
                    )),
                    None => md.push_str(&format!(
                        "- [{}]({})\n",
                        escape_link_text(&page.title),
                        page.url
                    )),
                }
            }
            md.push('\n');
        }
    }

    md
}

fn format_pdf_entry(md: &mut String, pdf: &PdfRecord) {
    let size = if pdf.file_size_mb > 0.0 {
        format!("{} MB", pdf.file_size_mb)
    } else {
        "Unknown size".to_string()
    };

    md.push_str(&format!("- **{}**\n", pdf.title));
    md.push_str(&format!("  - URL: {}\n", pdf.url));
    md.push_str(&format!("  - Size: {}\n", size));
    if !pdf.last_modified.is_empty() {
        md.push_str(&format!("  - Last Modified: {}\n", pdf.last_modified));
    }
    md.push_str(&format!("  - Found on: {}\n", pdf.parent_page));
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
