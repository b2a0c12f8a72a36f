//! Output module for the finished catalog
//!
//! This module handles:
//! - Categorizing cataloged PDFs by title keywords
//! - Writing the final catalog files through the storage backend
//! - Generating the markdown catalog index and the printed summary

mod categorize;
mod markdown;
mod writer;

pub use categorize::{
    categorize_pdfs, categorize_title, category_names, display_name, CATEGORY_KEYWORDS,
    OTHER_CATEGORY,
};
pub use markdown::format_catalog_index;
pub use writer::{catalog_summary, CatalogWriter};
