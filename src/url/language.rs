//! Language-variant detection
//!
//! Municipal sites often mirror every page under translated paths
//! (`/es/about`, `/zh-hans/about`) or a language query parameter
//! (`?lang=es`, `?oc_lang=es`). Crawling those mirrors multiplies the page
//! count without adding content, so they are skipped by default.

use crate::config::LanguageConfig;
use url::Url;

/// Decides whether a URL is a non-primary-language variant of a page
#[derive(Debug, Clone)]
pub struct LanguageFilter {
    enabled: bool,
    codes: Vec<String>,
}

impl LanguageFilter {
    /// Creates a filter matching the given lowercase language codes
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            codes: codes.into_iter().map(|c| c.into().to_lowercase()).collect(),
        }
    }

    /// Creates a filter that never matches
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            codes: Vec::new(),
        }
    }

    /// Builds the filter described by the configuration
    pub fn from_config(config: &LanguageConfig) -> Self {
        if config.skip {
            Self::new(config.codes.iter().cloned())
        } else {
            Self::disabled()
        }
    }

    /// Returns true if filtering is switched on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Checks if a URL is a language variant
    ///
    /// A URL matches when a path segment equals a code or is a code followed
    /// by a regional subtag (`es`, `es-mx`, `zh-hans`, `es-419`), or when a
    /// query parameter named `lang`/`language` (optionally `_`/`-` prefixed,
    /// e.g. `oc_lang`) carries a code as its value. Query matching works on
    /// decoded `name=value` pairs, so `?format=es` is not a match.
    pub fn is_language_variant(&self, url: &Url) -> bool {
        if !self.enabled || self.codes.is_empty() {
            return false;
        }

        let in_path = url
            .path_segments()
            .map(|mut segments| segments.any(|segment| self.matches_code(segment)))
            .unwrap_or(false);

        in_path
            || url
                .query_pairs()
                .any(|(name, value)| is_language_param(&name) && self.matches_code(&value))
    }

    /// Checks a path segment or parameter value against the code list
    fn matches_code(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_lowercase();
        self.codes.iter().any(|code| {
            match candidate.strip_prefix(code.as_str()) {
                Some("") => true,
                Some(rest) => rest
                    .strip_prefix('-')
                    .or_else(|| rest.strip_prefix('_'))
                    .is_some_and(is_region_subtag),
                None => false,
            }
        })
    }
}

/// Matches `lang`, `language`, and names ending in `_lang`/`-language` etc.
fn is_language_param(name: &str) -> bool {
    let name = name.to_lowercase();
    let prefix = name
        .strip_suffix("language")
        .or_else(|| name.strip_suffix("lang"));

    match prefix {
        Some("") => true,
        Some(prefix) => prefix.ends_with('_') || prefix.ends_with('-'),
        None => false,
    }
}

/// Region or script subtag: 2 to 4 ASCII alphanumerics (`mx`, `419`, `hans`)
fn is_region_subtag(tag: &str) -> bool {
    (2..=4).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric())
}
