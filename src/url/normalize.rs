use crate::UrlError;
use url::Url;

/// Normalizes a link target into its canonical absolute form
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace from the reference
/// 2. Resolve it against `base` (absolute references are parsed as-is)
/// 3. Reject anything that is not HTTP or HTTPS after resolution
/// 4. Remove the fragment (everything after #)
///
/// Host lowercasing, default-port removal and percent-encoding cleanup come
/// from the `url` crate's own serialization, so the result is idempotent:
/// normalizing an already-normalized URL returns it unchanged.
///
/// # Arguments
///
/// * `href` - The absolute or relative reference to normalize
/// * `base` - The URL relative references are resolved against
///
/// # Examples
///
/// ```
/// use muni_catalog::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.gov/dept/").unwrap();
/// let url = normalize_url("staff.html#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.gov/dept/staff.html");
/// ```
pub fn normalize_url(href: &str, base: &Url) -> Result<Url, UrlError> {
    let mut url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Checks whether a raw `href` may be followed over HTTP
///
/// References without a scheme (relative paths, `//host/path`, `?query`) are
/// accepted, as are `http:` and `https:`. Everything else (`mailto:`, `tel:`,
/// `javascript:`, `data:`, ...) is rejected.
pub fn is_valid_http_scheme(href: &str) -> bool {
    match scheme_of(href.trim()) {
        None => true,
        Some(scheme) => scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"),
    }
}

/// Returns the scheme of a reference, or None for relative references
fn scheme_of(href: &str) -> Option<&str> {
    let (candidate, _) = href.split_once(':')?;
    let mut chars = candidate.chars();

    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }

    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(candidate)
    } else {
        None
    }
}
