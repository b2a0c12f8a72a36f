use url::Url;

/// Extracts the site authority of a URL: lowercase host plus explicit port
///
/// Default ports are already dropped by the `url` crate, so
/// `https://example.gov:443/` and `https://example.gov/` agree.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use muni_catalog::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.GOV/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.gov".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Removes a leading `www.` from a domain
pub fn strip_www(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}

/// Checks if a URL belongs to the crawled site
///
/// Both sides are compared after stripping a leading `www.`, so
/// `www.example.gov` and `example.gov` are the same site in either direction.
pub fn is_internal(url: &Url, site_domain: &str) -> bool {
    let site = site_domain.to_lowercase();
    match extract_domain(url) {
        Some(domain) => strip_www(&domain) == strip_www(&site),
        None => false,
    }
}
