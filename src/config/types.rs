use serde::Deserialize;

/// Language codes treated as non-primary-language variants by default
pub const DEFAULT_SKIP_LANGUAGES: &[&str] = &[
    "es", "fr", "de", "it", "pt", "ru", "zh", "ja", "ko", "ar", "hi", "nl", "pl", "tr", "vi", "th",
    "id", "uk", "ro", "cs", "sv", "da", "fi", "no", "hu", "el", "he", "bn", "fa", "ur",
];

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "MunicipalScraper/1.0 (Educational/Archival)";

/// Main configuration structure for Muni-Catalog
///
/// Every section is optional in the TOML file; missing sections and fields
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub languages: LanguageConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link depth from the base URL
    pub max_depth: u32,

    /// Minimum time between requests to the site (seconds)
    pub delay: f64,

    /// Crawled pages between two resume checkpoints
    pub checkpoint_interval: u32,

    /// Timeout for page GET requests (seconds)
    pub page_timeout: u64,

    /// Timeout for PDF HEAD probes (seconds)
    pub probe_timeout: u64,

    /// Language-variant skips between two progress reports
    pub language_report_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            delay: 1.0,
            checkpoint_interval: 10,
            page_timeout: 30,
            probe_timeout: 10,
            language_report_interval: 20,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub user_agent: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Returns the product token used to match robots.txt groups
    ///
    /// `MunicipalScraper/1.0 (Educational/Archival)` becomes `MunicipalScraper`.
    pub fn product_token(&self) -> &str {
        self.user_agent
            .split(|c: char| c == '/' || c.is_whitespace())
            .next()
            .unwrap_or_default()
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory of the catalog
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
        }
    }
}

/// Language-variant filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Whether language variants are skipped at all
    pub skip: bool,

    /// Lowercase language codes considered non-primary
    pub codes: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            skip: true,
            codes: DEFAULT_SKIP_LANGUAGES.iter().map(|c| c.to_string()).collect(),
        }
    }
}
