use crate::config::types::{Config, CrawlerConfig, LanguageConfig, OutputConfig, UserAgentConfig};
use crate::{CatalogError, ConfigError};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_language_config(&config.languages)?;
    Ok(())
}

/// Validates the base URL given on the command line
///
/// The URL must start with `http://` or `https://` and carry a host. This runs
/// before any network activity.
pub fn validate_base_url(base_url: &str) -> Result<Url, CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(invalid("base_url must start with http:// or https://"));
    }

    let url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().is_none() {
        return Err(invalid("base_url has no host"));
    }

    Ok(url)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_interval must be >= 1".to_string(),
        ));
    }

    if config.page_timeout < 1 || config.probe_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got page={}s probe={}s",
            config.page_timeout, config.probe_timeout
        )));
    }

    if config.language_report_interval < 1 {
        return Err(ConfigError::Validation(
            "language_report_interval must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.product_token().is_empty() {
        return Err(ConfigError::Validation(format!(
            "user_agent must start with a product token, got '{}'",
            config.user_agent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates language codes: lowercase ASCII letters only
fn validate_language_config(config: &LanguageConfig) -> Result<(), ConfigError> {
    for code in &config.codes {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "language code '{}' must be lowercase ASCII letters",
                code
            )));
        }
    }

    Ok(())
}
