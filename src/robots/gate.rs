//! Per-crawl robots.txt gate
//!
//! The gate is built once per crawl from the site's `/robots.txt` and then
//! answers every permission query for the rest of the run.

use crate::robots::{fetch_robots, ParsedRobots};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

/// Robots.txt rules for the crawled site, bound to one user agent
#[derive(Debug, Clone)]
pub struct RobotsGate {
    /// The parsed robots.txt content
    rules: ParsedRobots,

    /// Product token matched against `User-agent` lines
    agent: String,
}

impl RobotsGate {
    /// Fetches `/robots.txt` for the site and builds the gate
    ///
    /// Never fails: if the file cannot be retrieved or read, a warning is
    /// logged and the gate permits every URL.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client carrying the crawler's User-Agent header
    /// * `base_url` - Any URL on the crawled site
    /// * `agent` - The user agent product token used for matching
    pub async fn fetch(client: &Client, base_url: &Url, agent: &str) -> Self {
        let rules = match base_url.join("/robots.txt") {
            Ok(robots_url) => match fetch_robots(client, &robots_url).await {
                Ok(rules) => {
                    info!("Loaded robots.txt from {}", robots_url);
                    rules
                }
                Err(e) => {
                    warn!("Could not read robots.txt ({}); all URLs permitted", e);
                    ParsedRobots::allow_all()
                }
            },
            Err(e) => {
                warn!("Could not build robots.txt URL for {}: {}", base_url, e);
                ParsedRobots::allow_all()
            }
        };

        Self::new(rules, agent)
    }

    /// Creates a gate from already parsed rules
    pub fn new(rules: ParsedRobots, agent: &str) -> Self {
        Self {
            rules,
            agent: agent.to_string(),
        }
    }

    /// Creates a gate that permits everything
    pub fn allow_all(agent: &str) -> Self {
        Self::new(ParsedRobots::allow_all(), agent)
    }

    /// Checks whether the crawler may fetch `url`
    ///
    /// Matcher failures are logged and treated as permitted.
    pub fn can_fetch(&self, url: &Url) -> bool {
        match self.rules.check(url.as_str(), &self.agent) {
            Ok(allowed) => {
                if !allowed {
                    debug!("robots.txt disallows {}", url);
                }
                allowed
            }
            Err(e) => {
                warn!("{}; permitting {}", e, url);
                true
            }
        }
    }

    /// Crawl-delay advertised for our agent, in seconds
    pub fn crawl_delay(&self) -> Option<f64> {
        self.rules.crawl_delay(&self.agent)
    }
}
