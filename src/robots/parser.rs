//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate's matcher behind a small owned type.

use crate::robots::RobotsError;
use robotstxt::DefaultMatcher;
use std::panic::{self, AssertUnwindSafe};

/// Parsed robots.txt data
///
/// The raw body is kept and matched on demand; the robotstxt matcher is cheap
/// to construct and holds no state between queries.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt cannot be fetched or parsed.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this ruleset permits everything unconditionally
    pub fn is_allow_all(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The user agent product token (e.g. `MunicipalScraper`)
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - The matcher's verdict
    /// * `Err(RobotsError::Matcher)` - The matcher panicked on this input
    pub fn check(&self, url: &str, user_agent: &str) -> Result<bool, RobotsError> {
        if self.is_allow_all() {
            return Ok(true);
        }

        panic::catch_unwind(AssertUnwindSafe(|| {
            let mut matcher = DefaultMatcher::default();
            matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
        }))
        .map_err(|_| RobotsError::Matcher(url.to_string()))
    }

    /// `Crawl-delay` in seconds that applies to `user_agent`, if any
    ///
    /// A group naming the agent wins over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.is_allow_all() {
            return None;
        }

        let agent = user_agent.to_lowercase();
        let groups = directive_groups(&self.content);

        let named = groups
            .iter()
            .filter(|group| group.agents.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())))
            .find_map(|group| group.crawl_delay);

        named.or_else(|| {
            groups
                .iter()
                .filter(|group| group.agents.iter().any(|ua| ua == "*"))
                .find_map(|group| group.crawl_delay)
        })
    }
}

/// One `User-agent` group and the crawl delay declared inside it
#[derive(Debug, Default)]
struct DirectiveGroup {
    agents: Vec<String>,
    crawl_delay: Option<f64>,
}

/// Splits robots.txt into groups
///
/// Consecutive `User-agent` lines open one shared group; any other
/// directive closes the agent list.
fn directive_groups(content: &str) -> Vec<DirectiveGroup> {
    let mut groups: Vec<DirectiveGroup> = Vec::new();
    let mut accepting_agents = false;

    let directives = content.lines().filter_map(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let (field, value) = line.split_once(':')?;
        Some((field.trim().to_ascii_lowercase(), value.trim()))
    });

    for (field, value) in directives {
        if field == "user-agent" {
            if !accepting_agents {
                groups.push(DirectiveGroup::default());
                accepting_agents = true;
            }
            if let Some(group) = groups.last_mut() {
                group.agents.push(value.to_lowercase());
            }
            continue;
        }

        accepting_agents = false;
        if field == "crawl-delay" {
            if let (Some(group), Ok(delay)) = (groups.last_mut(), value.parse::<f64>()) {
                group.crawl_delay.get_or_insert(delay);
            }
        }
    }

    groups
}
