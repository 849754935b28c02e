//! Robots.txt policy evaluation
//!
//! Rule matching is delegated to the robotstxt crate; `Crawl-delay` is not
//! part of that crate's matcher and is parsed here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Upper bound applied to any `Crawl-delay`
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Robots policy of one host, bound to one user agent
#[derive(Debug, Clone, PartialEq)]
pub enum RobotsPolicy {
    /// No usable robots.txt: everything is allowed
    AllowAll,

    /// Rules parsed from a robots.txt body
    Rules {
        /// Raw robots.txt content
        content: String,
        /// Product token matched against `User-agent` lines
        user_agent: String,
        /// `Crawl-delay` that applies to `user_agent`, if any
        crawl_delay: Option<Duration>,
    },
}

impl RobotsPolicy {
    /// Builds a policy from a robots.txt body
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `user_agent` - The crawler's product token (e.g. `DocCrawler`)
    ///
    /// # Returns
    ///
    /// A policy answering allow/deny questions for `user_agent`. An empty
    /// body yields [`RobotsPolicy::AllowAll`].
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        if content.trim().is_empty() {
            return Self::AllowAll;
        }

        Self::Rules {
            content: content.to_string(),
            user_agent: user_agent.to_string(),
            crawl_delay: parse_crawl_delay(content, user_agent),
        }
    }

    /// Checks if a URL may be fetched
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If a matching `Disallow` rule forbids it
    pub fn is_allowed(&self, url: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Rules {
                content,
                user_agent,
                ..
            } => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }

    /// Returns the `Crawl-delay` that applies to this policy's agent
    pub fn crawl_delay(&self) -> Option<Duration> {
        match self {
            Self::AllowAll => None,
            Self::Rules { crawl_delay, .. } => *crawl_delay,
        }
    }
}

/// Finds the `Crawl-delay` for `user_agent`
///
/// A group naming the agent wins over the `*` group. Agent names match
/// case-insensitively as substrings of the product token. Values beyond
/// [`MAX_CRAWL_DELAY`], including ones too large for a `Duration`, are capped.
fn parse_crawl_delay(content: &str, user_agent: &str) -> Option<Duration> {
    let agent = user_agent.to_lowercase();

    let mut group: Vec<String> = Vec::new();
    let mut group_closed = false;
    let mut specific: Option<f64> = None;
    let mut wildcard: Option<f64> = None;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                // A User-agent line after rules starts a new group
                if group_closed {
                    group.clear();
                    group_closed = false;
                }
                group.push(value.to_lowercase());
            }
            "crawl-delay" => {
                group_closed = true;
                let Ok(seconds) = value.parse::<f64>() else {
                    continue;
                };
                if !seconds.is_finite() || seconds < 0.0 {
                    continue;
                }
                if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                    specific = Some(seconds);
                } else if group.iter().any(|ua| ua == "*") {
                    wildcard = Some(seconds);
                }
            }
            _ => group_closed = true,
        }
    }

    specific.or(wildcard).map(|seconds| {
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(MAX_CRAWL_DELAY)
            .min(MAX_CRAWL_DELAY)
    })
}
