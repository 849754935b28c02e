//! Robots.txt handling module
//!
//! This module fetches robots.txt once per host, evaluates its rules for the
//! crawler's user agent, and exposes the host's `Crawl-delay`.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{RobotsPolicy, MAX_CRAWL_DELAY};

use reqwest::Client;

/// Fetches and parses `{origin}/robots.txt`
///
/// Any failure (transport error, non-2xx status, unreadable body) yields
/// [`RobotsPolicy::AllowAll`].
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Origin key, e.g. `https://docs.example.com`
/// * `user_agent` - Product token the rules are evaluated for
///
/// # Returns
///
/// The host's robots policy
pub async fn fetch_robots(client: &Client, origin: &str, user_agent: &str) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable for {} ({}), allowing all", origin, e);
            return RobotsPolicy::AllowAll;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt for {} returned {}, allowing all",
            origin,
            response.status()
        );
        return RobotsPolicy::AllowAll;
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::from_content(&body, user_agent),
        Err(e) => {
            tracing::debug!("Failed to read robots.txt for {}: {}", origin, e);
            RobotsPolicy::AllowAll
        }
    }
}
