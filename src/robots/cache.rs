//! Per-host robots policy cache
//!
//! Each origin's robots.txt is fetched at most once per crawl run. There is
//! no expiry: a run is short-lived and keeps no state across runs.

use crate::robots::{fetch_robots, RobotsPolicy};
use reqwest::Client;
use std::collections::HashMap;

/// Robots policies keyed by origin (`scheme://host[:port]`)
#[derive(Debug, Default)]
pub struct RobotsCache {
    policies: HashMap<String, RobotsPolicy>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the policy for `origin`, fetching robots.txt on first use
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the robots.txt request
    /// * `origin` - Origin key, e.g. `https://docs.example.com`
    /// * `user_agent` - Product token the policy is evaluated for
    ///
    /// # Returns
    ///
    /// The cached or freshly fetched policy. Fetch failures yield allow-all.
    pub async fn policy_for(
        &mut self,
        client: &Client,
        origin: &str,
        user_agent: &str,
    ) -> &RobotsPolicy {
        if !self.policies.contains_key(origin) {
            let policy = fetch_robots(client, origin, user_agent).await;
            self.policies.insert(origin.to_string(), policy);
        }

        &self.policies[origin]
    }

    /// Returns the cached policy for `origin` without fetching
    pub fn get(&self, origin: &str) -> Option<&RobotsPolicy> {
        self.policies.get(origin)
    }

    /// Stores a policy for `origin`, replacing any cached one
    pub fn insert(&mut self, origin: &str, policy: RobotsPolicy) {
        self.policies.insert(origin.to_string(), policy);
    }

    /// Returns the number of origins with a cached policy
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns whether no policy has been cached yet
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
