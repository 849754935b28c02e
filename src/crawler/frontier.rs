//! Crawl frontier: breadth-first queue with visit admission
//!
//! This module handles:
//! - FIFO ordering of URLs to crawl
//! - Queue deduplication (a URL is queued at most once)
//! - The visited set (a URL is dispatched at most once)
//! - Scope and robots.txt admission checks
//! - Politeness delay resolution with robots `Crawl-delay`

use crate::robots::{RobotsCache, RobotsPolicy};
use crate::url::{canonicalize, origin_of, CanonicalUrl, Scope};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// URLs already dispatched to the fetcher
///
/// Membership is monotonic: nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<CanonicalUrl>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// # Returns
    ///
    /// * `true` - If the URL was not visited before
    /// * `false` - If it already was
    pub fn insert(&mut self, url: CanonicalUrl) -> bool {
        self.urls.insert(url)
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Outcome of a visit admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    OutOfScope,
    AlreadyVisited,
    DisallowedByRobots,
}

impl Admission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admit => "admitted",
            Self::OutOfScope => "out of scope",
            Self::AlreadyVisited => "already visited",
            Self::DisallowedByRobots => "disallowed by robots.txt",
        }
    }
}

/// Frontier manages the crawl queue and visit admission
///
/// The frontier coordinates:
/// - Breadth-first ordering (first queued, first dispatched)
/// - Scope filtering against the configured root
/// - One robots.txt fetch per origin, evaluated for the crawler's product token
/// - The visited set, updated before a URL is handed out
pub struct Frontier {
    scope: Scope,
    strip_query: bool,
    product_token: String,

    /// URLs waiting to be dispatched, in discovery order
    queue: VecDeque<CanonicalUrl>,

    /// Every URL ever queued
    queued: HashSet<CanonicalUrl>,

    visited: VisitedSet,
    robots: RobotsCache,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `scope` - The crawl's bounded subtree
    /// * `strip_query` - Whether seeds are canonicalized without query strings
    /// * `product_token` - User agent token evaluated against robots.txt
    pub fn new(scope: Scope, strip_query: bool, product_token: &str) -> Self {
        Self {
            scope,
            strip_query,
            product_token: product_token.to_string(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: VisitedSet::new(),
            robots: RobotsCache::new(),
        }
    }

    /// Queues the configured start URLs
    ///
    /// Start URLs that fail to canonicalize or fall outside the scope are
    /// logged and dropped.
    ///
    /// # Returns
    ///
    /// The number of start URLs queued
    pub fn seed<S: AsRef<str>>(&mut self, start_urls: &[S]) -> usize {
        let mut seeded = 0;

        for start_url in start_urls {
            let start_url = start_url.as_ref();
            match canonicalize(start_url, None, self.strip_query) {
                Ok(url) => {
                    if !self.scope.in_scope(&url) {
                        tracing::warn!("Start URL {} is outside the crawl scope", url);
                    } else if self.enqueue(url) {
                        seeded += 1;
                    }
                }
                Err(e) => tracing::warn!("Ignoring start URL {}: {}", start_url, e),
            }
        }

        seeded
    }

    /// Adds a URL to the back of the queue
    ///
    /// # Returns
    ///
    /// * `true` - If the URL was queued
    /// * `false` - If it is out of scope, already queued, or already visited
    pub fn enqueue(&mut self, url: CanonicalUrl) -> bool {
        if !self.scope.in_scope(&url) || self.visited.contains(&url) || self.queued.contains(&url)
        {
            return false;
        }

        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Adds discovered links in order
    ///
    /// # Returns
    ///
    /// The number of URLs newly queued
    pub fn extend<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = CanonicalUrl>,
    {
        urls.into_iter().filter(|url| self.enqueue(url.clone())).count()
    }

    /// Decides whether a URL may be dispatched
    ///
    /// Fetches the origin's robots.txt on first use.
    pub async fn admission(&mut self, client: &Client, url: &CanonicalUrl) -> Admission {
        if !self.scope.in_scope(url) {
            return Admission::OutOfScope;
        }
        if self.visited.contains(url) {
            return Admission::AlreadyVisited;
        }

        let allowed = match origin_of(url.as_url()) {
            Some(origin) => self
                .robots
                .policy_for(client, &origin, &self.product_token)
                .await
                .is_allowed(url.as_str()),
            None => true,
        };

        if allowed {
            Admission::Admit
        } else {
            Admission::DisallowedByRobots
        }
    }

    /// Checks scope, the visited set and robots.txt for a URL
    ///
    /// # Returns
    ///
    /// * `true` - If the URL should be fetched
    /// * `false` - Otherwise
    pub async fn should_visit(&mut self, client: &Client, url: &CanonicalUrl) -> bool {
        self.admission(client, url).await == Admission::Admit
    }

    /// Pops queued URLs until one is admitted
    ///
    /// The admitted URL is added to the visited set before it is returned.
    ///
    /// # Returns
    ///
    /// * `Some(CanonicalUrl)` - The next URL to fetch
    /// * `None` - The queue is exhausted
    pub async fn next_admitted(&mut self, client: &Client) -> Option<CanonicalUrl> {
        while let Some(url) = self.queue.pop_front() {
            match self.admission(client, &url).await {
                Admission::Admit => {
                    self.visited.insert(url.clone());
                    tracing::debug!("Dispatching {}", url);
                    return Some(url);
                }
                rejected => tracing::debug!("Skipping {}: {}", url, rejected.as_str()),
            }
        }

        None
    }

    /// Calculates the delay to wait before the next request to a URL's origin
    ///
    /// This takes the maximum of:
    /// - The configured politeness delay
    /// - The origin's robots.txt `Crawl-delay` (if known)
    pub fn effective_delay(&self, url: &CanonicalUrl, configured: Duration) -> Duration {
        let robots_delay = origin_of(url.as_url())
            .and_then(|origin| self.robots.get(&origin).and_then(RobotsPolicy::crawl_delay))
            .unwrap_or(Duration::ZERO);

        configured.max(robots_delay)
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Returns the number of URLs waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Gives access to the robots cache, e.g. to preload policies
    pub fn robots_mut(&mut self) -> &mut RobotsCache {
        &mut self.robots
    }
}
