use crate::chunk::{ChunkStrategy, ChunkerSettings, MeasureUnit, DEFAULT_LOOKAHEAD};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for doccrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Scope root URL: the explicit `scope-root`, else the first start URL
    pub fn scope_root(&self) -> Option<&str> {
        self.crawl
            .scope_root
            .as_deref()
            .or_else(|| self.crawl.start_urls.first().map(String::as_str))
    }
}

/// Crawl frontier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Seed URLs, crawled first in the given order
    #[serde(rename = "start-urls")]
    pub start_urls: Vec<String>,

    /// Prefix that bounds the crawl
    #[serde(rename = "scope-root", default)]
    pub scope_root: Option<String>,

    /// Maximum number of pages turned into documents
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Minimum time between two requests (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Drop query strings during canonicalization
    #[serde(rename = "strip-query", default = "default_true")]
    pub strip_query: bool,
}

impl CrawlConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Product token, also matched against robots.txt `User-agent` lines
    pub name: String,

    pub version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Full `User-Agent` header value
    ///
    /// Format: `Name/Version (+ContactURL)`, or `Name/Version` without a
    /// contact URL.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }

    /// Token used for robots.txt group matching
    pub fn product_token(&self) -> &str {
        &self.name
    }
}

/// Backoff applied between fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// HTTP fetch and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetchConfig {
    /// Total attempts per URL, including the first
    pub max_attempts: u32,
    pub backoff: BackoffKind,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffKind::Exponential,
            base_delay_ms: 500,
            max_delay_ms: 8000,
            request_timeout_secs: 20,
            connect_timeout_secs: 10,
        }
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChunkingConfig {
    pub strategy: ChunkStrategy,
    pub measure: MeasureUnit,
    pub budget: usize,
    pub overlap: usize,
    pub index_base: usize,
    pub respect_sections: bool,
    pub lookahead: usize,
}

impl ChunkingConfig {
    /// Settings for [`crate::chunk::Chunker`]
    pub fn settings(&self) -> ChunkerSettings {
        ChunkerSettings {
            strategy: self.strategy,
            budget: self.budget,
            overlap: self.overlap,
            index_base: self.index_base,
            respect_sections: self.respect_sections,
            lookahead: self.lookahead,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Budgeted,
            measure: MeasureUnit::Tokens,
            budget: 900,
            overlap: 120,
            index_base: 1,
            respect_sections: true,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSONL chunk file
    pub path: String,
}

fn default_max_pages() -> usize {
    500
}

fn default_politeness_delay_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}
