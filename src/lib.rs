//! doccrawl: a polite documentation crawler
//!
//! This crate crawls a bounded subtree of a documentation site, extracts the
//! sectioned text of every page, and splits it into overlapping,
//! size-bounded chunks ready for embedding.

pub mod chunk;
pub mod config;
pub mod crawler;
pub mod encoding;
pub mod extract;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for doccrawl operations
#[derive(Debug, Error)]
pub enum DocCrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Chunking error: {0}")]
    Chunk(#[from] chunk::ChunkError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for doccrawl operations
pub type Result<T> = std::result::Result<T, DocCrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use chunk::{Chunk, Chunker, ChunkerSettings, Measure, MeasureUnit};
pub use config::Config;
pub use crawler::{crawl, CrawlReport, FetchResult};
pub use extract::{PageDocument, TextBlock};
pub use url::{canonicalize, normalize_url, CanonicalUrl, Scope};
