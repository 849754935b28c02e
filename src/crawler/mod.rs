//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with scope and robots.txt admission
//! - HTTP fetching with retry logic and encoding resolution
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawledPage, SkipReason, SkippedPage};
pub use fetcher::{
    build_http_client, is_html_content_type, is_retryable_status, normalize_last_modified,
    FetchError, FetchResult, Fetcher, RetryPolicy, MAX_REDIRECTS,
};
pub use frontier::{Admission, Frontier, VisitedSet};

use crate::config::Config;
use crate::output::JsonlSink;
use crate::DocCrawlError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the JSONL output file
/// 2. Build the frontier, HTTP client, extractor and chunker
/// 3. Crawl until the frontier is exhausted or `max-pages` is reached
/// 4. Flush the output
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(DocCrawlError)` - Crawl failed
pub async fn crawl(config: &Config) -> Result<CrawlReport, DocCrawlError> {
    let mut sink = JsonlSink::create(Path::new(&config.output.path))?;
    let report = run_crawl(config, &mut sink).await?;
    tracing::info!(
        "Wrote {} chunks to {}",
        sink.records_written(),
        config.output.path
    );
    Ok(report)
}
