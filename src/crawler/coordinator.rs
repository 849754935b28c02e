//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier and dispatching one URL at a time
//! - Applying the politeness delay between requests
//! - Coordinating fetching, extraction, link discovery and chunking
//! - Handing chunks to the output sink
//! - Recording skipped pages in the crawl report

use crate::chunk::Chunker;
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::frontier::Frontier;
use crate::encoding::EncodingResolver;
use crate::extract::{discover_links, Extractor};
use crate::output::ChunkSink;
use crate::url::{CanonicalUrl, Scope};
use crate::{ConfigError, DocCrawlError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, Instant};

/// Why a dispatched page produced no document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The fetch failed terminally or ran out of attempts
    Fetch,
    /// The markup could not be turned into a document
    Extract,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Extract => "extract",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched URL that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub url: String,
    pub reason: SkipReason,
    pub message: String,
}

/// A page turned into a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    pub url: String,
    pub title: String,
    pub blocks: usize,
    pub chunks: usize,
    /// Name of the resolved encoding
    pub encoding: &'static str,
}

/// Outcome of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// URLs dispatched to the fetcher
    pub pages_visited: usize,
    /// Pages extracted and chunked, in crawl order
    pub pages: Vec<CrawledPage>,
    pub chunks_written: usize,
    pub skipped: Vec<SkippedPage>,
    /// Whether the crawl stopped at `max-pages` rather than frontier exhaustion
    pub hit_page_limit: bool,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_visited: 0,
            pages: Vec::new(),
            chunks_written: 0,
            skipped: Vec::new(),
            hit_page_limit: false,
        }
    }

    /// Returns the number of pages turned into documents
    pub fn pages_extracted(&self) -> usize {
        self.pages.len()
    }

    /// Returns the run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    fn skip(&mut self, url: &CanonicalUrl, reason: SkipReason, message: String) {
        tracing::warn!("Skipping {} ({}): {}", url, reason, message);
        self.skipped.push(SkippedPage {
            url: url.to_string(),
            reason,
            message,
        });
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    frontier: Frontier,
    fetcher: Fetcher,
    extractor: Extractor,
    chunker: Chunker,
    max_pages: usize,
    politeness_delay: Duration,
    strip_query: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the scope, seeds the frontier with the start URLs and sets up
    /// the HTTP client, extractor and chunker.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(DocCrawlError)` - Failed to initialize
    pub fn new(config: &Config) -> Result<Self, DocCrawlError> {
        let root = config
            .scope_root()
            .ok_or_else(|| ConfigError::Validation("no scope root or start URL".to_string()))?;
        let scope = Scope::new(root)?;

        let mut frontier = Frontier::new(
            scope,
            config.crawl.strip_query,
            config.user_agent.product_token(),
        );
        let seeded = frontier.seed(&config.crawl.start_urls);
        tracing::info!("Seeded frontier with {} start URLs", seeded);

        let client = build_http_client(&config.user_agent, &config.fetch)?;
        let fetcher = Fetcher::new(
            client,
            RetryPolicy::from_config(&config.fetch),
            EncodingResolver::new(),
        );

        let chunker = Chunker::with_unit(config.chunking.settings(), config.chunking.measure)?;

        Ok(Self {
            frontier,
            fetcher,
            extractor: Extractor::new()?,
            chunker,
            max_pages: config.crawl.max_pages,
            politeness_delay: config.crawl.politeness_delay(),
            strip_query: config.crawl.strip_query,
        })
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Gets the next admitted URL from the frontier
    /// 2. Waits out the politeness delay
    /// 3. Fetches and decodes the page
    /// 4. Extracts the document and feeds discovered links back
    /// 5. Chunks the document and hands it to the sink
    ///
    /// The loop ends when the frontier is exhausted or `max-pages` documents
    /// have been produced. Fetch and extraction failures skip the page;
    /// only sink failures abort the run.
    pub async fn run(&mut self, sink: &mut dyn ChunkSink) -> Result<CrawlReport, DocCrawlError> {
        let mut report = CrawlReport::new();
        let start_time = Instant::now();
        let mut first_dispatch = true;

        tracing::info!(
            "Starting crawl of {} ({} URLs queued, max {} pages)",
            self.frontier.scope().origin(),
            self.frontier.queue_len(),
            self.max_pages
        );

        loop {
            if report.pages_extracted() >= self.max_pages {
                tracing::info!("Reached max-pages limit of {}", self.max_pages);
                report.hit_page_limit = true;
                break;
            }

            let url = match self.frontier.next_admitted(self.fetcher.client()).await {
                Some(url) => url,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            if !first_dispatch {
                let delay = self.frontier.effective_delay(&url, self.politeness_delay);
                tokio::time::sleep(delay).await;
            }
            first_dispatch = false;

            report.pages_visited += 1;
            self.process_url(&url, sink, &mut report).await?;

            // Progress reporting every 10 pages
            if report.pages_visited % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = report.pages_visited as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages visited, {} extracted, {} in frontier, {:.2} pages/sec",
                    report.pages_visited,
                    report.pages_extracted(),
                    self.frontier.queue_len(),
                    rate
                );
            }
        }

        sink.flush()?;
        report.finished_at = Some(Utc::now());

        tracing::info!(
            "Crawl completed: {} pages extracted, {} chunks, {} skipped in {:?}",
            report.pages_extracted(),
            report.chunks_written,
            report.skipped.len(),
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Processes a single URL
    ///
    /// This method:
    /// 1. Fetches the page
    /// 2. Extracts the document (the URL doubles as the default title)
    /// 3. Queues discovered in-scope links
    /// 4. Chunks the document and writes it to the sink
    async fn process_url(
        &mut self,
        url: &CanonicalUrl,
        sink: &mut dyn ChunkSink,
        report: &mut CrawlReport,
    ) -> Result<(), DocCrawlError> {
        let fetched = match self.fetcher.fetch(url.as_str()).await {
            Ok(fetched) => fetched,
            Err(e) => {
                report.skip(url, SkipReason::Fetch, e.to_string());
                return Ok(());
            }
        };

        let mut page = match self
            .extractor
            .extract(&fetched.text, url.as_str(), Some(url.as_str()))
        {
            Ok(page) => page,
            Err(e) => {
                report.skip(url, SkipReason::Extract, e.to_string());
                return Ok(());
            }
        };
        page.last_modified = fetched.last_modified.clone();

        // Relative links resolve against the post-redirect URL
        match discover_links(
            &fetched.text,
            &fetched.final_url,
            self.frontier.scope(),
            self.strip_query,
        ) {
            Ok(links) => {
                let found = links.len();
                let queued = self.frontier.extend(links);
                tracing::debug!("{}: {} in-scope links, {} newly queued", url, found, queued);
            }
            Err(e) => tracing::warn!("Link discovery failed for {}: {}", url, e),
        }

        let chunks = self.chunker.chunk_page(&page);
        let written = sink.write_page(&page, &chunks)?;
        report.chunks_written += written;

        tracing::info!(
            "Extracted {} \"{}\" ({} blocks, {} chunks, {})",
            url,
            page.title,
            page.blocks.len(),
            written,
            fetched.encoding
        );

        report.pages.push(CrawledPage {
            url: page.url,
            title: page.title,
            blocks: page.blocks.len(),
            chunks: written,
            encoding: fetched.encoding,
        });

        Ok(())
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sink` - Receives every extracted page and its chunks
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(DocCrawlError)` - Setup failed or the sink could not be written
///
/// # Example
///
/// ```no_run
/// use doccrawl::config::load_config;
/// use doccrawl::crawler::run_crawl;
/// use doccrawl::output::MemorySink;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("doccrawl.toml"))?;
/// let mut sink = MemorySink::new();
/// let report = run_crawl(&config, &mut sink).await?;
/// println!("{} pages, {} chunks", report.pages_extracted(), sink.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    sink: &mut dyn ChunkSink,
) -> Result<CrawlReport, DocCrawlError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(sink).await
}
