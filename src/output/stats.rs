//! Statistics generation from a crawl report
//!
//! This module provides functionality for summarizing and displaying
//! crawl statistics.

use crate::crawler::{CrawlReport, SkipReason};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Number of URLs dispatched to the fetcher
    pub pages_visited: u64,

    /// Number of pages turned into documents
    pub pages_extracted: u64,

    /// Total number of chunk records written
    pub chunks_written: u64,

    /// Total number of text blocks extracted
    pub blocks_extracted: u64,

    /// Count of skipped pages by reason
    pub skipped_by_reason: HashMap<SkipReason, u64>,

    /// Count of extracted pages by resolved encoding
    pub pages_by_encoding: HashMap<&'static str, u64>,

    /// Run duration, once finished
    pub duration_seconds: Option<i64>,

    /// Whether the run stopped at the page limit
    pub hit_page_limit: bool,
}

impl CrawlStatistics {
    /// Returns the total number of skipped pages
    pub fn total_skipped(&self) -> u64 {
        self.skipped_by_reason.values().sum()
    }

    /// Returns the success rate as a percentage of visited pages
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        (self.pages_extracted as f64 / self.pages_visited as f64) * 100.0
    }

    /// Returns the mean number of chunks per extracted page
    pub fn chunks_per_page(&self) -> f64 {
        if self.pages_extracted == 0 {
            return 0.0;
        }
        self.chunks_written as f64 / self.pages_extracted as f64
    }
}

/// Summarizes a crawl report
///
/// # Arguments
///
/// * `report` - The finished crawl's report
///
/// # Returns
///
/// Aggregated statistics
pub fn load_statistics(report: &CrawlReport) -> CrawlStatistics {
    let mut skipped_by_reason = HashMap::new();
    for skipped in &report.skipped {
        *skipped_by_reason.entry(skipped.reason).or_insert(0) += 1;
    }

    let mut pages_by_encoding = HashMap::new();
    for page in &report.pages {
        *pages_by_encoding.entry(page.encoding).or_insert(0) += 1;
    }

    CrawlStatistics {
        pages_visited: report.pages_visited as u64,
        pages_extracted: report.pages_extracted() as u64,
        chunks_written: report.chunks_written as u64,
        blocks_extracted: report.pages.iter().map(|p| p.blocks as u64).sum(),
        skipped_by_reason,
        pages_by_encoding,
        duration_seconds: report.duration_seconds(),
        hit_page_limit: report.hit_page_limit,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages extracted: {}", stats.pages_extracted);
    println!("  Text blocks: {}", stats.blocks_extracted);
    println!(
        "  Chunks written: {} ({:.1} per page)",
        stats.chunks_written,
        stats.chunks_per_page()
    );
    if let Some(seconds) = stats.duration_seconds {
        println!("  Duration: {}s", seconds);
    }
    if stats.hit_page_limit {
        println!("  Stopped at the max-pages limit");
    }
    println!();

    if !stats.pages_by_encoding.is_empty() {
        println!("Encodings:");
        // Sort encodings by count (descending)
        let mut encoding_counts: Vec<_> = stats.pages_by_encoding.iter().collect();
        encoding_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (encoding, count) in encoding_counts {
            println!("  {}: {}", encoding, count);
        }
        println!();
    }

    if !stats.skipped_by_reason.is_empty() {
        println!("Skipped Pages:");
        let mut skip_counts: Vec<_> = stats.skipped_by_reason.iter().collect();
        skip_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        for (reason, count) in skip_counts {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully extracted)",
        stats.success_rate(),
        stats.pages_extracted,
        stats.pages_visited
    );
}
