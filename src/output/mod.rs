//! Output module for chunk records and crawl statistics
//!
//! This module handles:
//! - The chunk record written for every chunk
//! - Writing records as JSON Lines (or keeping them in memory)
//! - Summarizing and printing crawl statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::{JsonlSink, MemorySink};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{ChunkRecord, ChunkSink, OutputError, OutputResult};
