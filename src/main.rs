//! doccrawl main entry point
//!
//! This is the command-line interface for the doccrawl documentation crawler.

use clap::Parser;
use doccrawl::config::{load_config_with_hash, Config};
use doccrawl::crawler::crawl;
use doccrawl::output::{load_statistics, print_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// doccrawl: a polite documentation crawler
///
/// doccrawl crawls a bounded subtree of a documentation site while
/// respecting robots.txt, extracts the sectioned text of every page and
/// writes overlapping, size-bounded chunks as JSON Lines.
#[derive(Parser, Debug)]
#[command(name = "doccrawl")]
#[command(version = "1.0.0")]
#[command(about = "A polite documentation crawler and chunker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write chunks to this file instead of the configured output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Override the configured page limit
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doccrawl=info,warn"),
            1 => EnvFilter::new("doccrawl=debug,info"),
            2 => EnvFilter::new("doccrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = usize::try_from(max_pages).unwrap_or(usize::MAX);
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== doccrawl Dry Run ===\n");

    println!("Crawl:");
    println!("  Scope root: {}", config.scope_root().unwrap_or("-"));
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Politeness delay: {}ms", config.crawl.politeness_delay_ms);
    println!("  Strip query strings: {}", config.crawl.strip_query);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());
    println!("  Robots token: {}", config.user_agent.product_token());

    println!("\nFetch:");
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!(
        "  Backoff: {:?} from {}ms, capped at {}ms",
        config.fetch.backoff, config.fetch.base_delay_ms, config.fetch.max_delay_ms
    );
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.fetch.request_timeout_secs, config.fetch.connect_timeout_secs
    );

    println!("\nChunking:");
    println!("  Strategy: {}", config.chunking.strategy.as_str());
    println!(
        "  Budget: {} {} with {} overlap",
        config.chunking.budget, config.chunking.measure, config.chunking.overlap
    );
    println!("  Index base: {}", config.chunking.index_base);
    println!("  Per-section: {}", config.chunking.respect_sections);

    println!("\nOutput:");
    println!("  Chunks: {}", config.output.path);

    println!("\nStart URLs ({}):", config.crawl.start_urls.len());
    for start_url in &config.crawl.start_urls {
        println!("  - {}", start_url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.crawl.start_urls.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} start URLs, writing chunks to {}",
        config.crawl.start_urls.len(),
        config.output.path
    );

    // Run the crawler
    match crawl(config).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                print_statistics(&load_statistics(&report));
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
