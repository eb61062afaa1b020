//! Batch-Crawler main entry point
//!
//! This is the command-line interface for the batch crawler.

use anyhow::{bail, Context};
use batch_crawler::config::{load_config, validate, Config, OutputFormat};
use batch_crawler::crawler::crawl;
use batch_crawler::output::print_report;
use batch_crawler::url::{normalize_seed, robots_url};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Batch-Crawler: a breadth-first, single-host web crawler
///
/// Crawls every page reachable from DOMAIN on the same host, honouring the
/// site's robots.txt, and writes one record per page listing the assets it
/// references.
#[derive(Parser, Debug)]
#[command(name = "batch-crawler")]
#[command(version)]
#[command(about = "A breadth-first, single-host web crawler", long_about = None)]
struct Cli {
    /// Domain or URL to crawl (e.g. example.com)
    #[arg(value_name = "DOMAIN")]
    domain: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of pages fetched concurrently per batch
    #[arg(short, long, value_name = "N")]
    batch: Option<usize>,

    /// File the records are written to
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Output format (json or sqlite)
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Milliseconds between scheduler ticks
    #[arg(long, value_name = "MS")]
    tick_interval_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config).await?;
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
            0 => EnvFilter::new("batch_crawler=info,warn"),
            1 => EnvFilter::new("batch_crawler=debug,info"),
            2 => EnvFilter::new("batch_crawler=trace,debug"),
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

/// Loads the config file (if any), layers command-line flags on top and
/// validates the result
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(domain) = &cli.domain {
        config.crawler.seed = Some(domain.clone());
    }
    if let Some(batch) = cli.batch {
        config.crawler.batch_size = batch;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(ms) = cli.tick_interval_ms {
        config.crawler.tick_interval_ms = ms;
    }

    validate(&config).context("Invalid configuration")?;

    if config.crawler.seed.is_none() {
        bail!("No domain given; pass DOMAIN or set crawler.seed in the config file");
    }

    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seed_input = config.crawler.seed.as_deref().unwrap_or_default();
    let seed = normalize_seed(seed_input).context("Invalid domain")?;

    println!("=== Batch-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", seed);
    println!("  robots.txt: {}", robots_url(&seed));
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Batch retries: {}", config.crawler.batch_retries);
    println!("  Tick interval: {}ms", config.crawler.tick_interval_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Format: {}", config.output.format);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Batch size: {}, tick interval: {}ms, output: {} ({})",
        config.crawler.batch_size,
        config.crawler.tick_interval_ms,
        config.output.path,
        config.output.format
    );

    match crawl(config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("Crawl failed")
        }
    }
}
