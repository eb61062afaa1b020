//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`PageFetcher`] trait
//! - HTML parsing and link/asset extraction
//! - Batch scheduling with a per-batch retry budget
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use crate::output::CrawlReport;
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, page_data_from_html, FetchOutcome, HttpPageFetcher, PageData, PageFetcher,
};
pub use parser::{parse_page, ParsedPage};
pub use scheduler::{Applied, BatchScheduler, Settlement, Tick};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Resolve the seed and fetch the site's robots.txt
/// 2. Open the configured record store
/// 3. Fetch pages batch by batch until every known URL is crawled
/// 4. Save the final record list and return a summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    run_crawl(config).await
}
