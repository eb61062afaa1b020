//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Ticking the batch scheduler on a fixed interval
//! - Spawning fetch tasks and collecting their completions
//! - Deciding when the crawl is finished
//! - Saving the record set after every settled batch and at the end

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{build_http_client, FetchOutcome, HttpPageFetcher, PageFetcher};
use crate::crawler::scheduler::{BatchScheduler, Tick};
use crate::output::{open_store, CrawlReport, RecordSet, RecordStore};
use crate::robots::{fetch_rules, ExclusionRuleSet};
use crate::state::Frontier;
use crate::url::normalize_seed;
use crate::{ConfigError, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::{interval, MissedTickBehavior};
use url::Url;

/// Main crawler coordinator structure
///
/// Owns all mutable crawl state. Fetch tasks never touch it directly; they
/// report back over a channel and the coordinator applies each completion in
/// turn.
pub struct Coordinator {
    seed: Url,
    frontier: Frontier,
    scheduler: BatchScheduler,
    records: RecordSet,
    rules: ExclusionRuleSet,
    fetcher: Arc<dyn PageFetcher>,
    store: Box<dyn RecordStore>,
    tick_interval: Duration,
}

impl Coordinator {
    /// Creates a coordinator whose frontier holds only the seed
    ///
    /// # Arguments
    ///
    /// * `seed` - Normalized seed URL
    /// * `rules` - Exclusion rules applied to discovered links
    /// * `fetcher` - Source of page data
    /// * `store` - Where records are saved
    /// * `config` - Batch size, retry budget and tick interval
    pub fn new(
        seed: Url,
        rules: ExclusionRuleSet,
        fetcher: Arc<dyn PageFetcher>,
        store: Box<dyn RecordStore>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            frontier: Frontier::with_seed(seed.as_str()),
            scheduler: BatchScheduler::new(config.batch_size, config.batch_retries),
            records: RecordSet::new(),
            seed,
            rules,
            fetcher,
            store,
            tick_interval: config.tick_interval(),
        }
    }

    /// Runs the crawl until every known URL is crawled
    ///
    /// The first tick fires immediately. Each tick prints a status line and
    /// either finishes the crawl or advances the scheduler; completions are
    /// applied as they arrive between ticks.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished and the final save succeeded
    /// * `Err(CrawlError)` - Saving records failed
    pub async fn run(mut self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        tracing::info!("Starting crawl of {}", self.seed);

        let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::info!(
                        "Total pages found: {}, total pages crawled: {}",
                        self.frontier.len(),
                        self.frontier.crawled_count()
                    );

                    if self.frontier.is_fully_crawled() {
                        break;
                    }

                    let tick = self.scheduler.tick(&mut self.frontier);
                    self.handle_tick(tick, &tx)?;
                }
                Some(outcome) = rx.recv() => {
                    self.scheduler.apply(
                        outcome,
                        &mut self.frontier,
                        &mut self.records,
                        &self.rules,
                    );
                }
            }
        }

        self.store.save(self.records.as_slice())?;
        self.store.finish()?;

        let report = CrawlReport {
            seed: self.seed.to_string(),
            pages_found: self.frontier.len(),
            pages_crawled: self.frontier.crawled_count(),
            records_written: self.records.len(),
            stragglers_dropped: self.scheduler.stragglers_dropped(),
            batches_run: self.scheduler.batches_run(),
            output_location: self.store.location(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl completed: {} pages crawled, {} records written in {}s",
            report.pages_crawled,
            report.records_written,
            report.duration_seconds()
        );

        Ok(report)
    }

    fn handle_tick(
        &mut self,
        tick: Tick,
        tx: &UnboundedSender<FetchOutcome>,
    ) -> Result<()> {
        if tick.settled.is_some() {
            self.store.save(self.records.as_slice())?;
            tracing::debug!(
                "Saved {} records to {}",
                self.records.len(),
                self.store.location()
            );
        }

        for url in tick.dispatch {
            self.dispatch(url, tx);
        }
        Ok(())
    }

    /// Spawns a fetch task that reports back on `tx`
    fn dispatch(&self, url: String, tx: &UnboundedSender<FetchOutcome>) {
        tracing::debug!("Fetching {}", url);
        let fetcher = Arc::clone(&self.fetcher);
        let tx = tx.clone();

        tokio::spawn(async move {
            let result = fetcher.fetch(&url).await;
            // The receiver is gone once the crawl has finished
            let _ = tx.send(FetchOutcome {
                requested: url,
                result,
            });
        });
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Normalize the seed
/// 2. Build the HTTP client
/// 3. Fetch robots.txt into an exclusion rule set
/// 4. Open the record store
/// 5. Run the coordinator to completion
///
/// # Arguments
///
/// * `config` - The validated configuration; `crawler.seed` must be set
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed with an error
///
/// # Example
///
/// ```no_run
/// use batch_crawler::config::Config;
/// use batch_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawler.seed = Some("example.com".to_string());
/// let report = run_crawl(&config).await?;
/// println!("{} records", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport> {
    let seed_input = config
        .crawler
        .seed
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("no seed domain given".to_string()))?;
    let seed = normalize_seed(seed_input)?;

    let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
    let rules = fetch_rules(&client, &seed).await;
    let store = open_store(&config.output, seed.as_str())?;
    let fetcher = Arc::new(HttpPageFetcher::new(client));

    Coordinator::new(seed, rules, fetcher, store, &config.crawler)
        .run()
        .await
}
