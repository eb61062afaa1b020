//! Batch scheduler
//!
//! This module handles:
//! - Selecting the next wave of pending URLs from the frontier
//! - Spending the per-batch retry budget one tick at a time
//! - Re-dispatching members whose last fetch failed
//! - Abandoning batches that cannot settle
//! - Folding fetch completions back into the frontier and record set
//!
//! The scheduler performs no I/O. It returns the URLs that need fetching and
//! the coordinator spawns the fetches, which keeps every transition here
//! testable without a runtime.

use crate::crawler::fetcher::FetchOutcome;
use crate::output::{OutputRecord, RecordSet};
use crate::robots::ExclusionRuleSet;
use crate::state::{Batch, Frontier, MemberState};
use crate::url::same_host;
use url::Url;

/// Result of one scheduler tick
#[derive(Debug, Default)]
pub struct Tick {
    /// URLs to fetch now
    pub dispatch: Vec<String>,

    /// Set when the previous batch was settled during this tick
    pub settled: Option<Settlement>,
}

/// How a batch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// True when every member completed
    pub completed: bool,

    /// Members force-marked crawled because the retry budget ran out
    pub stragglers: Vec<String>,
}

/// Effect of applying one fetch completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The page was crawled
    Completed {
        /// New frontier entries discovered on the page
        new_links: usize,
        /// Whether an output record was appended
        recorded: bool,
    },

    /// The fetch failed; the member waits for the next retry pass
    Failed,

    /// The completion belongs to no live batch member
    Discarded,
}

/// Drives one bounded batch of fetches at a time
#[derive(Debug)]
pub struct BatchScheduler {
    batch: Option<Batch>,
    batch_size: usize,
    retry_budget: u32,
    batches_run: usize,
    stragglers_dropped: usize,
}

impl BatchScheduler {
    /// Creates an idle scheduler
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum members per batch
    /// * `retry_budget` - Unsettled ticks a batch survives before it is abandoned
    pub fn new(batch_size: usize, retry_budget: u32) -> Self {
        Self {
            batch: None,
            batch_size: batch_size.max(1),
            retry_budget: retry_budget.max(1),
            batches_run: 0,
            stragglers_dropped: 0,
        }
    }

    /// Advances the scheduler by one tick
    ///
    /// # Tick Phases
    ///
    /// 1. With a running batch that is not done, spend one retry. While the
    ///    budget lasts, failed members are re-dispatched and the tick ends.
    /// 2. A done batch, or one whose budget is spent, is settled: unfinished
    ///    members are marked crawled and reported as stragglers.
    /// 3. With no batch, up to `batch_size` pending URLs form a new batch.
    pub fn tick(&mut self, frontier: &mut Frontier) -> Tick {
        let mut settled = None;

        if let Some(batch) = self.batch.as_mut() {
            if !batch.is_done() {
                let retries = batch.record_retry();
                if retries < self.retry_budget {
                    let dispatch = batch.take_failed();
                    if !dispatch.is_empty() {
                        tracing::debug!(
                            "Retry pass {}/{}: re-dispatching {} URLs",
                            retries,
                            self.retry_budget,
                            dispatch.len()
                        );
                    }
                    return Tick {
                        dispatch,
                        settled: None,
                    };
                }
            }
            settled = self.settle(frontier);
        }

        Tick {
            dispatch: self.start_batch(frontier),
            settled,
        }
    }

    /// Folds a fetch completion into the crawl state
    ///
    /// On success the requested URL (and its canonical URI, after a redirect)
    /// is marked crawled, a record is appended unless one already exists for
    /// that URI, and allowed links that are not yet known join the frontier.
    pub fn apply(
        &mut self,
        outcome: FetchOutcome,
        frontier: &mut Frontier,
        records: &mut RecordSet,
        rules: &ExclusionRuleSet,
    ) -> Applied {
        let FetchOutcome { requested, result } = outcome;

        let Some(member) = self
            .batch
            .as_mut()
            .and_then(|batch| batch.member_mut(&requested))
        else {
            tracing::debug!("Discarding late completion for {}", requested);
            return Applied::Discarded;
        };

        if member.state.is_done() {
            tracing::debug!("Discarding duplicate completion for {}", requested);
            return Applied::Discarded;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                member.state = MemberState::Failed;
                tracing::warn!("{} (attempt {})", e, member.attempts);
                return Applied::Failed;
            }
        };

        member.state = MemberState::Done;
        frontier.mark_crawled(&requested);

        if page.uri != requested && is_same_host(&requested, &page.uri) {
            tracing::debug!("{} resolved to {}", requested, page.uri);
            frontier.insert_if_new(&page.uri);
            frontier.mark_crawled(&page.uri);
        }

        let new_links = frontier.absorb_links(
            page.internal_hyperlinks.iter().map(String::as_str),
            rules,
        );
        let recorded = records.push_if_new(OutputRecord {
            uri: page.uri,
            assets: page.assets,
        });

        tracing::debug!(
            "Crawled {}: {} new links, record {}",
            requested,
            new_links,
            if recorded { "added" } else { "already present" }
        );

        Applied::Completed {
            new_links,
            recorded,
        }
    }

    /// The batch currently being attempted
    pub fn current_batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    /// Number of batches started so far
    pub fn batches_run(&self) -> usize {
        self.batches_run
    }

    /// Number of URLs dropped from abandoned batches
    pub fn stragglers_dropped(&self) -> usize {
        self.stragglers_dropped
    }

    fn settle(&mut self, frontier: &mut Frontier) -> Option<Settlement> {
        let batch = self.batch.take()?;
        let stragglers = batch.unfinished();

        if stragglers.is_empty() {
            tracing::debug!("Batch of {} settled", batch.len());
        } else {
            tracing::warn!(
                "Batch abandoned after {} retries, dropping {} URLs: {}",
                batch.retries(),
                stragglers.len(),
                stragglers.join(", ")
            );
            for url in &stragglers {
                frontier.mark_crawled(url);
            }
            self.stragglers_dropped += stragglers.len();
        }

        Some(Settlement {
            completed: stragglers.is_empty(),
            stragglers,
        })
    }

    fn start_batch(&mut self, frontier: &Frontier) -> Vec<String> {
        let urls: Vec<String> = frontier
            .pending_urls()
            .take(self.batch_size)
            .map(str::to_string)
            .collect();

        if urls.is_empty() {
            return urls;
        }

        self.batches_run += 1;
        tracing::debug!("Starting batch {} with {} URLs", self.batches_run, urls.len());
        self.batch = Some(Batch::dispatched(urls.clone()));
        urls
    }
}

fn is_same_host(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => same_host(&a, &b),
        _ => false,
    }
}
