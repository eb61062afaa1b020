//! Crawl statistics
//!
//! This module holds the summary returned by a finished crawl and prints it
//! for the command-line user.

use chrono::{DateTime, Utc};

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed URL the crawl started from
    pub seed: String,

    /// Every URL the frontier ever held
    pub pages_found: usize,

    /// URLs flagged crawled, including dropped stragglers
    pub pages_crawled: usize,

    /// Output records written
    pub records_written: usize,

    /// URLs force-completed because their batch ran out of retries
    pub stragglers_dropped: usize,

    /// Batches dispatched over the whole crawl
    pub batches_run: usize,

    /// Where the output was written
    pub output_location: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock duration of the crawl in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Percentage of crawled URLs that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.pages_crawled == 0 {
            return 0.0;
        }
        (self.records_written as f64 / self.pages_crawled as f64) * 100.0
    }
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("Seed: {}", report.seed);
    println!("Started: {}", report.started_at.to_rfc3339());
    println!("Finished: {}", report.finished_at.to_rfc3339());
    println!("Duration: {} seconds\n", report.duration_seconds());

    println!("Total pages found\t{}", report.pages_found);
    println!("Total pages crawled\t{}", report.pages_crawled);
    println!("Records written\t\t{}", report.records_written);
    println!("Stragglers dropped\t{}", report.stragglers_dropped);
    println!("Batches run\t\t{}", report.batches_run);
    println!("Success rate\t\t{:.2}%\n", report.success_rate());

    println!("Output saved! Check {}", report.output_location);
}
