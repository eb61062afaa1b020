//! Robots.txt handling module
//!
//! This module fetches the crawled site's robots.txt once at startup and turns
//! it into the exclusion rule set consulted for every discovered link.
//! Retrieval is best effort: any failure means "crawl everything".

mod parser;
mod rules;

pub use parser::parse_rules;
pub use rules::{is_path_allowed, ExclusionRuleSet};

use crate::url::robots_url;
use reqwest::{Client, StatusCode};
use url::Url;

/// Fetches and parses robots.txt for the site hosting `seed`
///
/// A missing file, a non-success status, a network error or an unreadable
/// body all resolve to an empty rule set; the failure is logged and never
/// returned to the caller.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `seed` - The crawl's seed URL
///
/// # Returns
///
/// The disallowed path prefixes that apply to every user agent
pub async fn fetch_rules(client: &Client, seed: &Url) -> ExclusionRuleSet {
    let location = robots_url(seed);
    tracing::debug!("Fetching robots.txt from {}", location);

    let response = match client.get(location.as_str()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Could not fetch {}: {}; crawling without exclusions", location, e);
            return ExclusionRuleSet::allow_all();
        }
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        tracing::info!("No robots.txt at {}", location);
        return ExclusionRuleSet::allow_all();
    }
    if !status.is_success() {
        tracing::warn!(
            "robots.txt at {} returned HTTP {}; crawling without exclusions",
            location,
            status.as_u16()
        );
        return ExclusionRuleSet::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            let rules = parse_rules(&body);
            tracing::info!("Loaded {} exclusion rules from {}", rules.len(), location);
            rules
        }
        Err(e) => {
            tracing::warn!("Could not read {}: {}; crawling without exclusions", location, e);
            ExclusionRuleSet::allow_all()
        }
    }
}
