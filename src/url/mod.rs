//! URL handling module
//!
//! This module turns user input into the seed URL, locates the site's
//! robots.txt, and decides which discovered links belong to the crawled host.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::{normalize_seed, robots_url};
