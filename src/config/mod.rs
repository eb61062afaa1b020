//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Command-line flags are layered on top by the binary, which then
//! re-validates the merged result with [`validate`].
//!
//! # Example
//!
//! ```no_run
//! use batch_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will fetch {} pages per batch", config.crawler.batch_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, OutputFormat, UserAgentConfig, DEFAULT_BATCH_RETRIES,
    DEFAULT_BATCH_SIZE, DEFAULT_TICK_INTERVAL_MS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
