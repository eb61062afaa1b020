//! Output module for crawl results
//!
//! This module handles:
//! - The per-page output records and the assets they list
//! - The deduplicated, append-only record set built during a crawl
//! - Persisting that set to JSON or SQLite
//! - Summarising a finished crawl

mod json_output;
mod schema;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json_output::JsonRecordStore;
pub use sqlite_output::SqliteRecordStore;
pub use stats::{print_report, CrawlReport};
pub use traits::{RecordStore, StoreError, StoreResult};

use crate::config::{OutputConfig, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Kind of resource a page references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Script,
    Stylesheet,
    Media,
    Icon,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Script => "script",
            Self::Stylesheet => "stylesheet",
            Self::Media => "media",
            Self::Icon => "icon",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource referenced by a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub kind: AssetKind,
    /// Absolute URL of the resource
    pub url: String,
}

impl Asset {
    pub fn new(kind: AssetKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// One successfully crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub uri: String,
    pub assets: Vec<Asset>,
}

/// Append-only list of output records, unique by `uri`
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<OutputRecord>,
    seen: HashSet<String>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` unless one with the same URI already exists
    ///
    /// # Returns
    ///
    /// `true` if the record was appended
    pub fn push_if_new(&mut self, record: OutputRecord) -> bool {
        if !self.seen.insert(record.uri.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.seen.contains(uri)
    }

    /// Records in discovery order
    pub fn as_slice(&self) -> &[OutputRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Opens the record store selected by the output configuration
///
/// # Arguments
///
/// * `config` - Output path and format
/// * `seed` - The crawl's seed URL, recorded by stores that track runs
pub fn open_store(config: &OutputConfig, seed: &str) -> StoreResult<Box<dyn RecordStore>> {
    let path = Path::new(&config.path);
    match config.format {
        OutputFormat::Json => Ok(Box::new(JsonRecordStore::new(path))),
        OutputFormat::Sqlite => Ok(Box::new(SqliteRecordStore::open(path, seed)?)),
    }
}
