//! Record store trait and error types
//!
//! This module defines the interface every persistence backend implements
//! and the errors they report. Persistence failures are fatal to a crawl.

use crate::output::OutputRecord;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for output persistence backends
///
/// `save` receives the complete record list every time; implementations
/// overwrite or upsert so the stored result always mirrors the latest call.
pub trait RecordStore: Send {
    /// Persists the current record list
    ///
    /// Called after every settled batch and once when the crawl finishes.
    fn save(&mut self, records: &[OutputRecord]) -> StoreResult<()>;

    /// Marks the crawl as complete; called once after the final save
    fn finish(&mut self) -> StoreResult<()> {
        Ok(())
    }

    /// Human-readable location of the output
    fn location(&self) -> String;
}
