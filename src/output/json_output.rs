//! JSON file output
//!
//! Writes the record list as a pretty-printed JSON array. Each save goes to
//! a sibling temporary file that is then renamed over the target, so an
//! interrupted crawl never leaves a truncated file behind.

use crate::output::traits::{RecordStore, StoreError, StoreResult};
use crate::output::OutputRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Record store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "output.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl RecordStore for JsonRecordStore {
    fn save(&mut self, records: &[OutputRecord]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
