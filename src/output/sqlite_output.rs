//! SQLite output implementation
//!
//! This module provides a record store that upserts every output record into
//! a SQLite database and tracks each crawl as a row in `runs`.

use crate::output::schema::initialize_schema;
use crate::output::traits::{RecordStore, StoreResult};
use crate::output::{Asset, OutputRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// SQLite record store
pub struct SqliteRecordStore {
    conn: Connection,
    path: PathBuf,
    run_id: i64,
}

impl SqliteRecordStore {
    /// Opens (or creates) the database and starts a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `seed` - Seed URL recorded on the run row
    pub fn open(path: &Path, seed: &str) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::from_connection(conn, path.to_path_buf(), seed)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(seed: &str) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn, PathBuf::from(":memory:"), seed)
    }

    fn from_connection(conn: Connection, path: PathBuf, seed: &str) -> StoreResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (seed, started_at, status) VALUES (?1, ?2, ?3)",
            params![seed, Utc::now().to_rfc3339(), RunStatus::Running.to_db_string()],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started run {} in {}", run_id, path.display());

        Ok(Self { conn, path, run_id })
    }

    /// ID of the run this store writes to
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Loads the records written by this run in discovery order
    pub fn load_records(&self) -> StoreResult<Vec<OutputRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uri, assets FROM records WHERE run_id = ?1 ORDER BY position")?;

        let rows = stmt.query_map(params![self.run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (uri, assets_json) = row?;
            let assets: Vec<Asset> = serde_json::from_str(&assets_json)?;
            records.push(OutputRecord { uri, assets });
        }
        Ok(records)
    }

    /// Returns the status of this store's run
    pub fn run_status(&self) -> StoreResult<Option<RunStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM runs WHERE id = ?1",
                params![self.run_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status.as_deref().and_then(RunStatus::from_db_string))
    }
}

impl RecordStore for SqliteRecordStore {
    fn save(&mut self, records: &[OutputRecord]) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (uri, run_id, position, assets, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(uri) DO UPDATE SET
                     run_id = excluded.run_id,
                     position = excluded.position,
                     assets = excluded.assets,
                     saved_at = excluded.saved_at",
            )?;

            for (position, record) in records.iter().enumerate() {
                let assets = serde_json::to_string(&record.assets)?;
                stmt.execute(params![
                    record.uri,
                    self.run_id,
                    position as i64,
                    assets,
                    now
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Upserted {} records into {}", records.len(), self.path.display());
        Ok(())
    }

    fn finish(&mut self) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![
                RunStatus::Completed.to_db_string(),
                Utc::now().to_rfc3339(),
                self.run_id
            ],
        )?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
