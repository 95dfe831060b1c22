// src/report/mod.rs

//! Append-only SQLite store of scan reports.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DATABASE_FILE_NAME: &str = "risk_scanner.db";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS risk_reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prompt TEXT NOT NULL,
        completion TEXT
    );
"#;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot prepare database directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One stored row. `completion` is `None` when the remote call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: i64,
    pub prompt: String,
    pub completion: Option<String>,
}

/// A connection to the report database.
///
/// Each scan opens its own store; concurrent writers are serialized by
/// SQLite itself, waiting up to the busy timeout for the write lock.
pub struct ReportStore {
    conn: Connection,
    path: PathBuf,
}

impl ReportStore {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ReportError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened report store");

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new report and return its id.
    pub fn append(&self, prompt: &str, completion: Option<&str>) -> Result<i64, ReportError> {
        self.conn.execute(
            "INSERT INTO risk_reports (prompt, completion) VALUES (?1, ?2)",
            params![prompt, completion],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The newest `limit` reports, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ReportRecord>, ReportError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare("SELECT id, prompt, completion FROM risk_reports ORDER BY id DESC LIMIT ?1")?;
        let rows = stmt
            .query_map(params![limit], |r| {
                Ok(ReportRecord {
                    id: r.get(0)?,
                    prompt: r.get(1)?,
                    completion: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<u64, ReportError> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM risk_reports", [], |r| r.get(0))?;
        Ok(n.max(0) as u64)
    }
}
