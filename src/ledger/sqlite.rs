// src/ledger/sqlite.rs

//! SQLite-backed ledger.
//!
//! One `delivered` table, insert-only. Rows are never updated or deleted;
//! a commit of an already-present key is a no-op (`INSERT OR IGNORE`).
//!
//! Thread-safe via an internal `Mutex<Connection>`. Operations are single
//! small statements, so they run inline on the driver task.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::{AppError, Result};
use crate::ledger::DedupLedger;

/// Durable ledger backed by a SQLite database file.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open (or create) the ledger database at `path`.
    ///
    /// Applies the schema if the database is new.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(AppError::ledger)?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::ledger)?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::ledger("ledger mutex poisoned"))
    }
}

/// Idempotent schema application.
fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS delivered (
            key TEXT PRIMARY KEY,
            recorded_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(AppError::ledger)?;
    Ok(())
}

#[async_trait]
impl DedupLedger for SqliteLedger {
    async fn exists(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM delivered WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .map_err(AppError::ledger)?;
        Ok(count > 0)
    }

    async fn commit(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO delivered (key, recorded_at) VALUES (?1, ?2)",
            params![key, Utc::now().to_rfc3339()],
        )
        .map_err(AppError::ledger)?;
        Ok(())
    }

    async fn len(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM delivered", [], |row| row.get(0))
            .map_err(AppError::ledger)?;
        Ok(count as u64)
    }
}
