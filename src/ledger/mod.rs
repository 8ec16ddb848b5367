// src/ledger/mod.rs

//! Durable dedup ledger.
//!
//! An append-only record of canonical keys that have been successfully
//! delivered. The ledger is the sole durability guarantee against duplicate
//! delivery across restarts; the in-memory last-seen state is advisory
//! only.
//!
//! The pipeline always calls `exists` before attempting delivery and
//! `commit` only after a confirmed successful send. The two calls are not
//! one atomic transaction; that is safe under the single-poller deployment
//! model, but not a linearizable guarantee against concurrent writers.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

/// Trait for dedup ledger backends.
#[async_trait]
pub trait DedupLedger: Send + Sync {
    /// Whether `key` has already been delivered.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Record `key` as delivered. Committing an existing key is a no-op.
    async fn commit(&self, key: &str) -> Result<()>;

    /// Number of recorded keys.
    async fn len(&self) -> Result<u64>;
}
