// src/ledger/memory.rs

//! In-memory ledger backend.
//!
//! Not durable; intended for tests and dry runs. Production deployments
//! use [`super::SqliteLedger`].

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::ledger::DedupLedger;

/// Non-durable ledger backed by a `HashSet`.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    keys: Mutex<HashSet<String>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupLedger for MemoryLedger {
    async fn exists(&self, key: &str) -> Result<bool> {
        let keys = self
            .keys
            .lock()
            .map_err(|_| AppError::ledger("ledger mutex poisoned"))?;
        Ok(keys.contains(key))
    }

    async fn commit(&self, key: &str) -> Result<()> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| AppError::ledger("ledger mutex poisoned"))?;
        keys.insert(key.to_string());
        Ok(())
    }

    async fn len(&self) -> Result<u64> {
        let keys = self
            .keys
            .lock()
            .map_err(|_| AppError::ledger("ledger mutex poisoned"))?;
        Ok(keys.len() as u64)
    }
}
