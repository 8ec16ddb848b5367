// src/error.rs

//! Unified error handling for the feed watcher.
//!
//! The four operational categories (`Fetch`, `Malformed`, `Delivery`,
//! `Ledger`) drive the cycle-level handling policy: fetch and malformed
//! responses abort one source for one cycle, delivery failures leave the
//! ledger uncommitted so the payload is retried next cycle, and ledger
//! failures fail closed (no send without a working idempotency check).

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Network or timeout failure while fetching a feed or asset
    #[error("fetch error for {context}: {source}")]
    Fetch {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response structure did not match what the source contract promises
    #[error("malformed response from {context}: {message}")]
    Malformed { context: String, message: String },

    /// Outbound webhook delivery failed (transport or non-success status)
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Dedup ledger unavailable or rejected an operation
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error with source context.
    pub fn fetch(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            context: context.into(),
            source,
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Malformed {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Create a ledger error.
    pub fn ledger(message: impl fmt::Display) -> Self {
        Self::Ledger(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error means the dedup ledger cannot be trusted.
    ///
    /// Ledger failures are handled fail-closed: the affected entity is
    /// skipped for the cycle and nothing is sent.
    pub fn is_ledger(&self) -> bool {
        matches!(self, Self::Ledger(_))
    }
}
