// src/models/mod.rs

//! Domain models for the feed watcher.
//!
//! This module contains all data structures used throughout the
//! application, organized by their primary purpose.

mod config;
mod feed;
mod payload;

// Re-export all public types
pub use config::{
    Config, EntityConfig, HttpConfig, RedirectFeedConfig, StatusFeedConfig, WEBHOOK_URL_ENV,
};
pub use feed::{RedirectItem, StatusFeedResponse, StatusRecord};
pub use payload::{canonical_key, Embed, EmbedAuthor, NotificationPayload};
