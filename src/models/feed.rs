// src/models/feed.rs

//! Wire types for the two feed kinds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Latest item reported by the redirect feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectItem {
    /// Redirect target: the item's identity and the asset location
    pub location: String,

    /// Reference index used to build the human-facing link
    pub index: String,
}

impl RedirectItem {
    /// Human-facing link for this item.
    pub fn link(&self, link_base: &str) -> String {
        format!("{}/{}", link_base, self.index)
    }

    /// Canonical form of this item for dedup purposes.
    ///
    /// The redirect feed is deduplicated on the item identity itself, not
    /// on the rendered payload: the link is derived from a separate header
    /// and may vary while the item does not.
    pub fn canonical(&self) -> &str {
        &self.location
    }
}

/// Status feed response: a map of tracked entity ids to status records.
///
/// A `BTreeMap` keeps iteration order stable across cycles, which keeps
/// logs and processing order deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFeedResponse {
    pub entities: BTreeMap<String, StatusRecord>,
}

/// Current status of one tracked entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Status label; empty means "nothing active"
    pub status: String,

    /// Free-text detail lines
    pub detail: Vec<String>,

    /// Reference index for the human-facing link
    pub idx: u64,

    /// Date/time label as supplied by the feed
    pub date: String,
}

impl StatusRecord {
    /// Whether this record suppresses notification for its entity.
    pub fn is_suppressed(&self) -> bool {
        self.status.trim().is_empty()
    }
}
