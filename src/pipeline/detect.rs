// src/pipeline/detect.rs

//! Change detection against process-local last-seen state.
//!
//! Last-seen state is an optimization, not a source of truth: it avoids
//! ledger lookups for content that has not moved since the previous cycle
//! within this process. It resets to empty on restart; the ledger alone
//! prevents duplicate delivery across restarts.

use std::collections::HashMap;

/// How an entity's freshly fetched content relates to its last-seen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Empty/falsy status: never notify this cycle, regardless of change
    Suppressed,
    /// Canonical form identical to last-seen
    Unchanged,
    /// New or different content
    Changed,
}

/// Process-local map from entity key to last processed canonical form.
#[derive(Debug, Default)]
pub struct LastSeen {
    entries: HashMap<String, String>,
}

impl LastSeen {
    /// Create empty last-seen state, as after a process restart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `canonical` for `entity_key`.
    ///
    /// Suppression wins over change: a suppressed entity is reported as
    /// such even when its content differs from last-seen.
    pub fn disposition(
        &self,
        entity_key: &str,
        canonical: &str,
        suppressed: bool,
    ) -> Disposition {
        if suppressed {
            return Disposition::Suppressed;
        }
        match self.entries.get(entity_key) {
            Some(last) if last == canonical => Disposition::Unchanged,
            _ => Disposition::Changed,
        }
    }

    /// Record `canonical` as the last processed content for `entity_key`.
    ///
    /// Called after a successful send, or when the ledger reports the key
    /// as already delivered. Never called for failed sends, so the next
    /// cycle re-detects the change and retries.
    pub fn record(&mut self, entity_key: &str, canonical: &str) {
        self.entries
            .insert(entity_key.to_string(), canonical.to_string());
    }

    /// Number of tracked entity slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entity has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
