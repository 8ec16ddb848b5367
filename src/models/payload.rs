// src/models/payload.rs

//! Outbound notification payload.
//!
//! The canonical serialization of a payload is the dedup identity: any
//! change to displayed content, not just to the underlying item, makes a
//! new payload. Serialization must therefore be deterministic: serde
//! emits struct fields in declaration order and skips `None` fields, so
//! identical logical content always yields the same bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::config::{EntityConfig, RedirectFeedConfig, StatusFeedConfig};
use crate::models::feed::{RedirectItem, StatusRecord};

/// The exact structure handed to the notifier as the `payload_json` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Display name override for the webhook
    pub username: String,

    /// Avatar URL override for the webhook
    pub avatar_url: String,

    /// Plain text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Rich content blocks
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embeds: Vec<Embed>,
}

/// One rich content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Title line with link and icon
    pub author: EmbedAuthor,

    /// Accent color (0xRRGGBB)
    pub color: u32,

    /// Multi-line body
    pub description: String,
}

/// Title line of a rich content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

impl NotificationPayload {
    /// Build the payload for a status-feed entity.
    pub fn for_status(
        entity: &EntityConfig,
        record: &StatusRecord,
        feed: &StatusFeedConfig,
    ) -> Self {
        Self {
            username: entity.name.clone(),
            avatar_url: entity.avatar.clone(),
            content: None,
            embeds: vec![Embed {
                author: EmbedAuthor {
                    name: format!("{} {}", record.date, entity.name),
                    url: format!("{}/{}", feed.link_base, record.idx),
                    icon_url: entity.avatar.clone(),
                },
                color: entity.color,
                description: format!("**{}**\n\n{}", record.status, record.detail.join("\n")),
            }],
        }
    }

    /// Build the payload for a redirect-feed item.
    ///
    /// The plain text content is the human-facing link built from the
    /// reference index header; the binary asset travels separately as an
    /// attachment.
    pub fn for_redirect(item: &RedirectItem, feed: &RedirectFeedConfig) -> Self {
        Self {
            username: feed.name.clone(),
            avatar_url: feed.avatar.clone(),
            content: Some(item.link(&feed.link_base)),
            embeds: Vec::new(),
        }
    }

    /// Deterministic canonical serialization of this payload.
    pub fn canonical(&self) -> String {
        // NotificationPayload contains no maps, only structs and Vecs, so
        // serde_json output is stable for equal values.
        serde_json::to_string(self).expect("payload serialization cannot fail")
    }

    /// Dedup ledger key for this payload.
    pub fn canonical_key(&self) -> String {
        canonical_key(&self.canonical())
    }
}

/// Derive a fixed-width ledger key from a canonical form.
pub fn canonical_key(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
