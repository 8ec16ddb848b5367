// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable that overrides `webhook_url` from the config file.
///
/// Webhook URLs embed a secret token, so deployments keep them out of
/// committed config files.
pub const WEBHOOK_URL_ENV: &str = "FEEDRING_WEBHOOK_URL";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Outbound webhook endpoint (multipart POST target)
    #[serde(default)]
    pub webhook_url: String,

    /// Seconds between poll cycles
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// Path to the SQLite dedup ledger file
    #[serde(default = "defaults::ledger_path")]
    pub ledger_path: String,

    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Redirect-based "latest item" feed
    #[serde(default)]
    pub redirect_feed: Option<RedirectFeedConfig>,

    /// Structured multi-entity status feed
    #[serde(default)]
    pub status_feed: Option<StatusFeedConfig>,

    /// Tracked entities, keyed by the ids the status feed reports
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Applies the [`WEBHOOK_URL_ENV`] override when set.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        if let Ok(url) = std::env::var(WEBHOOK_URL_ENV) {
            if !url.trim().is_empty() {
                config.webhook_url = url;
            }
        }
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(AppError::validation("webhook_url is empty"));
        }
        validate_url("webhook_url", &self.webhook_url)?;
        if self.poll_interval_secs == 0 {
            return Err(AppError::validation("poll_interval_secs must be > 0"));
        }
        if self.ledger_path.trim().is_empty() {
            return Err(AppError::validation("ledger_path is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.redirect_feed.is_none() && self.status_feed.is_none() {
            return Err(AppError::validation("no feeds configured"));
        }
        if let Some(feed) = &self.redirect_feed {
            validate_url("redirect_feed.url", &feed.url)?;
            validate_url("redirect_feed.link_base", &feed.link_base)?;
        }
        if let Some(feed) = &self.status_feed {
            validate_url("status_feed.url", &feed.url)?;
            validate_url("status_feed.link_base", &feed.link_base)?;
        }
        if self.status_feed.is_some() && self.entities.is_empty() {
            return Err(AppError::validation(
                "status_feed configured but no entities defined",
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for entity in &self.entities {
            if entity.id.trim().is_empty() {
                return Err(AppError::validation("entity with empty id"));
            }
            if !seen.insert(entity.id.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate entity id '{}'",
                    entity.id
                )));
            }
            if entity.name.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "entity '{}' has empty display name",
                    entity.id
                )));
            }
        }
        Ok(())
    }

    /// Look up the display configuration for an entity id.
    pub fn entity(&self, id: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.id == id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            poll_interval_secs: defaults::poll_interval(),
            ledger_path: defaults::ledger_path(),
            http: HttpConfig::default(),
            redirect_feed: None,
            status_feed: None,
            entities: Vec::new(),
        }
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Redirect-based feed: the endpoint answers with a redirect whose target
/// is the latest item's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectFeedConfig {
    /// Feed endpoint URL (requested with redirects disabled)
    pub url: String,

    /// Base URL the reference index is appended to for the human-facing link
    pub link_base: String,

    /// Display name used in the webhook payload
    pub name: String,

    /// Avatar URL used in the webhook payload
    pub avatar: String,
}

/// Structured status feed describing multiple tracked entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFeedConfig {
    /// Feed endpoint URL
    pub url: String,

    /// Base URL the per-entity reference index is appended to
    pub link_base: String,
}

/// Display configuration for one tracked entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity id as reported by the status feed
    pub id: String,

    /// Display name used in the webhook payload
    pub name: String,

    /// Accent color for rich content blocks (0xRRGGBB)
    pub color: u32,

    /// Avatar URL used in the webhook payload
    pub avatar: String,
}

/// Validate that a configured value is an absolute URL.
fn validate_url(field: &str, value: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| AppError::validation(format!("{field} is not a valid URL: {e}")))
}

mod defaults {
    pub fn poll_interval() -> u64 {
        300
    }
    pub fn ledger_path() -> String {
        "feedring.db".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; feedring/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
}
