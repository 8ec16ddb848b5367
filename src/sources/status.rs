// src/sources/status.rs

//! Structured multi-entity status feed adapter.

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{StatusFeedConfig, StatusFeedResponse};

/// Adapter for the status feed.
pub struct StatusFeed {
    config: StatusFeedConfig,
}

impl StatusFeed {
    /// Create a new adapter for the given feed.
    pub fn new(config: StatusFeedConfig) -> Self {
        Self { config }
    }

    /// The feed configuration this adapter serves.
    pub fn config(&self) -> &StatusFeedConfig {
        &self.config
    }

    /// Fetch the current status of all tracked entities.
    pub async fn fetch(&self, client: &Client) -> Result<StatusFeedResponse> {
        let response = client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.config.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::malformed(
                &self.config.url,
                format!("unexpected status {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::fetch(&self.config.url, e))?;

        serde_json::from_str(&body).map_err(|e| AppError::malformed(&self.config.url, e))
    }
}
